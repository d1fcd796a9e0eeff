use serde_json::json;

use crate::constructs::network::Vpc;
use crate::error::StackError;
use crate::template::{Resource, Template};

#[derive(Debug, Clone)]
pub struct MskClusterProps {
    pub cluster_name: String,
    pub kafka_version: String,
    pub broker_nodes: u32,
    pub instance_type: String,
}

impl Default for MskClusterProps {
    fn default() -> Self {
        Self {
            cluster_name: "kafka-cluster".to_string(),
            kafka_version: "2.8.0".to_string(),
            broker_nodes: 4,
            instance_type: "kafka.m5.xlarge".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MskCluster {
    pub id: String,
}

impl MskCluster {
    /// Brokers are spread over the VPC's private subnets, so their number must
    /// divide evenly across the zones.
    pub fn create(
        template: &mut Template,
        id: &str,
        vpc: &Vpc,
        props: &MskClusterProps,
    ) -> Result<Self, StackError> {
        let azs = vpc.az_count();
        if props.broker_nodes == 0 || azs == 0 || props.broker_nodes % azs != 0 {
            return Err(StackError::BrokerCountNotMultipleOfAzs {
                brokers: props.broker_nodes,
                azs,
            });
        }

        template.add(
            id,
            Resource::new(
                "AWS::MSK::Cluster",
                json!({
                    "ClusterName": props.cluster_name,
                    "KafkaVersion": props.kafka_version,
                    "NumberOfBrokerNodes": props.broker_nodes,
                    "BrokerNodeGroupInfo": {
                        "InstanceType": props.instance_type,
                        "ClientSubnets": vpc.private_subnet_refs(),
                        "BrokerAZDistribution": "DEFAULT",
                    },
                }),
            ),
        )?;

        Ok(Self { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broker_count_must_divide_across_azs() {
        let mut template = Template::new();
        let vpc = Vpc::create(&mut template, "Net", 2).unwrap();

        let odd = MskClusterProps {
            broker_nodes: 3,
            ..Default::default()
        };
        assert!(matches!(
            MskCluster::create(&mut template, "Kafka", &vpc, &odd),
            Err(StackError::BrokerCountNotMultipleOfAzs { brokers: 3, azs: 2 })
        ));

        let none = MskClusterProps {
            broker_nodes: 0,
            ..Default::default()
        };
        assert!(MskCluster::create(&mut template, "Kafka", &vpc, &none).is_err());

        MskCluster::create(&mut template, "Kafka", &vpc, &MskClusterProps::default()).unwrap();
        assert_eq!(
            template.get("Kafka").unwrap().property("NumberOfBrokerNodes"),
            Some(&json!(4))
        );
    }
}

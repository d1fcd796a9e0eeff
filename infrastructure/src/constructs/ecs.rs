use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::constructs::network::{security_group, Vpc};
use crate::error::StackError;
use crate::template::{fns, Resource, Template};

const TASK_EXECUTION_POLICY: &str =
    "arn:aws:iam::aws:policy/service-role/AmazonECSTaskExecutionRolePolicy";

/// ECS cluster with a private Cloud Map namespace for service discovery.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub id: String,
    pub namespace_id: String,
}

impl Cluster {
    pub fn create(
        template: &mut Template,
        id: &str,
        vpc: &Vpc,
        namespace: &str,
    ) -> Result<Self, StackError> {
        template.add(id, Resource::new("AWS::ECS::Cluster", json!({})))?;

        let namespace_id = format!("{}DefaultServiceDiscoveryNamespace", id);
        template.add(
            &namespace_id,
            Resource::new(
                "AWS::ServiceDiscovery::PrivateDnsNamespace",
                json!({ "Name": namespace, "Vpc": fns::ref_(&vpc.id) }),
            ),
        )?;

        Ok(Self {
            id: id.to_string(),
            namespace_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FargateServiceProps {
    /// Image name; also the service name, log group suffix and stream prefix.
    pub image: String,
    pub ports: Vec<u16>,
    pub environment: BTreeMap<String, Value>,
    pub cpu: u32,
    pub memory_mib: u32,
    pub log_retention_days: u32,
}

impl FargateServiceProps {
    pub fn new(image: &str, ports: &[u16]) -> Self {
        Self {
            image: image.to_string(),
            ports: ports.to_vec(),
            environment: BTreeMap::new(),
            cpu: 256,
            memory_mib: 512,
            log_retention_days: 1,
        }
    }

    pub fn env(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.environment.insert(name.to_string(), value.into());
        self
    }
}

/// A single-container Fargate service in the private subnets.
#[derive(Debug, Clone)]
pub struct FargateService {
    /// Logical id of the `AWS::ECS::Service` resource.
    pub id: String,
    pub task_definition_id: String,
    pub security_group_id: String,
    pub container_name: String,
}

impl FargateService {
    pub fn create(
        template: &mut Template,
        id: &str,
        cluster: &Cluster,
        vpc: &Vpc,
        props: &FargateServiceProps,
    ) -> Result<Self, StackError> {
        let built = Self::create_task(template, id, vpc, props, Vec::new())?;

        template.add(
            id,
            Resource::new(
                "AWS::ECS::Service",
                json!({
                    "Cluster": fns::ref_(&cluster.id),
                    "ServiceName": props.image,
                    "LaunchType": "FARGATE",
                    "DesiredCount": 1,
                    "TaskDefinition": fns::ref_(&built.task_definition_id),
                    "NetworkConfiguration": built.network_configuration(vpc),
                    "DeploymentConfiguration": {
                        "MaximumPercent": 200,
                        "MinimumHealthyPercent": 50,
                    },
                }),
            ),
        )?;

        Ok(built)
    }

    /// Log group, execution role, security group and task definition for `id`.
    fn create_task(
        template: &mut Template,
        id: &str,
        vpc: &Vpc,
        props: &FargateServiceProps,
        ingress: Vec<Value>,
    ) -> Result<Self, StackError> {
        let log_group = format!("{}LogGroup", id);
        let role = format!("{}TaskExecutionRole", id);
        let task = format!("{}Task", id);
        let sg = format!("{}SecurityGroup", id);
        let container_name = format!("{}Container", props.image);

        template.add(
            &log_group,
            Resource::new(
                "AWS::Logs::LogGroup",
                json!({
                    "LogGroupName": format!("/ecs/{}", props.image),
                    "RetentionInDays": props.log_retention_days,
                }),
            )
            .destroy_on_removal(),
        )?;
        template.add(
            &role,
            Resource::new(
                "AWS::IAM::Role",
                json!({
                    "AssumeRolePolicyDocument": {
                        "Version": "2012-10-17",
                        "Statement": [{
                            "Action": "sts:AssumeRole",
                            "Effect": "Allow",
                            "Principal": { "Service": "ecs-tasks.amazonaws.com" },
                        }],
                    },
                    "ManagedPolicyArns": [TASK_EXECUTION_POLICY],
                }),
            ),
        )?;
        security_group(
            template,
            &sg,
            vpc,
            &format!("Security group for {}", props.image),
            ingress,
        )?;

        let port_mappings: Vec<Value> = props
            .ports
            .iter()
            .map(|port| json!({ "ContainerPort": port, "HostPort": port, "Protocol": "tcp" }))
            .collect();
        let environment: Vec<Value> = props
            .environment
            .iter()
            .map(|(name, value)| json!({ "Name": name, "Value": value }))
            .collect();

        template.add(
            &task,
            Resource::new(
                "AWS::ECS::TaskDefinition",
                json!({
                    "Family": props.image,
                    "Cpu": props.cpu.to_string(),
                    "Memory": props.memory_mib.to_string(),
                    "NetworkMode": "awsvpc",
                    "RequiresCompatibilities": ["FARGATE"],
                    "ExecutionRoleArn": fns::get_att(&role, "Arn"),
                    "ContainerDefinitions": [{
                        "Name": container_name,
                        "Image": props.image,
                        "Essential": true,
                        "PortMappings": port_mappings,
                        "Environment": environment,
                        "LogConfiguration": {
                            "LogDriver": "awslogs",
                            "Options": {
                                "awslogs-group": fns::ref_(&log_group),
                                "awslogs-stream-prefix": props.image,
                                "awslogs-region": fns::ref_("AWS::Region"),
                            },
                        },
                    }],
                }),
            ),
        )?;

        Ok(Self {
            id: id.to_string(),
            task_definition_id: task,
            security_group_id: sg,
            container_name,
        })
    }

    fn network_configuration(&self, vpc: &Vpc) -> Value {
        json!({
            "AwsvpcConfiguration": {
                "AssignPublicIp": "DISABLED",
                "Subnets": vpc.private_subnet_refs(),
                "SecurityGroups": [fns::get_att(&self.security_group_id, "GroupId")],
            },
        })
    }
}

/// A Fargate service fronted by an internet-facing application load balancer on port 80.
#[derive(Debug, Clone)]
pub struct LoadBalancedService {
    pub service: FargateService,
    pub load_balancer_id: String,
}

impl LoadBalancedService {
    pub fn create(
        template: &mut Template,
        id: &str,
        cluster: &Cluster,
        vpc: &Vpc,
        props: &FargateServiceProps,
        health_check_grace_period_secs: u32,
    ) -> Result<Self, StackError> {
        let lb = format!("{}LB", id);
        let lb_sg = format!("{}LBSecurityGroup", id);
        let listener = format!("{}LBPublicListener", id);
        let target_group = format!("{}LBPublicListenerECSGroup", id);
        let container_port = props.ports.first().copied().unwrap_or(80);

        security_group(
            template,
            &lb_sg,
            vpc,
            &format!("Load balancer security group for {}", props.image),
            vec![json!({
                "CidrIp": "0.0.0.0/0",
                "Description": "Allow from anyone on port 80",
                "FromPort": 80,
                "IpProtocol": "tcp",
                "ToPort": 80,
            })],
        )?;
        template.add(
            &lb,
            Resource::new(
                "AWS::ElasticLoadBalancingV2::LoadBalancer",
                json!({
                    "Type": "application",
                    "Scheme": "internet-facing",
                    "Subnets": vpc.public_subnet_refs(),
                    "SecurityGroups": [fns::get_att(&lb_sg, "GroupId")],
                    "LoadBalancerAttributes": [
                        { "Key": "deletion_protection.enabled", "Value": "false" },
                    ],
                }),
            )
            .depends_on(vpc.public_default_routes.iter().cloned()),
        )?;
        template.add(
            &target_group,
            Resource::new(
                "AWS::ElasticLoadBalancingV2::TargetGroup",
                json!({
                    "Port": 80,
                    "Protocol": "HTTP",
                    "TargetType": "ip",
                    "VpcId": fns::ref_(&vpc.id),
                    "TargetGroupAttributes": [
                        { "Key": "stickiness.enabled", "Value": "false" },
                    ],
                }),
            ),
        )?;
        template.add(
            &listener,
            Resource::new(
                "AWS::ElasticLoadBalancingV2::Listener",
                json!({
                    "LoadBalancerArn": fns::ref_(&lb),
                    "Port": 80,
                    "Protocol": "HTTP",
                    "DefaultActions": [{
                        "Type": "forward",
                        "TargetGroupArn": fns::ref_(&target_group),
                    }],
                }),
            ),
        )?;

        let ingress = vec![json!({
            "SourceSecurityGroupId": fns::get_att(&lb_sg, "GroupId"),
            "Description": "Load balancer to target",
            "FromPort": container_port,
            "IpProtocol": "tcp",
            "ToPort": container_port,
        })];
        let built = FargateService::create_task(template, id, vpc, props, ingress)?;

        template.add(
            id,
            Resource::new(
                "AWS::ECS::Service",
                json!({
                    "Cluster": fns::ref_(&cluster.id),
                    "ServiceName": props.image,
                    "LaunchType": "FARGATE",
                    "DesiredCount": 1,
                    "TaskDefinition": fns::ref_(&built.task_definition_id),
                    "NetworkConfiguration": built.network_configuration(vpc),
                    "HealthCheckGracePeriodSeconds": health_check_grace_period_secs,
                    "LoadBalancers": [{
                        "ContainerName": built.container_name,
                        "ContainerPort": container_port,
                        "TargetGroupArn": fns::ref_(&target_group),
                    }],
                    "DeploymentConfiguration": {
                        "MaximumPercent": 200,
                        "MinimumHealthyPercent": 50,
                    },
                }),
            )
            .depends_on([listener.clone(), target_group.clone()]),
        )?;

        template.add_output(
            &format!("{}LoadBalancerDNS", id),
            fns::get_att(&lb, "DNSName"),
            Some("Public DNS name of the load balancer"),
        );

        Ok(Self {
            service: built,
            load_balancer_id: lb,
        })
    }
}

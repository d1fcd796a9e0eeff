use serde_json::{json, Value};

use crate::constructs::network::{security_group, Vpc};
use crate::error::StackError;
use crate::template::{fns, Resource, Template};

/// Master user of every generated database secret.
pub const MASTER_USERNAME: &str = "admin_user";

#[derive(Debug, Clone)]
pub struct DatabaseProps {
    pub engine_version: String,
    pub instance_class: String,
    pub allocated_storage_gib: u32,
}

impl Default for DatabaseProps {
    fn default() -> Self {
        Self {
            engine_version: "17.2".to_string(),
            instance_class: "db.t2.micro".to_string(),
            allocated_storage_gib: 20,
        }
    }
}

/// A Postgres instance with a generated master secret.
#[derive(Debug, Clone)]
pub struct Database {
    pub id: String,
    pub db_name: String,
    pub secret_id: String,
}

impl Database {
    pub fn create(
        template: &mut Template,
        id: &str,
        db_name: &str,
        vpc: &Vpc,
        props: &DatabaseProps,
    ) -> Result<Self, StackError> {
        let subnet_group = format!("{}SubnetGroup", id);
        let sg = format!("{}SecurityGroup", id);
        let secret = format!("{}Secret", id);

        template.add(
            &subnet_group,
            Resource::new(
                "AWS::RDS::DBSubnetGroup",
                json!({
                    "DBSubnetGroupDescription": format!("Subnet group for {} database", id),
                    "SubnetIds": vpc.private_subnet_refs(),
                }),
            )
            .destroy_on_removal(),
        )?;
        security_group(
            template,
            &sg,
            vpc,
            &format!("Security group for {} database", id),
            Vec::new(),
        )?;
        template.add(
            &secret,
            Resource::new(
                "AWS::SecretsManager::Secret",
                json!({
                    "Description": format!("Generated by the stack synthesizer for {}", id),
                    "GenerateSecretString": {
                        "SecretStringTemplate": json!({ "username": MASTER_USERNAME }).to_string(),
                        "GenerateStringKey": "password",
                        "PasswordLength": 30,
                        "ExcludeCharacters": " %+~`#$&*()|[]{}:;<>?!'/@\"\\",
                    },
                }),
            )
            .destroy_on_removal(),
        )?;
        template.add(
            id,
            Resource::new(
                "AWS::RDS::DBInstance",
                json!({
                    "Engine": "postgres",
                    "EngineVersion": props.engine_version,
                    "DBInstanceClass": props.instance_class,
                    "AllocatedStorage": props.allocated_storage_gib.to_string(),
                    "StorageType": "gp2",
                    "DBName": db_name,
                    "MasterUsername": fns::secret_field(&secret, "username"),
                    "MasterUserPassword": fns::secret_field(&secret, "password"),
                    "DBSubnetGroupName": fns::ref_(&subnet_group),
                    "VPCSecurityGroups": [fns::get_att(&sg, "GroupId")],
                    "PubliclyAccessible": false,
                    "CopyTagsToSnapshot": true,
                }),
            )
            .destroy_on_removal(),
        )?;
        template.add(
            &format!("{}SecretAttachment", id),
            Resource::new(
                "AWS::SecretsManager::SecretTargetAttachment",
                json!({
                    "SecretId": fns::ref_(&secret),
                    "TargetId": fns::ref_(id),
                    "TargetType": "AWS::RDS::DBInstance",
                }),
            ),
        )?;

        Ok(Self {
            id: id.to_string(),
            db_name: db_name.to_string(),
            secret_id: secret,
        })
    }

    pub fn endpoint_address(&self) -> Value {
        fns::get_att(&self.id, "Endpoint.Address")
    }

    pub fn endpoint_port(&self) -> Value {
        fns::get_att(&self.id, "Endpoint.Port")
    }

    /// `postgres://admin_user:<password>@<address>:<port>/<db>` assembled at deploy time.
    pub fn connection_url(&self) -> Value {
        fns::join(
            "",
            vec![
                json!(format!("postgres://{}:", MASTER_USERNAME)),
                fns::secret_field(&self.secret_id, "password"),
                json!("@"),
                self.endpoint_address(),
                json!(":"),
                self.endpoint_port(),
                json!(format!("/{}", self.db_name)),
            ],
        )
    }

    /// Route53 TCP health check against the instance endpoint.
    pub fn add_health_check(&self, template: &mut Template, id: &str) -> Result<String, StackError> {
        template.add(
            id,
            Resource::new(
                "AWS::Route53::HealthCheck",
                json!({
                    "HealthCheckConfig": {
                        "Type": "TCP",
                        "IPAddress": self.endpoint_address(),
                        "Port": self.endpoint_port(),
                        "RequestInterval": 30,
                        "FailureThreshold": 3,
                    },
                }),
            ),
        )?;
        Ok(id.to_string())
    }
}

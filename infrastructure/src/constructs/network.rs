use serde_json::{json, Value};

use crate::error::StackError;
use crate::template::{fns, Resource, Template};

const VPC_CIDR_PREFIX: &str = "10.0";

/// A VPC with one public and one private subnet per availability zone.
///
/// Private subnets reach the internet through a NAT gateway in the public
/// subnet of the same zone.
#[derive(Debug, Clone)]
pub struct Vpc {
    pub id: String,
    pub public_subnets: Vec<String>,
    pub private_subnets: Vec<String>,
    /// Internet routes of the public subnets; internet-facing resources wait on these.
    pub public_default_routes: Vec<String>,
}

/// Split `10.0.0.0/16` into `count` equal blocks (rounded up to a power of two).
pub fn subnet_cidrs(count: u32) -> Vec<String> {
    let bits = count.max(1).next_power_of_two().trailing_zeros();
    let step = 256u32 >> bits;
    (0..count)
        .map(|i| format!("{}.{}.0/{}", VPC_CIDR_PREFIX, i * step, 16 + bits))
        .collect()
}

impl Vpc {
    pub fn create(template: &mut Template, id: &str, max_azs: u32) -> Result<Self, StackError> {
        if !(1..=6).contains(&max_azs) {
            return Err(StackError::InvalidAzCount(max_azs));
        }

        template.add(
            id,
            Resource::new(
                "AWS::EC2::VPC",
                json!({
                    "CidrBlock": format!("{}.0.0/16", VPC_CIDR_PREFIX),
                    "EnableDnsHostnames": true,
                    "EnableDnsSupport": true,
                    "InstanceTenancy": "default",
                    "Tags": fns::tags(id),
                }),
            ),
        )?;

        let igw = format!("{}IGW", id);
        let attachment = format!("{}VPCGW", id);
        template.add(
            &igw,
            Resource::new("AWS::EC2::InternetGateway", json!({ "Tags": fns::tags(id) })),
        )?;
        template.add(
            &attachment,
            Resource::new(
                "AWS::EC2::VPCGatewayAttachment",
                json!({ "VpcId": fns::ref_(id), "InternetGatewayId": fns::ref_(&igw) }),
            ),
        )?;

        let cidrs = subnet_cidrs(max_azs * 2);
        let mut vpc = Self {
            id: id.to_string(),
            public_subnets: Vec::new(),
            private_subnets: Vec::new(),
            public_default_routes: Vec::new(),
        };

        for az in 0..max_azs as usize {
            let public_cidr = &cidrs[az];
            let private_cidr = &cidrs[max_azs as usize + az];

            let public = format!("{}PublicSubnet{}", id, az + 1);
            let nat = vpc.add_subnet(template, &public, az, public_cidr, true)?;
            template.add(
                &format!("{}DefaultRoute", public),
                Resource::new(
                    "AWS::EC2::Route",
                    json!({
                        "RouteTableId": fns::ref_(&format!("{}RouteTable", public)),
                        "DestinationCidrBlock": "0.0.0.0/0",
                        "GatewayId": fns::ref_(&igw),
                    }),
                )
                .depends_on([attachment.clone()]),
            )?;
            let eip = format!("{}EIP", public);
            template.add(
                &eip,
                Resource::new(
                    "AWS::EC2::EIP",
                    json!({ "Domain": "vpc", "Tags": fns::tags(&public) }),
                ),
            )?;
            template.add(
                &nat,
                Resource::new(
                    "AWS::EC2::NatGateway",
                    json!({
                        "SubnetId": fns::ref_(&format!("{}Subnet", public)),
                        "AllocationId": fns::get_att(&eip, "AllocationId"),
                        "Tags": fns::tags(&public),
                    }),
                )
                .depends_on([
                    format!("{}DefaultRoute", public),
                    format!("{}RouteTableAssociation", public),
                ]),
            )?;
            vpc.public_subnets.push(format!("{}Subnet", public));
            vpc.public_default_routes.push(format!("{}DefaultRoute", public));

            let private = format!("{}PrivateSubnet{}", id, az + 1);
            vpc.add_subnet(template, &private, az, private_cidr, false)?;
            template.add(
                &format!("{}DefaultRoute", private),
                Resource::new(
                    "AWS::EC2::Route",
                    json!({
                        "RouteTableId": fns::ref_(&format!("{}RouteTable", private)),
                        "DestinationCidrBlock": "0.0.0.0/0",
                        "NatGatewayId": fns::ref_(&nat),
                    }),
                ),
            )?;
            vpc.private_subnets.push(format!("{}Subnet", private));
        }

        Ok(vpc)
    }

    /// Subnet, route table and association. Returns the id reserved for the zone's NAT gateway.
    fn add_subnet(
        &self,
        template: &mut Template,
        prefix: &str,
        az: usize,
        cidr: &str,
        public: bool,
    ) -> Result<String, StackError> {
        let subnet = format!("{}Subnet", prefix);
        let route_table = format!("{}RouteTable", prefix);
        let subnet_type = if public { "Public" } else { "Private" };

        template.add(
            &subnet,
            Resource::new(
                "AWS::EC2::Subnet",
                json!({
                    "VpcId": fns::ref_(&self.id),
                    "AvailabilityZone": fns::select(az, fns::get_azs()),
                    "CidrBlock": cidr,
                    "MapPublicIpOnLaunch": public,
                    "Tags": [
                        { "Key": "Name", "Value": prefix },
                        { "Key": "aws-cdk:subnet-type", "Value": subnet_type },
                    ],
                }),
            ),
        )?;
        template.add(
            &route_table,
            Resource::new(
                "AWS::EC2::RouteTable",
                json!({ "VpcId": fns::ref_(&self.id), "Tags": fns::tags(prefix) }),
            ),
        )?;
        template.add(
            &format!("{}RouteTableAssociation", prefix),
            Resource::new(
                "AWS::EC2::SubnetRouteTableAssociation",
                json!({
                    "RouteTableId": fns::ref_(&route_table),
                    "SubnetId": fns::ref_(&subnet),
                }),
            ),
        )?;

        Ok(format!("{}NATGateway", prefix))
    }

    pub fn public_subnet_refs(&self) -> Value {
        Value::Array(self.public_subnets.iter().map(|s| fns::ref_(s)).collect())
    }

    pub fn private_subnet_refs(&self) -> Value {
        Value::Array(self.private_subnets.iter().map(|s| fns::ref_(s)).collect())
    }

    pub fn az_count(&self) -> u32 {
        self.private_subnets.len() as u32
    }
}

/// A security group in `vpc` allowing all egress.
pub fn security_group(
    template: &mut Template,
    id: &str,
    vpc: &Vpc,
    description: &str,
    ingress: Vec<Value>,
) -> Result<(), StackError> {
    let mut properties = json!({
        "GroupDescription": description,
        "VpcId": fns::ref_(&vpc.id),
        "SecurityGroupEgress": [{
            "CidrIp": "0.0.0.0/0",
            "Description": "Allow all outbound traffic by default",
            "IpProtocol": "-1",
        }],
    });
    if !ingress.is_empty() {
        properties["SecurityGroupIngress"] = Value::Array(ingress);
    }
    template.add(id, Resource::new("AWS::EC2::SecurityGroup", properties))
}

//! A typed subset of the CloudFormation template format.
//!
//! Resources live in a `BTreeMap` and dependencies in a `BTreeSet`, so the
//! rendered JSON is byte-for-byte stable across runs.

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::StackError;

pub const FORMAT_VERSION: &str = "2010-09-09";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Policy {
    Delete,
    Retain,
    Snapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub depends_on: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<Policy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<Policy>,
}

impl Resource {
    /// `properties` must be a JSON object; anything else yields no properties.
    pub fn new(resource_type: &str, properties: Value) -> Self {
        let properties = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            resource_type: resource_type.to_string(),
            properties,
            depends_on: BTreeSet::new(),
            deletion_policy: None,
            update_replace_policy: None,
        }
    }

    /// Delete on stack removal and on replacement.
    pub fn destroy_on_removal(mut self) -> Self {
        self.deletion_policy = Some(Policy::Delete);
        self.update_replace_policy = Some(Policy::Delete);
        self
    }

    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "Resources")]
    pub resources: BTreeMap<String, Resource>,
    #[serde(rename = "Outputs", skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

impl Default for Template {
    fn default() -> Self {
        Self::new()
    }
}

impl Template {
    pub fn new() -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            description: None,
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, logical_id: &str, resource: Resource) -> Result<(), StackError> {
        if self.resources.contains_key(logical_id) {
            return Err(StackError::DuplicateResource(logical_id.to_string()));
        }
        self.resources.insert(logical_id.to_string(), resource);
        Ok(())
    }

    pub fn get(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    /// Record that `from` must be created after `on`.
    pub fn add_dependency(&mut self, from: &str, on: &str) -> Result<(), StackError> {
        if from == on {
            return Err(StackError::SelfDependency(from.to_string()));
        }
        if !self.resources.contains_key(on) {
            return Err(StackError::UnknownDependency {
                from: from.to_string(),
                on: on.to_string(),
            });
        }
        let resource = self
            .resources
            .get_mut(from)
            .ok_or_else(|| StackError::UnknownDependency {
                from: from.to_string(),
                on: on.to_string(),
            })?;
        resource.depends_on.insert(on.to_string());
        Ok(())
    }

    pub fn add_output(&mut self, name: &str, value: Value, description: Option<&str>) {
        self.outputs.insert(
            name.to_string(),
            Output {
                value,
                description: description.map(str::to_string),
            },
        );
    }

    /// Check that every `DependsOn`, `Ref` and `Fn::GetAtt` names a resource in this template.
    pub fn validate(&self) -> Result<(), StackError> {
        for (id, resource) in &self.resources {
            for on in &resource.depends_on {
                if !self.resources.contains_key(on) {
                    return Err(StackError::UnknownDependency {
                        from: id.clone(),
                        on: on.clone(),
                    });
                }
            }

            let mut targets = Vec::new();
            for value in resource.properties.values() {
                collect_references(value, &mut targets);
            }
            if let Some(target) = targets.into_iter().find(|t| !self.resources.contains_key(t)) {
                return Err(StackError::DanglingReference {
                    from: id.clone(),
                    target,
                });
            }
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String, StackError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Logical ids of every resource of the given type.
    pub fn ids_of_type(&self, resource_type: &str) -> Vec<&str> {
        self.resources
            .iter()
            .filter(|(_, r)| r.resource_type == resource_type)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// Resource ids named by `Ref` or `Fn::GetAtt`. Pseudo parameters (`AWS::...`) are skipped.
fn collect_references(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(target)) = map.get("Ref") {
                if !target.starts_with("AWS::") {
                    out.push(target.clone());
                }
            }
            if let Some(Value::Array(parts)) = map.get("Fn::GetAtt") {
                if let Some(Value::String(target)) = parts.first() {
                    out.push(target.clone());
                }
            }
            for nested in map.values() {
                collect_references(nested, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        _ => {}
    }
}

/// Intrinsic function helpers.
pub mod fns {
    use super::*;

    pub fn ref_(logical_id: &str) -> Value {
        json!({ "Ref": logical_id })
    }

    pub fn get_att(logical_id: &str, attribute: &str) -> Value {
        json!({ "Fn::GetAtt": [logical_id, attribute] })
    }

    pub fn join(separator: &str, parts: Vec<Value>) -> Value {
        json!({ "Fn::Join": [separator, parts] })
    }

    pub fn select(index: usize, list: Value) -> Value {
        json!({ "Fn::Select": [index, list] })
    }

    pub fn get_azs() -> Value {
        json!({ "Fn::GetAZs": "" })
    }

    /// Dynamic reference to one JSON field of a Secrets Manager secret.
    pub fn secret_field(secret_id: &str, field: &str) -> Value {
        join(
            "",
            vec![
                json!("{{resolve:secretsmanager:"),
                ref_(secret_id),
                json!(format!(":SecretString:{}::}}}}", field)),
            ],
        )
    }

    pub fn tags(name: &str) -> Value {
        json!([{ "Key": "Name", "Value": name }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket() -> Resource {
        Resource::new("AWS::S3::Bucket", json!({}))
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut template = Template::new();
        template.add("Bucket", bucket()).unwrap();

        assert!(matches!(
            template.add("Bucket", bucket()),
            Err(StackError::DuplicateResource(id)) if id == "Bucket"
        ));
    }

    #[test]
    fn test_dependency_requires_both_resources() {
        let mut template = Template::new();
        template.add("A", bucket()).unwrap();

        assert!(template.add_dependency("A", "B").is_err());
        assert!(template.add_dependency("A", "A").is_err());

        template.add("B", bucket()).unwrap();
        template.add_dependency("A", "B").unwrap();
        assert!(template.get("A").unwrap().depends_on.contains("B"));
    }

    #[test]
    fn test_validate_finds_dangling_references() {
        let mut template = Template::new();
        template
            .add(
                "Topic",
                Resource::new(
                    "AWS::SNS::Topic",
                    json!({
                        "Region": fns::ref_("AWS::Region"),
                        "Owner": fns::get_att("Missing", "Arn"),
                    }),
                ),
            )
            .unwrap();

        assert!(matches!(
            template.validate(),
            Err(StackError::DanglingReference { target, .. }) if target == "Missing"
        ));
    }

    #[test]
    fn test_serialization_uses_cloudformation_keys() {
        let mut template = Template::new();
        template
            .add(
                "Db",
                Resource::new("AWS::RDS::DBInstance", json!({ "Engine": "postgres" }))
                    .destroy_on_removal(),
            )
            .unwrap();
        template
            .add("Svc", bucket().depends_on(["Db"]))
            .unwrap();

        let rendered: Value = serde_json::from_str(&template.to_json_pretty().unwrap()).unwrap();
        assert_eq!(rendered["AWSTemplateFormatVersion"], FORMAT_VERSION);
        assert_eq!(rendered["Resources"]["Db"]["Type"], "AWS::RDS::DBInstance");
        assert_eq!(rendered["Resources"]["Db"]["DeletionPolicy"], "Delete");
        assert_eq!(rendered["Resources"]["Svc"]["DependsOn"], json!(["Db"]));
        assert!(rendered["Resources"]["Svc"].get("Properties").is_none());
    }

    #[test]
    fn test_secret_field_resolves_json_key() {
        let value = fns::secret_field("DbSecret", "password");
        assert_eq!(
            value,
            json!({ "Fn::Join": ["", [
                "{{resolve:secretsmanager:",
                { "Ref": "DbSecret" },
                ":SecretString:password::}}"
            ]] })
        );
    }
}

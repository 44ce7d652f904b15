//! Device ACL templates.
//!
//! Inbound rules are ordered by their sequence number; the list position
//! carries no meaning to the server.

use crate::client::{path_segment, NetEdgeClient};
use crate::Result;
use netedge_core::pagination::{OffsetPage, PagingConfig};
use reqwest::Method;
use tracing::debug;

const ACL_TEMPLATES_PATH: &str = "/ne/v1/aclTemplates";

/// Named set of inbound rules applicable to devices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AclTemplate {
    /// Template identifier
    pub uuid: Option<String>,
    /// Template name
    pub name: Option<String>,
    /// Free text description
    pub description: Option<String>,
    /// Metro the template was created in
    pub metro_code: Option<String>,
    /// ACL status on the device the template is applied to
    pub device_acl_status: Option<String>,
    /// Inbound rules
    pub inbound_rules: Option<Vec<AclTemplateInboundRule>>,
    /// Devices the template is applied to
    pub device_details: Option<Vec<AclTemplateDeviceDetails>>,
}

/// Single inbound rule of an ACL template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AclTemplateInboundRule {
    /// Position of the rule within the template
    pub seq_no: Option<i64>,
    /// Source type, e.g. `SUBNET`
    pub src_type: Option<String>,
    /// Source subnets
    pub subnets: Option<Vec<String>>,
    /// Protocol, e.g. `TCP`
    pub protocol: Option<String>,
    /// Source port or range
    pub src_port: Option<String>,
    /// Destination port or range
    pub dst_port: Option<String>,
    /// Rule description
    pub description: Option<String>,
}

/// Device an ACL template is applied to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AclTemplateDeviceDetails {
    /// Device identifier
    pub uuid: Option<String>,
    /// Device name
    pub name: Option<String>,
    /// ACL provisioning status on the device
    pub acl_status: Option<String>,
}

mod wire {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct AclTemplate {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub uuid: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub metro_code: Option<String>,
        #[serde(rename = "deviceAclstatus", skip_serializing_if = "Option::is_none")]
        pub device_acl_status: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub inbound_rules: Option<Vec<AclTemplateInboundRule>>,
        #[serde(rename = "virtualDeviceDetails", skip_serializing)]
        pub device_details: Option<Vec<AclTemplateDeviceDetails>>,
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct AclTemplateInboundRule {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub seq_no: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub src_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub subnets: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub protocol: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub src_port: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub dst_port: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct AclTemplateDeviceDetails {
        pub uuid: Option<String>,
        pub name: Option<String>,
        pub acl_status: Option<String>,
    }
}

impl From<wire::AclTemplateInboundRule> for AclTemplateInboundRule {
    fn from(wire: wire::AclTemplateInboundRule) -> Self {
        Self {
            seq_no: wire.seq_no,
            src_type: wire.src_type,
            subnets: wire.subnets,
            protocol: wire.protocol,
            src_port: wire.src_port,
            dst_port: wire.dst_port,
            description: wire.description,
        }
    }
}

impl From<&AclTemplateInboundRule> for wire::AclTemplateInboundRule {
    fn from(rule: &AclTemplateInboundRule) -> Self {
        Self {
            seq_no: rule.seq_no,
            src_type: rule.src_type.clone(),
            subnets: rule.subnets.clone(),
            protocol: rule.protocol.clone(),
            src_port: rule.src_port.clone(),
            dst_port: rule.dst_port.clone(),
            description: rule.description.clone(),
        }
    }
}

impl From<wire::AclTemplateDeviceDetails> for AclTemplateDeviceDetails {
    fn from(wire: wire::AclTemplateDeviceDetails) -> Self {
        Self {
            uuid: wire.uuid,
            name: wire.name,
            acl_status: wire.acl_status,
        }
    }
}

impl From<wire::AclTemplate> for AclTemplate {
    fn from(wire: wire::AclTemplate) -> Self {
        Self {
            uuid: wire.uuid,
            name: wire.name,
            description: wire.description,
            metro_code: wire.metro_code,
            device_acl_status: wire.device_acl_status,
            inbound_rules: wire
                .inbound_rules
                .map(|rules| rules.into_iter().map(AclTemplateInboundRule::from).collect()),
            device_details: wire
                .device_details
                .map(|details| details.into_iter().map(AclTemplateDeviceDetails::from).collect()),
        }
    }
}

impl From<&AclTemplate> for wire::AclTemplate {
    fn from(template: &AclTemplate) -> Self {
        Self {
            uuid: template.uuid.clone(),
            name: template.name.clone(),
            description: template.description.clone(),
            metro_code: template.metro_code.clone(),
            device_acl_status: template.device_acl_status.clone(),
            inbound_rules: inbound_rules(template),
            device_details: None,
        }
    }
}

fn inbound_rules(template: &AclTemplate) -> Option<Vec<wire::AclTemplateInboundRule>> {
    template
        .inbound_rules
        .as_ref()
        .map(|rules| rules.iter().map(wire::AclTemplateInboundRule::from).collect())
}

fn template_path(uuid: &str) -> Result<String> {
    Ok(format!("{ACL_TEMPLATES_PATH}/{}", path_segment(uuid)?))
}

impl NetEdgeClient {
    /// Create an ACL template and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns the request failure, or [`netedge_core::Error::InvalidResponse`]
    /// if the identifier cannot be determined.
    pub async fn create_acl_template(&self, template: &AclTemplate) -> Result<String> {
        self.post_created(ACL_TEMPLATES_PATH, &wire::AclTemplate::from(template))
            .await
    }

    /// List every ACL template.
    ///
    /// # Errors
    ///
    /// Returns the first failing page request.
    pub async fn list_acl_templates(&self) -> Result<Vec<AclTemplate>> {
        let templates = self
            .list_all::<OffsetPage<wire::AclTemplate>>(ACL_TEMPLATES_PATH, PagingConfig::offset())
            .await?;
        Ok(templates.into_iter().map(AclTemplate::from).collect())
    }

    /// Fetch an ACL template by identifier.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_acl_template(&self, uuid: &str) -> Result<AclTemplate> {
        let template: wire::AclTemplate = self.get_json(&template_path(uuid)?, &[]).await?;
        Ok(AclTemplate::from(template))
    }

    /// Replace the definition of an ACL template.
    ///
    /// Only name, description, metro code and inbound rules are sent.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn replace_acl_template(&self, uuid: &str, template: &AclTemplate) -> Result<()> {
        let body = wire::AclTemplate {
            name: template.name.clone(),
            description: template.description.clone(),
            metro_code: template.metro_code.clone(),
            inbound_rules: inbound_rules(template),
            ..Default::default()
        };
        debug!(template = %uuid, "Replacing ACL template");
        self.send_empty(Method::PUT, &template_path(uuid)?, Some(&body), &[])
            .await
    }

    /// Delete an ACL template.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn delete_acl_template(&self, uuid: &str) -> Result<()> {
        self.send_empty::<()>(Method::DELETE, &template_path(uuid)?, None, &[])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::test_client;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_template() -> AclTemplate {
        AclTemplate {
            name: Some("test".to_string()),
            description: Some("Test ACL".to_string()),
            metro_code: Some("SV".to_string()),
            inbound_rules: Some(vec![
                AclTemplateInboundRule {
                    seq_no: Some(2),
                    src_type: Some("DOMAIN".to_string()),
                    subnets: Some(vec!["216.221.225.13/32".to_string()]),
                    protocol: Some("TCP".to_string()),
                    src_port: Some("any".to_string()),
                    dst_port: Some("1024-10000".to_string()),
                    description: None,
                },
                AclTemplateInboundRule {
                    seq_no: Some(1),
                    src_type: Some("SUBNET".to_string()),
                    subnets: Some(vec!["10.0.0.0/24".to_string()]),
                    protocol: Some("TCP".to_string()),
                    src_port: Some("any".to_string()),
                    dst_port: Some("22".to_string()),
                    description: Some("Description of the rule".to_string()),
                },
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn test_mapping_keeps_rule_sequence_numbers() {
        let template = test_template();
        let wire = wire::AclTemplate::from(&template);
        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(value["inboundRules"][0]["seqNo"], 2);
        assert_eq!(value["inboundRules"][1]["seqNo"], 1);
        assert!(value.get("virtualDeviceDetails").is_none());

        let back = AclTemplate::from(wire);
        assert_eq!(back, template);
    }

    #[tokio::test]
    async fn test_create_template() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ne/v1/aclTemplates"))
            .and(body_json(
                serde_json::to_value(wire::AclTemplate::from(&test_template())).unwrap(),
            ))
            .respond_with(ResponseTemplate::new(201).insert_header(
                "Location",
                "/ne/v1/aclTemplates/299cd6f2-714e-4265-a07c-48944a6ac3bd",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let uuid = client.create_acl_template(&test_template()).await.unwrap();
        assert_eq!(uuid, "299cd6f2-714e-4265-a07c-48944a6ac3bd");
    }

    #[tokio::test]
    async fn test_list_templates_with_device_details() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ne/v1/aclTemplates"))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pagination": {"offset": 0, "limit": 100, "total": 1},
                "data": [{
                    "uuid": "db66bf49",
                    "name": "test",
                    "deviceAclstatus": "PROVISIONED",
                    "inboundRules": [{"seqNo": 1, "srcType": "SUBNET", "subnets": ["10.0.0.0/24"]}],
                    "virtualDeviceDetails": [
                        {"uuid": "dev-1", "name": "router", "aclStatus": "PROVISIONED"}
                    ]
                }]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let templates = client.list_acl_templates().await.unwrap();
        assert_eq!(templates.len(), 1);
        let template = &templates[0];
        assert_eq!(template.device_acl_status.as_deref(), Some("PROVISIONED"));
        assert_eq!(template.inbound_rules.as_ref().unwrap()[0].seq_no, Some(1));
        assert_eq!(
            template.device_details,
            Some(vec![AclTemplateDeviceDetails {
                uuid: Some("dev-1".to_string()),
                name: Some("router".to_string()),
                acl_status: Some("PROVISIONED".to_string()),
            }])
        );
        assert!(template.description.is_none());
    }

    #[tokio::test]
    async fn test_replace_sends_editable_fields_only() {
        let server = MockServer::start().await;
        let mut template = test_template();
        template.uuid = Some("db66bf49".to_string());
        template.device_acl_status = Some("PROVISIONED".to_string());

        let mut expected = serde_json::to_value(wire::AclTemplate::from(&test_template())).unwrap();
        expected.as_object_mut().unwrap().remove("uuid");
        Mock::given(method("PUT"))
            .and(path("/ne/v1/aclTemplates/db66bf49"))
            .and(body_json(expected))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        client.replace_acl_template("db66bf49", &template).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_and_delete_template() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ne/v1/aclTemplates/db66bf49"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uuid": "db66bf49", "name": "test", "metroCode": "SV"
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/ne/v1/aclTemplates/db66bf49"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let template = client.get_acl_template("db66bf49").await.unwrap();
        assert_eq!(template.metro_code.as_deref(), Some("SV"));
        assert!(template.inbound_rules.is_none());
        client.delete_acl_template("db66bf49").await.unwrap();
    }

    #[tokio::test]
    async fn test_template_ids_are_path_escaped() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/ne/v1/aclTemplates/t%2F..%2Fother"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        client
            .replace_acl_template("t/../other", &test_template())
            .await
            .unwrap();
    }
}

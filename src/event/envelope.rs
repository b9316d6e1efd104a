use data_encoding::BASE64;
use serde::{Deserialize, Serialize};

use crate::errors::WardenError;
use crate::models::ServiceLabels;

/// Inbound event envelope. Accepts both the push-delivery shape
/// (`{"message": {"data": ...}}`) and the bare shape (`{"data": ...}`);
/// `data` is a base64-encoded audit log entry in either case.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EventEnvelope {
    #[serde(default)]
    pub message: Option<PushMessage>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PushMessage {
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default, rename = "messageId")]
    pub message_id: Option<String>,
}

impl EventEnvelope {
    /// Decode the payload into an audit log entry. `Ok(None)` means the
    /// envelope carried no payload, which the handler treats as a no-op.
    pub fn decode(&self) -> Result<Option<AuditLogEntry>, WardenError> {
        let Some(data) = self
            .message
            .as_ref()
            .and_then(|m| m.data.as_deref())
            .or(self.data.as_deref())
        else {
            return Ok(None);
        };

        let bytes = BASE64
            .decode(data.as_bytes())
            .map_err(|e| WardenError::Decode(format!("Invalid base64 payload: {}", e)))?;
        let entry: AuditLogEntry = serde_json::from_slice(&bytes)
            .map_err(|e| WardenError::Decode(format!("Invalid audit log payload: {}", e)))?;
        Ok(Some(entry))
    }

    /// Identifier for this delivery, used as a tracking tag on scan jobs.
    pub fn event_id(&self) -> Option<&str> {
        self.message.as_ref().and_then(|m| m.message_id.as_deref())
    }
}

/// Cloud audit log entry emitted when a deployment-affecting API call
/// occurs. Only the fields this system inspects are modeled.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuditLogEntry {
    #[serde(default, rename = "protoPayload")]
    pub proto_payload: ProtoPayload,
    #[serde(default)]
    pub resource: EventResource,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProtoPayload {
    #[serde(default, rename = "methodName")]
    pub method_name: String,
    #[serde(default)]
    pub request: DeploymentRequest,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeploymentRequest {
    #[serde(default)]
    pub template: DeploymentTemplate,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeploymentTemplate {
    #[serde(default)]
    pub containers: Vec<ContainerSpec>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContainerSpec {
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EventResource {
    #[serde(default)]
    pub labels: ResourceLabels,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResourceLabels {
    pub project_id: Option<String>,
    pub service_name: Option<String>,
    pub location: Option<String>,
}

impl AuditLogEntry {
    /// Only create/update service-deployment operations are relevant.
    pub fn is_deployment_event(&self) -> bool {
        let method = &self.proto_payload.method_name;
        method.contains("Services.CreateService") || method.contains("Services.UpdateService")
    }

    /// All container image references in the deployment template.
    pub fn images(&self) -> Vec<String> {
        self.proto_payload
            .request
            .template
            .containers
            .iter()
            .filter_map(|c| c.image.clone())
            .collect()
    }

    pub fn service_labels(&self) -> ServiceLabels {
        ServiceLabels {
            project_id: self.resource.labels.project_id.clone(),
            service_name: self.resource.labels.service_name.clone(),
            location: self.resource.labels.location.clone(),
        }
    }
}

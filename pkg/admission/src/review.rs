//! `admission.k8s.io/v1` AdmissionReview wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attributes::{AttributesRecord, GroupVersionKind, GroupVersionResource};
use crate::errors::{AdmissionError, AdmissionResult};
use crate::interfaces::Operation;

pub const API_VERSION: &str = "admission.k8s.io/v1";
pub const KIND: &str = "AdmissionReview";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReview {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<AdmissionRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<AdmissionResponse>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    pub uid: String,
    pub kind: GroupVersionKind,
    pub resource: GroupVersionResource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_resource: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_object: Option<Value>,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    pub uid: String,
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub code: u16,
    pub reason: String,
    pub message: String,
}

impl From<&AdmissionError> for Status {
    fn from(err: &AdmissionError) -> Self {
        Status {
            code: err.code(),
            reason: err.reason().to_string(),
            message: err.to_string(),
        }
    }
}

impl AdmissionRequest {
    /// Attributes for the plugin chain. The object name falls back to the
    /// one inside the object, as for creates with generated names.
    pub fn to_attributes(&self) -> AdmissionResult<AttributesRecord> {
        let operation: Operation = self.operation.parse().map_err(AdmissionError::bad_request)?;
        let name = if self.name.is_empty() {
            self.object
                .as_ref()
                .and_then(|o| o.pointer("/metadata/name"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        } else {
            self.name.clone()
        };
        Ok(AttributesRecord {
            name,
            namespace: self.namespace.clone(),
            resource: self.resource.clone(),
            subresource: self.sub_resource.clone().unwrap_or_default(),
            operation,
            kind: self.kind.clone(),
            object: self.object.clone(),
            old_object: self.old_object.clone(),
        })
    }
}

impl AdmissionResponse {
    pub fn from_result(uid: &str, result: &AdmissionResult<()>) -> Self {
        match result {
            Ok(()) => AdmissionResponse {
                uid: uid.to_string(),
                allowed: true,
                status: None,
            },
            Err(err) => AdmissionResponse {
                uid: uid.to_string(),
                allowed: false,
                status: Some(Status::from(err)),
            },
        }
    }
}

impl AdmissionReview {
    pub fn response(response: AdmissionResponse) -> Self {
        AdmissionReview {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            request: None,
            response: Some(response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_request_into_attributes() {
        let review: AdmissionReview = serde_json::from_value(json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": {
                "uid": "705ab4f5",
                "kind": {"group": "garden.sapcloud.io", "version": "v1beta1", "kind": "Shoot"},
                "resource": {"group": "garden.sapcloud.io", "version": "v1beta1", "resource": "shoots"},
                "subResource": "status",
                "namespace": "garden-dev",
                "operation": "UPDATE",
                "object": {"metadata": {"name": "s1"}}
            }
        }))
        .unwrap();

        let attrs = review.request.unwrap().to_attributes().unwrap();
        assert_eq!(attrs.name, "s1");
        assert_eq!(attrs.subresource, "status");
        assert_eq!(attrs.operation, Operation::Update);
        assert!(attrs.kind.is("garden.sapcloud.io", "Shoot"));
    }

    #[test]
    fn unknown_operation_is_a_bad_request() {
        let request = AdmissionRequest {
            operation: "PATCH".to_string(),
            ..Default::default()
        };
        assert_eq!(request.to_attributes().unwrap_err().code(), 400);
    }

    #[test]
    fn response_carries_status_on_rejection() {
        let allowed = AdmissionResponse::from_result("u1", &Ok(()));
        assert!(allowed.allowed);
        assert!(allowed.status.is_none());

        let err = AdmissionError::not_ready("shoots", "s1");
        let denied = AdmissionResponse::from_result("u2", &Err(err));
        assert!(!denied.allowed);
        let status = denied.status.clone().unwrap();
        assert_eq!(status.code, 403);
        assert_eq!(status.reason, "NotReady");

        let wire = serde_json::to_value(AdmissionReview::response(denied)).unwrap();
        assert_eq!(wire["apiVersion"], "admission.k8s.io/v1");
        assert_eq!(wire["response"]["uid"], "u2");
        assert_eq!(
            wire["response"]["status"]["message"],
            "shoots \"s1\" is forbidden: not yet ready to handle request"
        );
        assert!(wire.get("request").is_none());
    }
}

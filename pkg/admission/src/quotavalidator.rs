//! ShootQuotaValidator admission plugin.
//!
//! Rejects shoot creates and updates that would push any quota bound to
//! the shoot's secret binding over one of its limits, or that extend the
//! shoot's expiration further than the quota's cluster lifetime allows.

use pkg_constants::admission::SHOOT_QUOTA_VALIDATOR;
use pkg_constants::garden::{GROUP, KIND_SHOOT};
use pkg_quota::{Decision, QuotaEvaluator};
use pkg_state::GardenListers;
use pkg_types::shoot::Shoot;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::attributes::Attributes;
use crate::errors::{AdmissionError, AdmissionResult};
use crate::handler::Handler;
use crate::interfaces::{Interface, Operation, ValidationInterface};
use crate::plugins::{PluginContext, Plugins};

pub const PLUGIN_NAME: &str = SHOOT_QUOTA_VALIDATOR;

pub fn register(plugins: &Plugins) {
    plugins.register(PLUGIN_NAME, |ctx: &PluginContext| {
        Ok(Arc::new(QuotaValidator::new(ctx)) as Arc<dyn ValidationInterface>)
    });
}

pub struct QuotaValidator {
    handler: Handler,
    listers: Option<Arc<dyn GardenListers>>,
}

impl QuotaValidator {
    pub fn new(ctx: &PluginContext) -> Self {
        let mut handler = Handler::new_create_update();
        handler.set_ready_timeout(ctx.ready_timeout);
        if let Some(listers) = &ctx.listers {
            let listers = listers.clone();
            handler.set_ready_func(Arc::new(move || listers.has_synced()));
        }
        Self {
            handler,
            listers: ctx.listers.clone(),
        }
    }
}

fn decode_shoot(value: &Value) -> AdmissionResult<Shoot> {
    Shoot::deserialize(value).map_err(|e| {
        AdmissionError::bad_request(format!("could not convert resource into Shoot object: {}", e))
    })
}

impl Interface for QuotaValidator {
    fn handles(&self, operation: Operation) -> bool {
        self.handler.handles(operation)
    }
}

impl ValidationInterface for QuotaValidator {
    fn validate(&self, attributes: &dyn Attributes) -> AdmissionResult<()> {
        let resource = &attributes.resource().resource;
        if !self.handler.wait_for_ready() {
            warn!("{} not ready, rejecting {}", PLUGIN_NAME, attributes.name());
            return Err(AdmissionError::not_ready(resource, attributes.name()));
        }

        if !attributes.kind().is(GROUP, KIND_SHOOT) || !attributes.subresource().is_empty() {
            return Ok(());
        }

        let listers = self
            .listers
            .as_deref()
            .ok_or_else(|| AdmissionError::internal_error("missing garden listers"))?;
        let shoot = attributes
            .object()
            .ok_or_else(|| AdmissionError::bad_request("request carries no Shoot object"))
            .and_then(decode_shoot)?;
        let old_shoot = attributes.old_object().map(decode_shoot).transpose()?;

        if shoot.is_deletion_confirmed() {
            debug!("Skipping quota check for shoot {} marked for deletion", attributes.name());
            return Ok(());
        }

        match QuotaEvaluator::new(listers).evaluate(&shoot, old_shoot.as_ref()) {
            Ok(Decision::Allow) => Ok(()),
            Ok(Decision::Deny(reasons)) => Err(AdmissionError::forbidden(
                resource,
                attributes.name(),
                reasons.to_string(),
            )),
            Err(e) => Err(AdmissionError::internal_error(e.to_string())),
        }
    }

    fn validate_initialization(&self) -> AdmissionResult<()> {
        if self.listers.is_none() {
            return Err(AdmissionError::internal_error(format!(
                "{} requires garden listers",
                PLUGIN_NAME
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{AttributesRecord, GroupVersionKind, GroupVersionResource};
    use chrono::{TimeZone, Utc};
    use pkg_constants::garden::{CONFIRMATION_DELETION_TIMESTAMP, SHOOT_EXPIRATION_TIMESTAMP};
    use pkg_state::GardenCache;
    use serde_json::json;
    use std::time::Duration;

    fn profile() -> Value {
        json!({
            "metadata": {"name": "aws"},
            "spec": {"aws": {"constraints": {
                "machineTypes": [{"name": "m4.large", "cpu": "2", "gpu": "0", "memory": "8Gi"}],
                "volumeTypes": [{"name": "gp2", "class": "standard"}]
            }}}
        })
    }

    fn shoot_json(name: &str) -> Value {
        json!({
            "metadata": {
                "name": name,
                "namespace": "garden-dev",
                "creationTimestamp": "2018-03-01T12:00:00Z"
            },
            "spec": {"cloud": {
                "profile": "aws",
                "region": "eu-west-1",
                "secretBindingRef": {"kind": "PrivateSecretBinding", "name": "secret"},
                "aws": {"workers": [{
                    "name": "pool",
                    "machineType": "m4.large",
                    "autoScalerMin": 1,
                    "autoScalerMax": 3,
                    "volumeType": "gp2",
                    "volumeSize": "20Gi"
                }]}
            }}
        })
    }

    fn cache(cpu_limit: &str) -> Arc<GardenCache> {
        let cache = GardenCache::new();
        cache.upsert::<pkg_types::cloudprofile::CloudProfile>(
            serde_json::from_value(profile()).unwrap(),
        );
        cache.upsert::<pkg_types::secretbinding::PrivateSecretBinding>(
            serde_json::from_value(json!({
                "metadata": {"name": "secret", "namespace": "garden-dev"},
                "secretRef": {"name": "aws-credentials"},
                "quotas": [{"name": "trial", "namespace": "garden"}]
            }))
            .unwrap(),
        );
        cache.upsert::<pkg_types::quota::Quota>(
            serde_json::from_value(json!({
                "metadata": {"name": "trial", "namespace": "garden"},
                "spec": {"clusterLifetimeDays": 7, "metrics": {"cpu": cpu_limit}}
            }))
            .unwrap(),
        );
        cache.mark_synced();
        Arc::new(cache)
    }

    fn validator(cache: Arc<GardenCache>) -> QuotaValidator {
        let ctx = PluginContext::new(cache).with_ready_timeout(Duration::from_millis(20));
        QuotaValidator::new(&ctx)
    }

    fn request(operation: Operation, object: Value, old: Option<Value>) -> AttributesRecord {
        AttributesRecord {
            name: object["metadata"]["name"].as_str().unwrap_or_default().to_string(),
            namespace: "garden-dev".to_string(),
            resource: GroupVersionResource::new(GROUP, "v1beta1", "shoots"),
            subresource: String::new(),
            operation,
            kind: GroupVersionKind::new(GROUP, "v1beta1", KIND_SHOOT),
            object: Some(object),
            old_object: old,
        }
    }

    #[test]
    fn registered_for_create_and_update() {
        let plugins = crate::all_plugins();
        assert!(plugins.is_registered("ShootQuotaValidator"));
        let plugin = plugins
            .new_from_plugins(PLUGIN_NAME, &PluginContext::new(cache("10")))
            .ok()
            .unwrap();
        assert!(plugin.handles(Operation::Create));
        assert!(plugin.handles(Operation::Update));
        assert!(!plugin.handles(Operation::Delete));
    }

    #[test]
    fn initialization_requires_listers() {
        let ctx = PluginContext {
            listers: None,
            ready_timeout: Duration::from_millis(1),
        };
        let err = crate::all_plugins()
            .new_from_plugins(PLUGIN_NAME, &ctx)
            .err()
            .unwrap();
        assert!(err.to_string().contains("requires garden listers"));
    }

    #[test]
    fn admits_shoot_within_quota() {
        let plugin = validator(cache("10"));
        plugin
            .validate(&request(Operation::Create, shoot_json("s1"), None))
            .unwrap();
    }

    #[test]
    fn rejects_shoot_over_quota() {
        let plugin = validator(cache("4"));
        let err = plugin
            .validate(&request(Operation::Create, shoot_json("s1"), None))
            .unwrap_err();
        assert!(matches!(err, AdmissionError::Forbidden(_)));
        let msg = err.to_string();
        assert!(msg.starts_with("shoots \"s1\" is forbidden: Quota limits exceeded"), "{msg}");
        assert!(msg.contains("cpu (quota garden/trial, limit 4, required 6)"), "{msg}");
    }

    #[test]
    fn rejects_expiration_beyond_lifetime() {
        let plugin = validator(cache("10"));
        let old = shoot_json("s1");
        let mut new = old.clone();
        let expires = Utc.with_ymd_and_hms(2018, 3, 20, 12, 0, 0).unwrap();
        new["metadata"]["annotations"] = json!({SHOOT_EXPIRATION_TIMESTAMP: expires.to_rfc3339()});

        let err = plugin
            .validate(&request(Operation::Update, new, Some(old)))
            .unwrap_err();
        assert!(err.to_string().contains("Can only be extended by 7 day(s)"));
    }

    #[test]
    fn ignores_other_kinds_and_subresources() {
        let plugin = validator(cache("0"));
        let mut other = request(Operation::Create, json!({"metadata": {"name": "p"}}), None);
        other.kind = GroupVersionKind::new("", "v1", "Pod");
        plugin.validate(&other).unwrap();

        let mut status = request(Operation::Update, shoot_json("s1"), None);
        status.subresource = "status".to_string();
        plugin.validate(&status).unwrap();
    }

    #[test]
    fn skips_confirmed_deletions() {
        let plugin = validator(cache("0"));
        let mut shoot = shoot_json("s1");
        shoot["metadata"]["deletionTimestamp"] = json!("2018-03-02T12:00:00Z");
        shoot["metadata"]["annotations"] =
            json!({CONFIRMATION_DELETION_TIMESTAMP: "2018-03-02T12:00:00Z"});
        plugin
            .validate(&request(Operation::Update, shoot.clone(), Some(shoot_json("s1"))))
            .unwrap();

        // Unconfirmed deletions are still checked.
        shoot["metadata"]["annotations"] = json!({});
        assert!(
            plugin
                .validate(&request(Operation::Update, shoot, None))
                .is_err()
        );
    }

    #[test]
    fn undecodable_object_is_a_bad_request() {
        let plugin = validator(cache("10"));
        let err = plugin
            .validate(&request(Operation::Create, json!({"metadata": {"name": "s1"}}), None))
            .unwrap_err();
        assert_eq!(err.code(), 400);
    }

    #[test]
    fn lookup_failures_are_internal_errors() {
        let plugin = validator(cache("10"));
        let mut shoot = shoot_json("s1");
        shoot["spec"]["cloud"]["secretBindingRef"]["kind"] = json!("SecretBinding");
        let err = plugin
            .validate(&request(Operation::Create, shoot, None))
            .unwrap_err();
        assert!(matches!(err, AdmissionError::Internal(_)));
        assert!(err.to_string().contains("Unknown binding type"));
    }

    #[test]
    fn unsynced_cache_is_not_ready() {
        let plugin = validator(Arc::new(GardenCache::new()));
        let err = plugin
            .validate(&request(Operation::Create, shoot_json("s1"), None))
            .unwrap_err();
        assert!(err.is_transient());
        assert_eq!(err.reason(), "NotReady");
    }
}

use pkg_constants::garden::KIND_QUOTA;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::meta::{GardenObject, ObjectMeta};
use crate::quantity::Quantity;
use crate::resources::QuotaMetric;

/// Resource caps shared by every shoot bound to this quota.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quota {
    pub metadata: ObjectMeta,
    pub spec: QuotaSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaSpec {
    /// Longest a bound shoot may live before it must be extended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_lifetime_days: Option<u32>,
    /// Limits per metric. Metrics not listed are unconstrained.
    #[serde(default)]
    pub metrics: BTreeMap<QuotaMetric, Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<QuotaScope>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaScope {
    Project,
    Secret,
}

impl Quota {
    pub fn limit(&self, metric: QuotaMetric) -> Option<Quantity> {
        self.spec.metrics.get(&metric).copied()
    }
}

impl GardenObject for Quota {
    const KIND: &'static str = KIND_QUOTA;
    const RESOURCE: &'static str = "quotas";
    const NAMESPACED: bool = true;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_metrics_and_lifetime() {
        let json = r#"{
            "metadata": {"name": "trial", "namespace": "garden"},
            "spec": {
                "clusterLifetimeDays": 14,
                "scope": "secret",
                "metrics": {"cpu": "200", "memory": "4000Gi", "loadbalancer": 10}
            }
        }"#;
        let quota: Quota = serde_json::from_str(json).unwrap();
        assert_eq!(quota.spec.cluster_lifetime_days, Some(14));
        assert_eq!(quota.spec.scope, Some(QuotaScope::Secret));
        assert_eq!(quota.limit(QuotaMetric::Cpu), Some("200".parse().unwrap()));
        assert_eq!(quota.limit(QuotaMetric::Loadbalancer), Some(Quantity::from_units(10)));
        assert_eq!(quota.limit(QuotaMetric::Gpu), None);
    }

    #[test]
    fn rejects_unknown_metric() {
        let json = r#"{
            "metadata": {"name": "trial", "namespace": "garden"},
            "spec": {"metrics": {"disk": "1"}}
        }"#;
        assert!(serde_json::from_str::<Quota>(json).is_err());
    }
}

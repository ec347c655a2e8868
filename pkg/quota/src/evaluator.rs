use chrono::{DateTime, Duration, Utc};
use pkg_state::GardenListers;
use pkg_types::shoot::Shoot;
use pkg_types::{GardenObject, ObjectReference, Quantity, QuotaMetric};
use std::fmt;
use tracing::{debug, info};

use crate::allocation::required_resources;
use crate::error::QuotaError;
use crate::references::quota_refs_for_shoot;

/// Outcome of a successful evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Allow,
    Deny(DenyReasons),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Everything that made a request fail. At least one field is non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DenyReasons {
    pub exceeded: Vec<ExceededMetric>,
    pub lifetime: Option<LifetimeViolation>,
}

impl DenyReasons {
    fn is_empty(&self) -> bool {
        self.exceeded.is_empty() && self.lifetime.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceededMetric {
    pub quota: ObjectReference,
    pub metric: QuotaMetric,
    pub limit: Quantity,
    pub required: Quantity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LifetimeViolation {
    pub requested: DateTime<Utc>,
    pub max_allowed: DateTime<Utc>,
    pub lifetime_days: u32,
}

impl fmt::Display for DenyReasons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.exceeded.is_empty() {
            let metrics: Vec<String> = self
                .exceeded
                .iter()
                .map(|e| {
                    format!(
                        "{} (quota {}, limit {}, required {})",
                        e.metric, e.quota, e.limit, e.required
                    )
                })
                .collect();
            parts.push(format!(
                "Quota limits exceeded. Unable to allocate further {}",
                metrics.join(", ")
            ));
        }
        if let Some(lifetime) = &self.lifetime {
            parts.push(format!(
                "Requested shoot expiration time too long. Can only be extended by {} day(s)",
                lifetime.lifetime_days
            ));
        }
        f.write_str(&parts.join("; "))
    }
}

/// Checks a shoot against every quota its secret binding names.
pub struct QuotaEvaluator<'a> {
    listers: &'a dyn GardenListers,
}

impl<'a> QuotaEvaluator<'a> {
    pub fn new(listers: &'a dyn GardenListers) -> Self {
        Self { listers }
    }

    pub fn evaluate(&self, shoot: &Shoot, old: Option<&Shoot>) -> Result<Decision, QuotaError> {
        self.evaluate_at(shoot, old, Utc::now())
    }

    /// Like `evaluate`, with `now` standing in for the creation time of a
    /// shoot that has not been persisted yet.
    pub fn evaluate_at(
        &self,
        shoot: &Shoot,
        old: Option<&Shoot>,
        now: DateTime<Utc>,
    ) -> Result<Decision, QuotaError> {
        let refs = quota_refs_for_shoot(self.listers, shoot)?;
        if refs.is_empty() {
            debug!(shoot = %shoot.object_key(), "No quotas bound, allowing");
            return Ok(Decision::Allow);
        }

        let mut reasons = DenyReasons::default();
        let mut lifetime_days: Option<u32> = None;
        for quota_ref in &refs {
            let quota = self.listers.quota(&quota_ref.namespace, &quota_ref.name)?;
            if let Some(days) = quota.spec.cluster_lifetime_days {
                lifetime_days = Some(lifetime_days.map_or(days, |d| d.min(days)));
            }

            let required = required_resources(self.listers, &quota, shoot)?;
            for metric in QuotaMetric::ALL {
                let Some(limit) = quota.limit(metric) else {
                    continue;
                };
                let needed = required.get(metric);
                if needed > limit {
                    reasons.exceeded.push(ExceededMetric {
                        quota: ObjectReference::new(&quota.metadata.namespace, &quota.metadata.name),
                        metric,
                        limit,
                        required: needed,
                    });
                }
            }
        }

        if let (Some(requested), Some(days)) = (shoot.expiration_timestamp(), lifetime_days) {
            reasons.lifetime = check_lifetime(shoot, old, requested, days, now)?;
        }

        if reasons.is_empty() {
            Ok(Decision::Allow)
        } else {
            info!(shoot = %shoot.object_key(), reason = %reasons, "Quota check denied shoot");
            Ok(Decision::Deny(reasons))
        }
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, QuotaError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| QuotaError::InvalidTimestamp {
            value: value.to_string(),
            source,
        })
}

/// An expiration may move at most `days` past the previous expiration, or
/// past creation when there was none. A bound past the representable
/// range never binds.
fn check_lifetime(
    shoot: &Shoot,
    old: Option<&Shoot>,
    requested: &str,
    days: u32,
    now: DateTime<Utc>,
) -> Result<Option<LifetimeViolation>, QuotaError> {
    let requested = parse_timestamp(requested)?;
    let baseline = match old.and_then(Shoot::expiration_timestamp) {
        Some(previous) => parse_timestamp(previous)?,
        None => shoot.metadata.creation_timestamp.unwrap_or(now),
    };
    let Some(max_allowed) = Duration::try_days(i64::from(days))
        .and_then(|lifetime| baseline.checked_add_signed(lifetime))
    else {
        return Ok(None);
    };
    if requested > max_allowed {
        return Ok(Some(LifetimeViolation {
            requested,
            max_allowed,
            lifetime_days: days,
        }));
    }
    Ok(None)
}

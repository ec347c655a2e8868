use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::quantity::Quantity;

/// The closed set of metrics a quota can limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QuotaMetric {
    #[serde(rename = "cpu")]
    Cpu,
    #[serde(rename = "gpu")]
    Gpu,
    #[serde(rename = "memory")]
    Memory,
    #[serde(rename = "storage.standard")]
    StorageStandard,
    #[serde(rename = "storage.premium")]
    StoragePremium,
    #[serde(rename = "loadbalancer")]
    Loadbalancer,
}

impl QuotaMetric {
    pub const ALL: [QuotaMetric; 6] = [
        QuotaMetric::Cpu,
        QuotaMetric::Gpu,
        QuotaMetric::Memory,
        QuotaMetric::StorageStandard,
        QuotaMetric::StoragePremium,
        QuotaMetric::Loadbalancer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaMetric::Cpu => "cpu",
            QuotaMetric::Gpu => "gpu",
            QuotaMetric::Memory => "memory",
            QuotaMetric::StorageStandard => "storage.standard",
            QuotaMetric::StoragePremium => "storage.premium",
            QuotaMetric::Loadbalancer => "loadbalancer",
        }
    }
}

impl fmt::Display for QuotaMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-metric resource amounts. A metric that was never set reads as zero.
#[derive(Debug, Clone, Default)]
pub struct ResourceVector {
    values: BTreeMap<QuotaMetric, Quantity>,
}

impl ResourceVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, metric: QuotaMetric) -> Quantity {
        self.values.get(&metric).copied().unwrap_or(Quantity::ZERO)
    }

    pub fn set(&mut self, metric: QuotaMetric, value: Quantity) {
        self.values.insert(metric, value);
    }

    /// Add `value` onto whatever is already recorded for `metric`.
    pub fn add_metric(&mut self, metric: QuotaMetric, value: Quantity) {
        let entry = self.values.entry(metric).or_insert(Quantity::ZERO);
        *entry += value;
    }

    /// All six metrics in their fixed order, zero-filled.
    pub fn iter(&self) -> impl Iterator<Item = (QuotaMetric, Quantity)> + '_ {
        QuotaMetric::ALL.into_iter().map(|m| (m, self.get(m)))
    }

    pub fn is_zero(&self) -> bool {
        self.iter().all(|(_, q)| q.is_zero())
    }
}

impl PartialEq for ResourceVector {
    fn eq(&self, other: &Self) -> bool {
        QuotaMetric::ALL
            .into_iter()
            .all(|m| self.get(m) == other.get(m))
    }
}

impl Eq for ResourceVector {}

impl AddAssign<&ResourceVector> for ResourceVector {
    fn add_assign(&mut self, rhs: &ResourceVector) {
        for (metric, value) in &rhs.values {
            self.add_metric(*metric, *value);
        }
    }
}

impl AddAssign for ResourceVector {
    fn add_assign(&mut self, rhs: ResourceVector) {
        *self += &rhs;
    }
}

impl Add for ResourceVector {
    type Output = ResourceVector;

    fn add(mut self, rhs: ResourceVector) -> ResourceVector {
        self += &rhs;
        self
    }
}

impl Sum for ResourceVector {
    fn sum<I: Iterator<Item = ResourceVector>>(iter: I) -> ResourceVector {
        iter.fold(ResourceVector::new(), |acc, v| acc + v)
    }
}

impl FromIterator<(QuotaMetric, Quantity)> for ResourceVector {
    fn from_iter<I: IntoIterator<Item = (QuotaMetric, Quantity)>>(iter: I) -> Self {
        let mut out = ResourceVector::new();
        for (metric, value) in iter {
            out.add_metric(metric, value);
        }
        out
    }
}

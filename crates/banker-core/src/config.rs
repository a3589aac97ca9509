//! System configuration
//!
//! `SystemConfig` is the raw, caller-supplied description of a resource
//! system. Counts and amounts are signed so that whatever a caller parsed
//! reaches validation intact; `validate` turns it into a `ResourceModel`
//! whose values are known to be in range.

use alloc::string::ToString;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Units;

/// Raw configuration of a resource system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Number of processes
    pub process_count: i64,
    /// Number of resource types
    pub resource_count: i64,
    /// Total units of each resource, `resource_count` entries
    pub total_units: Vec<i64>,
    /// Maximum claim of each process on each resource,
    /// `process_count` rows of `resource_count` entries
    pub max_claim: Vec<Vec<i64>>,
}

impl SystemConfig {
    /// Build a configuration from its four parts.
    pub fn new(
        process_count: i64,
        resource_count: i64,
        total_units: Vec<i64>,
        max_claim: Vec<Vec<i64>>,
    ) -> Self {
        Self {
            process_count,
            resource_count,
            total_units,
            max_claim,
        }
    }

    /// Decode a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Encode this configuration as JSON.
    pub fn to_json(&self) -> Result<alloc::string::String, ConfigError> {
        serde_json::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check counts, signs and shapes.
    ///
    /// Checks run in a fixed order: counts, `total_units`, then `max_claim`
    /// row by row. The first failure is returned.
    pub fn validate(&self) -> Result<ResourceModel, ConfigError> {
        let process_count = positive_count("process_count", self.process_count)?;
        let resource_count = positive_count("resource_count", self.resource_count)?;

        if self.total_units.len() != resource_count {
            return Err(ConfigError::ShapeMismatch {
                field: "total_units",
                expected: resource_count,
                actual: self.total_units.len(),
            });
        }
        let total_units = self
            .total_units
            .iter()
            .enumerate()
            .map(|(resource, &value)| {
                Units::try_from(value).map_err(|_| ConfigError::NegativeTotal { resource, value })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if self.max_claim.len() != process_count {
            return Err(ConfigError::ShapeMismatch {
                field: "max_claim",
                expected: process_count,
                actual: self.max_claim.len(),
            });
        }
        let mut max_claim = Vec::with_capacity(process_count);
        for (process, row) in self.max_claim.iter().enumerate() {
            if row.len() != resource_count {
                return Err(ConfigError::ShapeMismatch {
                    field: "max_claim row",
                    expected: resource_count,
                    actual: row.len(),
                });
            }
            let row = row
                .iter()
                .enumerate()
                .map(|(resource, &value)| {
                    Units::try_from(value).map_err(|_| ConfigError::NegativeClaim {
                        process,
                        resource,
                        value,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            max_claim.push(row);
        }

        Ok(ResourceModel {
            process_count,
            resource_count,
            total_units,
            max_claim,
        })
    }
}

fn positive_count(field: &'static str, value: i64) -> Result<usize, ConfigError> {
    match usize::try_from(value) {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(ConfigError::NonPositiveCount { field, value }),
    }
}

/// A validated resource model.
///
/// Only `SystemConfig::validate` builds one, so every instance has positive
/// counts and matching shapes. Owned by value: each allocator built from a
/// model holds its own copy of `total_units` and `max_claim`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResourceModel {
    pub(crate) process_count: usize,
    pub(crate) resource_count: usize,
    pub(crate) total_units: Vec<Units>,
    pub(crate) max_claim: Vec<Vec<Units>>,
}

impl ResourceModel {
    /// Number of processes
    pub fn process_count(&self) -> usize {
        self.process_count
    }

    /// Number of resource types
    pub fn resource_count(&self) -> usize {
        self.resource_count
    }

    /// Total units per resource
    pub fn total_units(&self) -> &[Units] {
        &self.total_units
    }

    /// Maximum claim matrix
    pub fn max_claim(&self) -> &[Vec<Units>] {
        &self.max_claim
    }

    /// Convert back into the raw configuration form.
    ///
    /// Values above `i64::MAX` saturate; `validate` on the result yields an
    /// equal model for every model built from a `SystemConfig`.
    pub fn to_config(&self) -> SystemConfig {
        let signed = |v: Units| i64::try_from(v).unwrap_or(i64::MAX);
        SystemConfig {
            process_count: self.process_count as i64,
            resource_count: self.resource_count as i64,
            total_units: self.total_units.iter().copied().map(signed).collect(),
            max_claim: self
                .max_claim
                .iter()
                .map(|row| row.iter().copied().map(signed).collect())
                .collect(),
        }
    }
}

impl TryFrom<SystemConfig> for ResourceModel {
    type Error = ConfigError;

    fn try_from(config: SystemConfig) -> Result<Self, Self::Error> {
        config.validate()
    }
}

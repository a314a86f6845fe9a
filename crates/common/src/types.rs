//! Common types used across OpenETS
//!
//! This module provides the fundamental domain types used throughout
//! the simulation: production entities, their fuel groups, and the raw
//! records they are built from.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Identifier of a production entity (a plant)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fuel group label (e.g. "lignite", "natural_gas")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FuelGroup(pub String);

impl FuelGroup {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FuelGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One production unit, validated.
///
/// `output > 0`, `emissions >= 0` and `capacity > 0` (when present) hold for
/// every value of this type built through [`EntityRecord::into_entity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub fuel_group: FuelGroup,
    /// Physical output for the period (e.g. MWh)
    pub output: f64,
    /// Emissions for the period (e.g. tCO2)
    pub emissions: f64,
    /// Installed capacity (e.g. MW)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
}

impl Entity {
    pub fn new(
        id: impl Into<String>,
        fuel_group: impl Into<String>,
        output: f64,
        emissions: f64,
    ) -> Self {
        Self {
            id: EntityId::new(id),
            fuel_group: FuelGroup::new(fuel_group),
            output,
            emissions,
            capacity: None,
        }
    }

    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

/// Raw input row as delivered by the ingestion side.
///
/// Every field is optional here so that a missing column is reported by name
/// instead of surfacing as a generic deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub fuel_group: Option<String>,
    #[serde(default)]
    pub output: Option<f64>,
    #[serde(default)]
    pub emissions: Option<f64>,
    #[serde(default)]
    pub capacity: Option<f64>,
}

impl EntityRecord {
    /// Label used in error messages: the identifier, or the row position.
    pub fn label(&self, row: usize) -> String {
        match self.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("row#{}", row),
        }
    }

    /// Validate the record and build an [`Entity`].
    ///
    /// `row` is the record's position in the input and only names the record
    /// in errors when it has no identifier.
    pub fn into_entity(self, row: usize) -> Result<Entity> {
        let label = self.label(row);

        let id = match self.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(Error::missing_field(label, "id")),
        };

        let fuel_group = match self.fuel_group.as_deref().map(str::trim) {
            Some(group) if !group.is_empty() => group.to_string(),
            _ => return Err(Error::missing_field(label, "fuel_group")),
        };

        let output = self
            .output
            .ok_or_else(|| Error::missing_field(&label, "output"))?;
        if !output.is_finite() || output <= 0.0 {
            return Err(Error::invalid_value(
                &label,
                "output",
                format!("must be positive, got {}", output),
            ));
        }

        let emissions = self
            .emissions
            .ok_or_else(|| Error::missing_field(&label, "emissions"))?;
        if !emissions.is_finite() || emissions < 0.0 {
            return Err(Error::invalid_value(
                &label,
                "emissions",
                format!("must be non-negative, got {}", emissions),
            ));
        }

        if let Some(capacity) = self.capacity {
            if !capacity.is_finite() || capacity <= 0.0 {
                return Err(Error::invalid_value(
                    &label,
                    "capacity",
                    format!("must be positive, got {}", capacity),
                ));
            }
        }

        Ok(Entity {
            id: EntityId(id),
            fuel_group: FuelGroup(fuel_group),
            output,
            emissions,
            capacity: self.capacity,
        })
    }
}

impl From<&Entity> for EntityRecord {
    fn from(entity: &Entity) -> Self {
        Self {
            id: Some(entity.id.0.clone()),
            fuel_group: Some(entity.fuel_group.0.clone()),
            output: Some(entity.output),
            emissions: Some(entity.emissions),
            capacity: entity.capacity,
        }
    }
}

/// Why an entity left the run before benchmarking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Record failed validation and `drop_invalid` is set
    InvalidRecord { message: String },
    /// Among the lowest-intensity entities of a group scoped `exclude_lowest`
    ScopeLowest,
    /// Among the highest-intensity entities of a group scoped `exclude_highest`
    ScopeHighest,
    /// Intensity outside the band around the group benchmark
    Outlier {
        benchmark: f64,
        lower_bound: f64,
        upper_bound: f64,
    },
}

impl ExclusionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRecord { .. } => "invalid_record",
            Self::ScopeLowest => "scope_lowest",
            Self::ScopeHighest => "scope_highest",
            Self::Outlier { .. } => "outlier",
        }
    }
}

/// An input entity (or record) that did not take part in the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exclusion {
    /// Identifier, or `row#N` for records without one
    pub entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_group: Option<FuelGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    #[serde(flatten)]
    pub reason: ExclusionReason,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn record(id: &str, output: Option<f64>, emissions: Option<f64>) -> EntityRecord {
        EntityRecord {
            id: Some(id.to_string()),
            fuel_group: Some("lignite".to_string()),
            output,
            emissions,
            capacity: None,
        }
    }

    #[test]
    fn test_valid_record() {
        let entity = record("  A ", Some(100.0), Some(50.0)).into_entity(0).unwrap();
        assert_eq!(entity.id.as_str(), "A");
        assert_eq!(entity.fuel_group.as_str(), "lignite");
        assert_eq!(entity.output, 100.0);
        assert_eq!(entity.capacity, None);
    }

    #[test]
    fn test_missing_output_names_field() {
        let err = record("A", None, Some(1.0)).into_entity(0).unwrap_err();
        assert_matches!(err, Error::MissingField { ref entity, field: "output" } if entity == "A");
    }

    #[test]
    fn test_missing_id_uses_row_label() {
        let mut r = record("", Some(1.0), Some(1.0));
        r.id = None;
        let err = r.into_entity(7).unwrap_err();
        assert_matches!(err, Error::MissingField { ref entity, field: "id" } if entity == "row#7");
    }

    #[test]
    fn test_non_positive_output_rejected() {
        let err = record("A", Some(0.0), Some(1.0)).into_entity(0).unwrap_err();
        assert_matches!(err, Error::InvalidValue { field: "output", .. });
    }

    #[test]
    fn test_negative_emissions_rejected() {
        let err = record("A", Some(1.0), Some(-1.0)).into_entity(0).unwrap_err();
        assert_matches!(err, Error::InvalidValue { field: "emissions", .. });
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut r = record("A", Some(1.0), Some(1.0));
        r.capacity = Some(0.0);
        assert_matches!(
            r.into_entity(0),
            Err(Error::InvalidValue { field: "capacity", .. })
        );
    }

    #[test]
    fn test_record_from_json_with_missing_column() {
        let json = r#"[{"id": "A", "fuel_group": "gas", "output": 10.0}]"#;
        let records: Vec<EntityRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].emissions, None);
        let err = records[0].clone().into_entity(0).unwrap_err();
        assert_eq!(err.field(), Some("emissions"));
    }
}

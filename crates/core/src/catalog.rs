//! Reference catalog: door styles, manufacturers, finishes and glass types.
//!
//! Catalog rows are read by the pricing engine and the order flow and are
//! written only by admins. Inputs are validated here, before they reach a
//! store, so every backend enforces the same rules.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::AccessDenied;
use crate::store::StoreError;
use crate::types::{DoorStyleId, FinishId, GlassTypeId, ManufacturerId};

/// Errors raised by catalog validation and catalog writes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A required field is missing or a value is out of range.
    #[error("{0}")]
    Validation(String),

    /// The referenced catalog entry does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// A uniqueness rule was violated, or the entry is still referenced.
    #[error("{0}")]
    Conflict(String),

    /// Catalog writes are admin-only.
    #[error("admin access required")]
    Forbidden,

    #[error(transparent)]
    Store(StoreError),
}

impl From<AccessDenied> for CatalogError {
    fn from(_: AccessDenied) -> Self {
        Self::Forbidden
    }
}

// =============================================================================
// Entities
// =============================================================================

/// A door profile, e.g. "Shaker".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorStyle {
    pub id: DoorStyleId,
    pub name: String,
    /// Unavailable styles stay in the catalog but are hidden from ordering.
    pub available: bool,
}

/// A supplier that groups finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manufacturer {
    pub id: ManufacturerId,
    pub name: String,
}

/// A color or stain offered by one manufacturer.
///
/// `(name, manufacturer)` is unique; the same name may exist under several
/// manufacturers at different prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finish {
    pub id: FinishId,
    pub name: String,
    pub manufacturer_id: ManufacturerId,
    /// Manufacturer name, denormalized for lookups by reference.
    pub manufacturer: String,
    /// Price per square foot, never negative.
    pub sqft_price: Decimal,
}

impl Finish {
    /// Whether this finish is the one `finish` refers to.
    #[must_use]
    pub fn matches(&self, finish: &FinishRef) -> bool {
        self.name == finish.name && self.manufacturer == finish.manufacturer
    }
}

/// An optional glass insert, billed per square foot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlassType {
    pub id: GlassTypeId,
    pub name: String,
    pub sqft_price: Decimal,
    /// Smallest billable glass area per door, in square feet.
    pub sqft_minimum: Decimal,
}

/// Reference to a finish by name *and* manufacturer.
///
/// There is deliberately no way to look a finish up by name alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishRef {
    pub name: String,
    pub manufacturer: String,
}

impl FinishRef {
    #[must_use]
    pub fn new(name: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
        }
    }
}

impl std::fmt::Display for FinishRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.manufacturer)
    }
}

/// Point-in-time copy of the catalog used for one pricing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    pub door_styles: Vec<DoorStyle>,
    pub manufacturers: Vec<Manufacturer>,
    pub finishes: Vec<Finish>,
    pub glass_types: Vec<GlassType>,
}

impl CatalogSnapshot {
    /// Door styles that may be chosen for new items.
    pub fn available_door_styles(&self) -> impl Iterator<Item = &DoorStyle> {
        self.door_styles.iter().filter(|s| s.available)
    }

    /// Whether `name` is an orderable door style.
    #[must_use]
    pub fn is_door_style_available(&self, name: &str) -> bool {
        self.available_door_styles().any(|s| s.name == name)
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// Create or replace a door style.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorStyleInput {
    pub name: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

const fn default_available() -> bool {
    true
}

/// Create or rename a manufacturer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturerInput {
    pub name: String,
}

/// Create or replace a finish.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishInput {
    pub name: String,
    pub manufacturer_id: Option<ManufacturerId>,
    pub sqft_price: Decimal,
}

/// Create or replace a glass type.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlassTypeInput {
    pub name: String,
    pub sqft_price: Decimal,
    pub sqft_minimum: Decimal,
}

/// Validated door style input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDoorStyle {
    pub name: String,
    pub available: bool,
}

/// Validated manufacturer input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewManufacturer {
    pub name: String,
}

/// Validated finish input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFinish {
    pub name: String,
    pub manufacturer_id: ManufacturerId,
    pub sqft_price: Decimal,
}

/// Validated glass type input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGlassType {
    pub name: String,
    pub sqft_price: Decimal,
    pub sqft_minimum: Decimal,
}

fn required_name(name: &str, entity: &str) -> Result<String, CatalogError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CatalogError::Validation(format!("{entity} name is required")));
    }
    Ok(name.to_owned())
}

fn non_negative_price(price: Decimal, entity: &str) -> Result<Decimal, CatalogError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(CatalogError::Validation(format!(
            "{entity} price per square foot cannot be negative"
        )));
    }
    Ok(price)
}

impl DoorStyleInput {
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if the name is blank.
    pub fn validate(&self) -> Result<NewDoorStyle, CatalogError> {
        Ok(NewDoorStyle {
            name: required_name(&self.name, "door style")?,
            available: self.available,
        })
    }
}

impl ManufacturerInput {
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if the name is blank.
    pub fn validate(&self) -> Result<NewManufacturer, CatalogError> {
        Ok(NewManufacturer {
            name: required_name(&self.name, "manufacturer")?,
        })
    }
}

impl FinishInput {
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if the name is blank, the
    /// manufacturer is missing, or the price is negative.
    pub fn validate(&self) -> Result<NewFinish, CatalogError> {
        let name = required_name(&self.name, "finish")?;
        let manufacturer_id = self
            .manufacturer_id
            .ok_or_else(|| CatalogError::Validation("finish manufacturer is required".into()))?;
        Ok(NewFinish {
            name,
            manufacturer_id,
            sqft_price: non_negative_price(self.sqft_price, "finish")?,
        })
    }
}

impl GlassTypeInput {
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if the name is blank, the price is
    /// negative, or the minimum area is not positive.
    pub fn validate(&self) -> Result<NewGlassType, CatalogError> {
        let name = required_name(&self.name, "glass type")?;
        let sqft_price = non_negative_price(self.sqft_price, "glass type")?;
        if self.sqft_minimum <= Decimal::ZERO {
            return Err(CatalogError::Validation(
                "glass type minimum square footage must be greater than zero".into(),
            ));
        }
        Ok(NewGlassType {
            name,
            sqft_price,
            sqft_minimum: self.sqft_minimum,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_requires_name_and_manufacturer() {
        let missing_name = FinishInput {
            name: "  ".into(),
            manufacturer_id: Some(ManufacturerId::new(1)),
            sqft_price: Decimal::TEN,
        };
        assert!(matches!(
            missing_name.validate(),
            Err(CatalogError::Validation(msg)) if msg.contains("name")
        ));

        let missing_manufacturer = FinishInput {
            name: "White".into(),
            manufacturer_id: None,
            sqft_price: Decimal::TEN,
        };
        assert!(matches!(
            missing_manufacturer.validate(),
            Err(CatalogError::Validation(msg)) if msg.contains("manufacturer")
        ));
    }

    #[test]
    fn test_finish_trims_name_and_allows_zero_price() {
        let input = FinishInput {
            name: " Espresso ".into(),
            manufacturer_id: Some(ManufacturerId::new(2)),
            sqft_price: Decimal::ZERO,
        };
        let finish = input.validate().unwrap();
        assert_eq!(finish.name, "Espresso");
        assert_eq!(finish.sqft_price, Decimal::ZERO);
    }

    #[test]
    fn test_negative_price_rejected() {
        let input = FinishInput {
            name: "White".into(),
            manufacturer_id: Some(ManufacturerId::new(1)),
            sqft_price: Decimal::new(-1, 2),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_glass_minimum_must_be_positive() {
        let input = GlassTypeInput {
            name: "Seeded".into(),
            sqft_price: Decimal::new(1500, 2),
            sqft_minimum: Decimal::ZERO,
        };
        assert!(input.validate().is_err());

        let input = GlassTypeInput {
            sqft_minimum: Decimal::ONE,
            ..input
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_door_style_available_defaults_true() {
        let input: DoorStyleInput = serde_json::from_str(r#"{"name":"Shaker"}"#).unwrap();
        assert!(input.available);
    }

    #[test]
    fn test_snapshot_filters_unavailable_styles() {
        let snapshot = CatalogSnapshot {
            door_styles: vec![
                DoorStyle {
                    id: DoorStyleId::new(1),
                    name: "Shaker".into(),
                    available: true,
                },
                DoorStyle {
                    id: DoorStyleId::new(2),
                    name: "Cathedral".into(),
                    available: false,
                },
            ],
            ..CatalogSnapshot::default()
        };
        assert!(snapshot.is_door_style_available("Shaker"));
        assert!(!snapshot.is_door_style_available("Cathedral"));
        assert!(!snapshot.is_door_style_available("Slab"));
    }
}

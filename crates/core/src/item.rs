//! Configured door line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::FinishRef;
use crate::types::LineItemId;

/// Unit the customer measured width and height in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "portal.measurement_unit", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementUnit {
    #[default]
    Inches,
    Millimeters,
}

impl MeasurementUnit {
    const MILLIMETERS_PER_INCH: Decimal = Decimal::from_parts(254, 0, 0, false, 1);

    /// Convert a length in this unit to inches.
    #[must_use]
    pub fn to_inches(self, length: Decimal) -> Decimal {
        match self {
            Self::Inches => length,
            Self::Millimeters => length / Self::MILLIMETERS_PER_INCH,
        }
    }
}

/// One configured door line: dimensions, style, finish and options.
///
/// Line items never carry a price. Prices are computed from the live
/// catalog whenever they are displayed and frozen only on a submitted
/// order (see [`crate::order::OrderLine`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: LineItemId,
    pub qty: i32,
    pub width: Decimal,
    pub height: Decimal,
    pub door_style: String,
    pub finish: FinishRef,
    #[serde(default)]
    pub glass: bool,
    #[serde(default)]
    pub glass_type: Option<String>,
    #[serde(default)]
    pub center_rail: bool,
    #[serde(default)]
    pub bore: bool,
    #[serde(default)]
    pub hinge: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl LineItem {
    /// Positive width and height and at least one door.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width > Decimal::ZERO && self.height > Decimal::ZERO && self.qty >= 1
    }

    /// Tidy a submitted row: fresh id, trimmed text, blank options dropped,
    /// and no glass type unless glass is enabled.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.id = LineItemId::generate();
        self.door_style = self.door_style.trim().to_owned();
        self.finish = FinishRef::new(self.finish.name.trim(), self.finish.manufacturer.trim());
        self.glass_type = if self.glass { non_blank(self.glass_type) } else { None };
        self.hinge = non_blank(self.hinge);
        self.notes = non_blank(self.notes);
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Fields a client sends to configure a line; the server assigns the id.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    pub qty: i32,
    pub width: Decimal,
    pub height: Decimal,
    pub door_style: String,
    pub finish: FinishRef,
    #[serde(default)]
    pub glass: bool,
    #[serde(default)]
    pub glass_type: Option<String>,
    #[serde(default)]
    pub center_rail: bool,
    #[serde(default)]
    pub bore: bool,
    #[serde(default)]
    pub hinge: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<LineItemInput> for LineItem {
    fn from(input: LineItemInput) -> Self {
        Self {
            id: LineItemId::generate(),
            qty: input.qty,
            width: input.width,
            height: input.height,
            door_style: input.door_style,
            finish: input.finish,
            glass: input.glass,
            glass_type: input.glass_type,
            center_rail: input.center_rail,
            bore: input.bore,
            hinge: input.hinge,
            notes: input.notes,
        }
        .normalized()
    }
}

/// Keep only the valid rows of a submission, normalized.
pub fn valid_items(items: impl IntoIterator<Item = LineItem>) -> Vec<LineItem> {
    items
        .into_iter()
        .filter(LineItem::is_valid)
        .map(LineItem::normalized)
        .collect()
}

#[cfg(any(test, feature = "test-util"))]
pub mod fixtures {
    //! Sample line items for tests.

    use super::*;

    /// A Shaker door in "White" from "Acme", no glass.
    #[must_use]
    pub fn door(width: i64, height: i64, qty: i32) -> LineItem {
        LineItem {
            id: LineItemId::generate(),
            qty,
            width: Decimal::from(width),
            height: Decimal::from(height),
            door_style: "Shaker".into(),
            finish: FinishRef::new("White", "Acme"),
            glass: false,
            glass_type: None,
            center_rail: false,
            bore: false,
            hinge: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn glass_door(width: i64, height: i64, qty: i32, glass_type: &str) -> LineItem {
        LineItem {
            glass: true,
            glass_type: Some(glass_type.into()),
            ..door(width, height, qty)
        }
    }
}

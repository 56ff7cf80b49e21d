//! Session-scoped cart of configured items.
//!
//! The cart stores what the customer configured and nothing else. Prices are
//! recomputed from the live catalog every time totals are read, so admin
//! price edits made after an item was added show up on the next render.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::item::{LineItem, MeasurementUnit, valid_items};
use crate::pricing::{LinePrice, OrderSummary, PricingEngine};
use crate::types::LineItemId;

/// Errors from cart mutations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    /// None of the submitted rows had positive dimensions and quantity.
    #[error("no valid items to add")]
    NoValidItems,

    #[error("cart item {0} not found")]
    ItemNotFound(LineItemId),
}

// =============================================================================
// Promo codes
// =============================================================================

/// Error parsing a promo code table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid promo code entry '{0}': expected CODE=PERCENT")]
pub struct PromoCodeParseError(pub String);

/// Lookup of promotional code to discount percent.
///
/// Codes are matched case-insensitively. Percentages are clamped to
/// `[0, 100]` on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromoCodes {
    codes: HashMap<String, Decimal>,
}

impl PromoCodes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a code.
    #[must_use]
    pub fn with_code(mut self, code: &str, percent: Decimal) -> Self {
        self.insert(code, percent);
        self
    }

    pub fn insert(&mut self, code: &str, percent: Decimal) {
        let percent = percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        self.codes.insert(normalize_code(code), percent);
    }

    /// Discount percent for `code`, if it is a known code.
    #[must_use]
    pub fn discount_percent(&self, code: &str) -> Option<Decimal> {
        self.codes.get(&normalize_code(code)).copied()
    }

    /// Canonical spelling and percent of a known code.
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<(String, Decimal)> {
        let code = normalize_code(code);
        let percent = self.codes.get(&code).copied()?;
        Some((code, percent))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl std::str::FromStr for PromoCodes {
    type Err = PromoCodeParseError;

    /// Parse `"CODE=PCT,CODE=PCT"`. Blank input is an empty table.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut codes = Self::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (code, percent) = entry
                .split_once('=')
                .ok_or_else(|| PromoCodeParseError(entry.to_owned()))?;
            let code = code.trim();
            if code.is_empty() {
                return Err(PromoCodeParseError(entry.to_owned()));
            }
            let percent: Decimal = percent
                .trim()
                .parse()
                .map_err(|_| PromoCodeParseError(entry.to_owned()))?;
            codes.insert(code, percent);
        }
        Ok(codes)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Totals shown on the cart page, recomputed on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub lines: Vec<LinePrice>,
    pub discount_percent: Decimal,
    pub summary: OrderSummary,
}

/// Configured items between "configure" and "checkout".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<LineItem>,
    #[serde(default)]
    unit: MeasurementUnit,
    #[serde(default)]
    promo_code: Option<String>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub const fn unit(&self) -> MeasurementUnit {
        self.unit
    }

    #[must_use]
    pub fn promo_code(&self) -> Option<&str> {
        self.promo_code.as_deref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append the valid rows of `items`, normalized.
    ///
    /// Returns how many rows were added.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NoValidItems` and leaves the cart untouched if no
    /// incoming row is valid.
    pub fn add(&mut self, items: impl IntoIterator<Item = LineItem>) -> Result<usize, CartError> {
        let items = valid_items(items);
        if items.is_empty() {
            return Err(CartError::NoValidItems);
        }
        let added = items.len();
        self.items.extend(items);
        Ok(added)
    }

    /// Set the quantity of one line. Quantities below 1 are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if no line has this id.
    pub fn update_quantity(&mut self, id: LineItemId, qty: i32) -> Result<(), CartError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(CartError::ItemNotFound(id))?;
        if qty >= 1 {
            item.qty = qty;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if no line has this id.
    pub fn remove(&mut self, id: LineItemId) -> Result<LineItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or(CartError::ItemNotFound(id))?;
        Ok(self.items.remove(index))
    }

    /// Empty the cart, including any applied promo code.
    pub fn clear(&mut self) {
        self.items.clear();
        self.promo_code = None;
    }

    pub const fn set_unit(&mut self, unit: MeasurementUnit) {
        self.unit = unit;
    }

    /// Apply a promo code if it is known. Unknown codes leave the cart
    /// unchanged and return `None`.
    pub fn apply_promo(&mut self, code: &str, promos: &PromoCodes) -> Option<Decimal> {
        let percent = promos.discount_percent(code)?;
        self.promo_code = Some(normalize_code(code));
        Some(percent)
    }

    /// Discount percent of the applied code under the current table.
    #[must_use]
    pub fn discount_percent(&self, promos: &PromoCodes) -> Decimal {
        self.promo_code
            .as_deref()
            .and_then(|code| promos.discount_percent(code))
            .unwrap_or(Decimal::ZERO)
    }

    /// Price the cart against the live catalog.
    #[must_use]
    pub fn display_totals(&self, engine: &PricingEngine<'_>, promos: &PromoCodes) -> CartTotals {
        let discount_percent = self.discount_percent(promos);
        let priced = engine.price_items(&self.items, self.unit, discount_percent);
        CartTotals {
            lines: priced.lines,
            discount_percent,
            summary: priced.summary,
        }
    }

    /// Move the contents out, leaving an empty cart.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::Finish;
    use crate::item::fixtures::door;
    use crate::pricing::PricingPolicy;
    use crate::types::{FinishId, ManufacturerId, round_cents};

    fn white(price: Decimal) -> Vec<Finish> {
        vec![Finish {
            id: FinishId::new(1),
            name: "White".into(),
            manufacturer_id: ManufacturerId::new(1),
            manufacturer: "Acme".into(),
            sqft_price: price,
        }]
    }

    #[test]
    fn test_add_rejects_all_invalid() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(vec![door(0, 0, 1)]), Err(CartError::NoValidItems));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_keeps_valid_rows_only() {
        let mut cart = Cart::new();
        let added = cart.add(vec![door(24, 30, 2), door(0, 30, 1)]).unwrap();
        assert_eq!(added, 1);
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_update_quantity_floor_is_one() {
        let mut cart = Cart::new();
        cart.add(vec![door(24, 30, 2)]).unwrap();
        let id = cart.items()[0].id;

        cart.update_quantity(id, 0).unwrap();
        assert_eq!(cart.items()[0].qty, 2);
        cart.update_quantity(id, -3).unwrap();
        assert_eq!(cart.items()[0].qty, 2);
        cart.update_quantity(id, 5).unwrap();
        assert_eq!(cart.items()[0].qty, 5);

        let missing = LineItemId::generate();
        assert_eq!(
            cart.update_quantity(missing, 3),
            Err(CartError::ItemNotFound(missing))
        );
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add(vec![door(24, 30, 2), door(12, 12, 1)]).unwrap();
        let id = cart.items()[0].id;
        cart.remove(id).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert!(matches!(cart.remove(id), Err(CartError::ItemNotFound(_))));
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_track_catalog_price_changes() {
        let policy = PricingPolicy::default();
        let promos = PromoCodes::new();
        let mut cart = Cart::new();
        cart.add(vec![door(24, 30, 2)]).unwrap();

        let before = white(Decimal::new(1250, 2));
        let totals = cart.display_totals(&PricingEngine::new(&before, &[], &policy), &promos);
        assert_eq!(round_cents(totals.summary.subtotal), Decimal::new(12_500, 2));

        let after = white(Decimal::from(20));
        let totals = cart.display_totals(&PricingEngine::new(&after, &[], &policy), &promos);
        assert_eq!(round_cents(totals.summary.subtotal), Decimal::from(200));
        assert_eq!(totals.summary.shipping, Decimal::ZERO);
    }

    #[test]
    fn test_unknown_promo_is_a_no_op() {
        let promos = PromoCodes::new().with_code("SAVE10", Decimal::TEN);
        let mut cart = Cart::new();
        assert_eq!(cart.apply_promo("BOGUS", &promos), None);
        assert_eq!(cart.promo_code(), None);
        assert_eq!(cart.apply_promo("save10", &promos), Some(Decimal::TEN));
        assert_eq!(cart.promo_code(), Some("SAVE10"));
        assert_eq!(cart.apply_promo("BOGUS", &promos), None);
        assert_eq!(cart.promo_code(), Some("SAVE10"));
    }

    #[test]
    fn test_promo_applies_to_totals() {
        let policy = PricingPolicy::default();
        let promos = PromoCodes::new().with_code("SAVE10", Decimal::TEN);
        let finishes = white(Decimal::ONE_HUNDRED);
        let mut cart = Cart::new();
        cart.add(vec![door(12, 12, 1)]).unwrap();
        cart.apply_promo("SAVE10", &promos);

        let totals = cart.display_totals(&PricingEngine::new(&finishes, &[], &policy), &promos);
        assert_eq!(totals.discount_percent, Decimal::TEN);
        assert_eq!(totals.summary.total, Decimal::new(10_599, 2));
    }

    #[test]
    fn test_promo_table_parsing() {
        let promos: PromoCodes = "save10=10, Spring = 15 ,,".parse().unwrap();
        assert_eq!(promos.len(), 2);
        assert_eq!(promos.discount_percent("SPRING"), Some(Decimal::from(15)));
        assert!("".parse::<PromoCodes>().unwrap().is_empty());
        assert!("NOPERCENT".parse::<PromoCodes>().is_err());
        assert!("X=abc".parse::<PromoCodes>().is_err());
        assert!("=5".parse::<PromoCodes>().is_err());
    }

    #[test]
    fn test_promo_percent_clamped() {
        let promos = PromoCodes::new().with_code("HUGE", Decimal::from(250));
        assert_eq!(promos.discount_percent("huge"), Some(Decimal::ONE_HUNDRED));
    }

    #[test]
    fn test_cart_serializes_for_session_storage() {
        let mut cart = Cart::new();
        cart.add(vec![door(24, 30, 2)]).unwrap();
        cart.set_unit(MeasurementUnit::Millimeters);
        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }
}

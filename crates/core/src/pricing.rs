//! Line-item pricing engine.
//!
//! The only place prices are computed. The order form, the cart and
//! checkout all call [`PricingEngine`]; nothing else multiplies rates.
//!
//! # Rules
//!
//! - `area = width × height × qty / 144` in square feet (inches in, after
//!   unit conversion). Invalid items have area 0.
//! - `price = area × finish_rate + glass_area × glass_rate`, where the glass
//!   part applies only when the item has glass enabled. Without the glass
//!   minimum policy `glass_area = area`, which gives the familiar
//!   `area × (finish_rate + glass_rate)`.
//! - `subtotal` sums valid items; shipping is free strictly above the
//!   threshold; `discount = subtotal × pct / 100`;
//!   `total = subtotal + shipping − discount`.
//!
//! Nothing here rounds. Use [`OrderSummary::rounded`] or [`crate::Money`]
//! when presenting.
//!
//! # Degradation
//!
//! An unknown finish or glass type prices that component at zero and logs a
//! warning. The engine never fails; an order with an unpriced finish still
//! goes through at a lower total. Arithmetic is checked: dimensions or
//! rates large enough to overflow `Decimal` price that line at zero with a
//! warning instead of panicking.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogSnapshot, Finish, GlassType};
use crate::item::{LineItem, MeasurementUnit};
use crate::types::{LineItemId, round_cents};

const SQUARE_INCHES_PER_SQUARE_FOOT: Decimal = Decimal::from_parts(144, 0, 0, false, 0);
const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Shipping and billing knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPolicy {
    /// Shipping is free when the subtotal is strictly greater than this.
    pub free_shipping_threshold: Decimal,
    /// Flat shipping charged otherwise.
    pub flat_shipping: Decimal,
    /// Bill glass on at least the glass type's minimum area per door.
    pub enforce_glass_minimum: bool,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Decimal::new(13_900, 2),
            flat_shipping: Decimal::new(1599, 2),
            enforce_glass_minimum: true,
        }
    }
}

impl PricingPolicy {
    /// Shipping charge for a subtotal.
    #[must_use]
    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal > self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.flat_shipping
        }
    }
}

/// Aggregated monetary amounts for a set of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl OrderSummary {
    /// Cents-rounded copy for display.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: round_cents(self.subtotal),
            shipping: round_cents(self.shipping),
            discount: round_cents(self.discount),
            total: round_cents(self.total),
        }
    }
}

/// Price breakdown of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinePrice {
    pub id: LineItemId,
    /// Billed area in square feet.
    pub area: Decimal,
    pub price: Decimal,
}

/// Totals plus the per-line breakdown they were built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedItems {
    pub lines: Vec<LinePrice>,
    pub summary: OrderSummary,
}

// =============================================================================
// Pure building blocks
// =============================================================================

fn overflow(item: &LineItem, stage: &'static str) -> Decimal {
    tracing::warn!(item_id = %item.id, stage, "Pricing overflowed, pricing line at zero");
    Decimal::ZERO
}

/// Area of a single door in square feet, or zero for an invalid item.
fn door_area(item: &LineItem, unit: MeasurementUnit) -> Decimal {
    if !item.is_valid() {
        return Decimal::ZERO;
    }
    let width = unit.to_inches(item.width);
    let height = unit.to_inches(item.height);
    let Some(area) = width
        .checked_mul(height)
        .and_then(|a| a.checked_div(SQUARE_INCHES_PER_SQUARE_FOOT))
    else {
        return overflow(item, "door area");
    };
    if area > Decimal::ZERO { area } else { Decimal::ZERO }
}

/// `door_area × qty`, or `None` on overflow.
fn billed_area(per_door: Decimal, qty: i32) -> Option<Decimal> {
    per_door.checked_mul(Decimal::from(qty.max(0)))
}

/// Total square footage of a line: `width × height × qty / 144`.
///
/// Returns zero for invalid items and for dimensions too large to
/// represent; never fails.
#[must_use]
pub fn item_area(item: &LineItem, unit: MeasurementUnit) -> Decimal {
    billed_area(door_area(item, unit), item.qty).unwrap_or_else(|| overflow(item, "area"))
}

/// Per-square-foot rate of the finish matching both `name` and
/// `manufacturer`, or zero when there is no single match.
#[must_use]
pub fn resolve_finish_rate(finishes: &[Finish], name: &str, manufacturer: &str) -> Decimal {
    let mut matches = finishes
        .iter()
        .filter(|f| f.name == name && f.manufacturer == manufacturer);

    match (matches.next(), matches.next()) {
        (Some(finish), None) => finish.sqft_price,
        (Some(_), Some(_)) => {
            tracing::warn!(
                finish = %name,
                manufacturer = %manufacturer,
                "Duplicate finish entries in catalog, pricing finish at zero"
            );
            Decimal::ZERO
        }
        (None, _) => {
            tracing::warn!(
                finish = %name,
                manufacturer = %manufacturer,
                "Finish not found in catalog, pricing finish at zero"
            );
            Decimal::ZERO
        }
    }
}

fn find_glass_type<'a>(glass_types: &'a [GlassType], item: &LineItem) -> Option<&'a GlassType> {
    if !item.glass {
        return None;
    }
    let Some(name) = item.glass_type.as_deref() else {
        tracing::warn!(item_id = %item.id, "Glass enabled without a glass type, pricing glass at zero");
        return None;
    };
    let found = glass_types.iter().find(|g| g.name == name);
    if found.is_none() {
        tracing::warn!(glass_type = %name, "Glass type not found in catalog, pricing glass at zero");
    }
    found
}

/// Per-square-foot glass rate for an item, or zero when the item has no
/// glass or its glass type is unknown.
#[must_use]
pub fn resolve_glass_rate(glass_types: &[GlassType], item: &LineItem) -> Decimal {
    find_glass_type(glass_types, item).map_or(Decimal::ZERO, |g| g.sqft_price)
}

// =============================================================================
// Engine
// =============================================================================

/// Prices items against one catalog snapshot under one policy.
#[derive(Debug, Clone, Copy)]
pub struct PricingEngine<'a> {
    finishes: &'a [Finish],
    glass_types: &'a [GlassType],
    policy: &'a PricingPolicy,
}

impl<'a> PricingEngine<'a> {
    #[must_use]
    pub const fn new(
        finishes: &'a [Finish],
        glass_types: &'a [GlassType],
        policy: &'a PricingPolicy,
    ) -> Self {
        Self {
            finishes,
            glass_types,
            policy,
        }
    }

    /// Engine over a full catalog snapshot.
    #[must_use]
    pub fn from_snapshot(catalog: &'a CatalogSnapshot, policy: &'a PricingPolicy) -> Self {
        Self::new(&catalog.finishes, &catalog.glass_types, policy)
    }

    /// Price of one line. Zero for invalid items; monotonic in area and in
    /// both rates.
    #[must_use]
    pub fn item_price(&self, item: &LineItem, unit: MeasurementUnit) -> Decimal {
        self.line_price(item, unit).price
    }

    /// Area and price of one line.
    #[must_use]
    pub fn line_price(&self, item: &LineItem, unit: MeasurementUnit) -> LinePrice {
        let area = item_area(item, unit);
        if area.is_zero() {
            return LinePrice {
                id: item.id,
                area,
                price: Decimal::ZERO,
            };
        }

        let price = self
            .checked_line_price(item, unit, area)
            .unwrap_or_else(|| overflow(item, "price"));

        LinePrice {
            id: item.id,
            area,
            price,
        }
    }

    fn checked_line_price(
        &self,
        item: &LineItem,
        unit: MeasurementUnit,
        area: Decimal,
    ) -> Option<Decimal> {
        let finish_rate =
            resolve_finish_rate(self.finishes, &item.finish.name, &item.finish.manufacturer);
        let mut price = area.checked_mul(finish_rate)?;

        if let Some(glass) = find_glass_type(self.glass_types, item) {
            let glass_area = if self.policy.enforce_glass_minimum {
                billed_area(door_area(item, unit).max(glass.sqft_minimum), item.qty)?
            } else {
                area
            };
            price = price.checked_add(glass_area.checked_mul(glass.sqft_price)?)?;
        }

        Some(price)
    }

    /// Price every valid item and aggregate totals.
    ///
    /// `discount_percent` is clamped to `[0, 100]`.
    #[must_use]
    pub fn price_items(
        &self,
        items: &[LineItem],
        unit: MeasurementUnit,
        discount_percent: Decimal,
    ) -> PricedItems {
        let mut lines = Vec::with_capacity(items.len());
        let mut subtotal = Decimal::ZERO;
        for item in items.iter().filter(|item| item.is_valid()) {
            let mut line = self.line_price(item, unit);
            match subtotal.checked_add(line.price) {
                Some(sum) => subtotal = sum,
                None => line.price = overflow(item, "subtotal"),
            }
            lines.push(line);
        }

        let shipping = self.policy.shipping_for(subtotal);
        let pct = discount_percent.clamp(Decimal::ZERO, ONE_HUNDRED);
        // pct <= 100, so the discount never exceeds the subtotal
        let discount = subtotal
            .checked_mul(pct)
            .map_or_else(|| subtotal / ONE_HUNDRED * pct, |d| d / ONE_HUNDRED);
        let total = subtotal
            .checked_add(shipping)
            .map_or(subtotal - discount, |t| t - discount);

        PricedItems {
            lines,
            summary: OrderSummary {
                subtotal,
                shipping,
                discount,
                total,
            },
        }
    }

    /// Totals only; see [`Self::price_items`].
    #[must_use]
    pub fn order_totals(
        &self,
        items: &[LineItem],
        unit: MeasurementUnit,
        discount_percent: Decimal,
    ) -> OrderSummary {
        self.price_items(items, unit, discount_percent).summary
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::FinishRef;
    use crate::item::fixtures::{door, glass_door};
    use crate::types::{FinishId, GlassTypeId, ManufacturerId};

    fn finish(id: i32, name: &str, manufacturer: &str, price: Decimal) -> Finish {
        Finish {
            id: FinishId::new(id),
            name: name.into(),
            manufacturer_id: ManufacturerId::new(id),
            manufacturer: manufacturer.into(),
            sqft_price: price,
        }
    }

    fn glass(name: &str, price: Decimal, minimum: Decimal) -> GlassType {
        GlassType {
            id: GlassTypeId::new(1),
            name: name.into(),
            sqft_price: price,
            sqft_minimum: minimum,
        }
    }

    fn cents(c: i64) -> Decimal {
        Decimal::new(c, 2)
    }

    fn catalog() -> (Vec<Finish>, Vec<GlassType>) {
        (
            vec![finish(1, "White", "Acme", cents(1250))],
            vec![glass("Clear", cents(1500), Decimal::ONE)],
        )
    }

    #[test]
    fn test_area_scenario() {
        let area = item_area(&door(24, 30, 2), MeasurementUnit::Inches);
        assert_eq!(area, Decimal::TEN);
    }

    #[test]
    fn test_area_zero_for_invalid_items() {
        for item in [door(0, 30, 1), door(24, 0, 1), door(24, 30, 0), door(-5, 30, 3)] {
            assert_eq!(item_area(&item, MeasurementUnit::Inches), Decimal::ZERO);
        }
    }

    #[test]
    fn test_area_converts_millimeters() {
        // 609.6mm x 762mm = 24in x 30in
        let mut item = door(0, 0, 2);
        item.width = Decimal::new(6096, 1);
        item.height = Decimal::from(762);
        assert_eq!(item_area(&item, MeasurementUnit::Millimeters), Decimal::TEN);
    }

    #[test]
    fn test_item_price_without_glass() {
        let (finishes, glass_types) = catalog();
        let policy = PricingPolicy::default();
        let engine = PricingEngine::new(&finishes, &glass_types, &policy);
        let price = engine.item_price(&door(24, 30, 2), MeasurementUnit::Inches);
        assert_eq!(round_cents(price), cents(12_500));
    }

    #[test]
    fn test_item_price_with_glass() {
        let (finishes, glass_types) = catalog();
        let policy = PricingPolicy::default();
        let engine = PricingEngine::new(&finishes, &glass_types, &policy);
        let price = engine.item_price(&glass_door(24, 30, 2, "Clear"), MeasurementUnit::Inches);
        assert_eq!(round_cents(price), cents(27_500));
    }

    #[test]
    fn test_glass_flag_off_ignores_glass_type() {
        let (finishes, glass_types) = catalog();
        let policy = PricingPolicy::default();
        let engine = PricingEngine::new(&finishes, &glass_types, &policy);
        let mut item = glass_door(24, 30, 2, "Clear");
        item.glass = false;
        assert_eq!(resolve_glass_rate(&glass_types, &item), Decimal::ZERO);
        assert_eq!(round_cents(engine.item_price(&item, MeasurementUnit::Inches)), cents(12_500));
    }

    #[test]
    fn test_glass_minimum_floors_small_doors() {
        let finishes = vec![finish(1, "White", "Acme", Decimal::ZERO)];
        let glass_types = vec![glass("Clear", Decimal::TEN, Decimal::from(2))];
        // 12 x 12 = 1 sqft per door, minimum 2 sqft, 3 doors
        let item = glass_door(12, 12, 3, "Clear");

        let enforced = PricingPolicy::default();
        let engine = PricingEngine::new(&finishes, &glass_types, &enforced);
        assert_eq!(engine.item_price(&item, MeasurementUnit::Inches), Decimal::from(60));

        let relaxed = PricingPolicy {
            enforce_glass_minimum: false,
            ..PricingPolicy::default()
        };
        let engine = PricingEngine::new(&finishes, &glass_types, &relaxed);
        assert_eq!(engine.item_price(&item, MeasurementUnit::Inches), Decimal::from(30));
    }

    #[test]
    fn test_finish_resolution_requires_manufacturer() {
        let finishes = vec![
            finish(1, "White", "Acme", cents(1000)),
            finish(2, "White", "Birch & Co", cents(2000)),
        ];
        assert_eq!(resolve_finish_rate(&finishes, "White", "Acme"), cents(1000));
        assert_eq!(resolve_finish_rate(&finishes, "White", "Birch & Co"), cents(2000));
        assert_eq!(resolve_finish_rate(&finishes, "White", "Other"), Decimal::ZERO);
    }

    #[test]
    fn test_duplicate_finish_entries_do_not_pick_one() {
        let finishes = vec![
            finish(1, "White", "Acme", cents(1000)),
            finish(2, "White", "Acme", cents(2000)),
        ];
        assert_eq!(resolve_finish_rate(&finishes, "White", "Acme"), Decimal::ZERO);
    }

    #[test]
    fn test_unknown_references_degrade_to_zero() {
        let (finishes, glass_types) = catalog();
        let policy = PricingPolicy::default();
        let engine = PricingEngine::new(&finishes, &glass_types, &policy);

        let mut unknown_finish = door(24, 30, 2);
        unknown_finish.finish = FinishRef::new("Unpriced", "Acme");
        assert_eq!(engine.item_price(&unknown_finish, MeasurementUnit::Inches), Decimal::ZERO);

        let unknown_glass = glass_door(24, 30, 2, "Frosted");
        assert_eq!(
            round_cents(engine.item_price(&unknown_glass, MeasurementUnit::Inches)),
            cents(12_500)
        );

        let mut glass_without_type = glass_door(24, 30, 2, "Clear");
        glass_without_type.glass_type = None;
        assert_eq!(
            round_cents(engine.item_price(&glass_without_type, MeasurementUnit::Inches)),
            cents(12_500)
        );
    }

    #[test]
    fn test_invalid_items_excluded_from_subtotal() {
        let (finishes, glass_types) = catalog();
        let policy = PricingPolicy::default();
        let engine = PricingEngine::new(&finishes, &glass_types, &policy);
        let items = vec![door(24, 30, 2), door(0, 30, 5), door(24, 30, 0)];
        let priced = engine.price_items(&items, MeasurementUnit::Inches, Decimal::ZERO);
        assert_eq!(priced.lines.len(), 1);
        assert_eq!(round_cents(priced.summary.subtotal), cents(12_500));
    }

    #[test]
    fn test_subtotal_is_order_independent() {
        let (finishes, glass_types) = catalog();
        let policy = PricingPolicy::default();
        let engine = PricingEngine::new(&finishes, &glass_types, &policy);
        let mut items = vec![
            door(24, 30, 2),
            glass_door(11, 13, 3, "Clear"),
            door(17, 19, 1),
        ];
        let forward = engine.order_totals(&items, MeasurementUnit::Inches, Decimal::ZERO);
        items.reverse();
        let backward = engine.order_totals(&items, MeasurementUnit::Inches, Decimal::ZERO);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_shipping_threshold_is_strict() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.shipping_for(cents(13_900)), cents(1599));
        assert_eq!(policy.shipping_for(cents(13_901)), Decimal::ZERO);
        assert_eq!(policy.shipping_for(cents(15_000)), Decimal::ZERO);
        assert_eq!(policy.shipping_for(cents(10_000)), cents(1599));
    }

    #[test]
    fn test_totals_with_promo_scenario() {
        // $100 subtotal: 1 sqft finish at $100
        let finishes = vec![finish(1, "White", "Acme", Decimal::ONE_HUNDRED)];
        let policy = PricingPolicy::default();
        let engine = PricingEngine::new(&finishes, &[], &policy);
        let summary = engine.order_totals(&[door(12, 12, 1)], MeasurementUnit::Inches, Decimal::TEN);
        assert_eq!(summary.subtotal, Decimal::ONE_HUNDRED);
        assert_eq!(summary.shipping, cents(1599));
        assert_eq!(summary.discount, Decimal::TEN);
        assert_eq!(summary.total, cents(10_599));
    }

    #[test]
    fn test_total_identity_across_discounts() {
        let (finishes, glass_types) = catalog();
        let policy = PricingPolicy::default();
        let engine = PricingEngine::new(&finishes, &glass_types, &policy);
        let items = vec![door(24, 30, 2), glass_door(15, 22, 1, "Clear")];
        for pct in [0, 5, 10, 33, 50, 100] {
            let pct = Decimal::from(pct);
            let s = engine.order_totals(&items, MeasurementUnit::Inches, pct);
            assert_eq!(s.discount, s.subtotal * pct / Decimal::ONE_HUNDRED);
            assert_eq!(s.total, s.subtotal + s.shipping - s.discount);
        }
    }

    #[test]
    fn test_discount_percent_is_clamped() {
        let (finishes, glass_types) = catalog();
        let policy = PricingPolicy::default();
        let engine = PricingEngine::new(&finishes, &glass_types, &policy);
        let items = vec![door(24, 30, 2)];
        let over = engine.order_totals(&items, MeasurementUnit::Inches, Decimal::from(150));
        assert_eq!(over.discount, over.subtotal);
        let under = engine.order_totals(&items, MeasurementUnit::Inches, Decimal::from(-5));
        assert_eq!(under.discount, Decimal::ZERO);
    }

    #[test]
    fn test_price_is_monotonic_in_area() {
        let (finishes, glass_types) = catalog();
        let policy = PricingPolicy::default();
        let engine = PricingEngine::new(&finishes, &glass_types, &policy);
        let small = engine.item_price(&glass_door(10, 10, 1, "Clear"), MeasurementUnit::Inches);
        let large = engine.item_price(&glass_door(20, 10, 1, "Clear"), MeasurementUnit::Inches);
        let more = engine.item_price(&glass_door(20, 10, 2, "Clear"), MeasurementUnit::Inches);
        assert!(small <= large);
        assert!(large <= more);
    }

    #[test]
    fn test_rounding_happens_only_on_presentation() {
        // 7 x 7 in = 49/144 sqft, three lines at $1/sqft
        let finishes = vec![finish(1, "White", "Acme", Decimal::ONE)];
        let policy = PricingPolicy::default();
        let engine = PricingEngine::new(&finishes, &[], &policy);
        let items = vec![door(7, 7, 1), door(7, 7, 1), door(7, 7, 1)];
        let summary = engine.order_totals(&items, MeasurementUnit::Inches, Decimal::ZERO);
        // each line rounds to $0.34, but the exact subtotal is 147/144
        assert_eq!(summary.rounded().subtotal, cents(102));
    }

    #[test]
    fn test_oversized_dimensions_price_at_zero() {
        let (finishes, glass_types) = catalog();
        let policy = PricingPolicy::default();
        let engine = PricingEngine::new(&finishes, &glass_types, &policy);

        let mut huge = glass_door(0, 0, 3, "Clear");
        huge.width = Decimal::from(1_000_000_000_000_000_i64);
        huge.height = huge.width;
        assert!(huge.is_valid());
        assert_eq!(item_area(&huge, MeasurementUnit::Inches), Decimal::ZERO);
        assert_eq!(engine.item_price(&huge, MeasurementUnit::Inches), Decimal::ZERO);

        let priced = engine.price_items(
            &[huge, door(24, 30, 2)],
            MeasurementUnit::Inches,
            Decimal::TEN,
        );
        assert_eq!(round_cents(priced.summary.subtotal), cents(12_500));
    }

    #[test]
    fn test_oversized_rate_prices_line_at_zero() {
        let finishes = vec![finish(1, "White", "Acme", Decimal::MAX)];
        let policy = PricingPolicy::default();
        let engine = PricingEngine::new(&finishes, &[], &policy);
        assert_eq!(engine.item_price(&door(24, 30, 2), MeasurementUnit::Inches), Decimal::ZERO);
    }

    #[test]
    fn test_subtotal_overflow_drops_the_overflowing_line() {
        // 10 sqft at 4e27 per sqft is 4e28; two such lines exceed Decimal::MAX
        let rate = Decimal::from_i128_with_scale(4 * 10_i128.pow(27), 0);
        let finishes = vec![finish(1, "White", "Acme", rate)];
        let policy = PricingPolicy::default();
        let engine = PricingEngine::new(&finishes, &[], &policy);
        let items = vec![door(24, 30, 2), door(24, 30, 2)];

        let priced = engine.price_items(&items, MeasurementUnit::Inches, Decimal::TEN);
        let line = rate * Decimal::TEN;
        assert_eq!(priced.lines[0].price, line);
        assert_eq!(priced.lines[1].price, Decimal::ZERO);
        assert_eq!(priced.summary.subtotal, line);
        assert_eq!(priced.summary.shipping, Decimal::ZERO);
        assert_eq!(priced.summary.discount, line / Decimal::TEN);
        assert_eq!(priced.summary.total, line - line / Decimal::TEN);
    }
}

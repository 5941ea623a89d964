//! Quantity and money arithmetic using rust_decimal for precision
//!
//! Sums are accumulated as `Decimal`, then converted back to `f64` for
//! storage/serialization. Quantities keep 3 decimal places (grams of a kg),
//! money keeps 2.

use rust_decimal::prelude::*;

const QUANTITY_PLACES: u32 = 3;
const MONEY_PLACES: u32 = 2;

/// Convert f64 to Decimal (NaN/Infinity become zero)
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Decimal → f64 quantity, rounded to 3 decimal places
#[inline]
pub fn quantity_to_f64(value: Decimal) -> f64 {
    round_to_f64(value, QUANTITY_PLACES)
}

/// Decimal → f64 money, rounded to 2 decimal places
#[inline]
pub fn money_to_f64(value: Decimal) -> f64 {
    round_to_f64(value, MONEY_PLACES)
}

fn round_to_f64(value: Decimal, places: u32) -> f64 {
    value
        .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// quantity × unit price
pub fn line_total(quantity: f64, unit_price: f64) -> f64 {
    money_to_f64(to_decimal(quantity) * to_decimal(unit_price))
}

/// Sum of f64 values without float drift
pub fn sum<I: IntoIterator<Item = f64>>(values: I) -> Decimal {
    values.into_iter().map(to_decimal).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_has_no_float_drift() {
        let total = sum([0.1, 0.2, 0.3]);
        assert_eq!(quantity_to_f64(total), 0.6);
        assert_eq!(sum(Vec::<f64>::new()), Decimal::ZERO);
    }

    #[test]
    fn test_line_total_rounding() {
        assert_eq!(line_total(3.0, 19.99), 59.97);
        assert_eq!(line_total(0.333, 10.0), 3.33);
        assert_eq!(line_total(2.5, 0.0), 0.0);
    }

    #[test]
    fn test_non_finite_becomes_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(quantity_to_f64(to_decimal(1.23456)), 1.235);
    }
}

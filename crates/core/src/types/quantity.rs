//! Decimal quantity with tolerant parsing.
//!
//! Quantities reach the service as JSON numbers, decimal strings typed by lab
//! staff (`"40"`, `"12.5"`, `"12,5"`), or database `NUMERIC` values. Partial
//! data entry must never break reconciliation, so the lenient constructors and
//! the `Deserialize` impl coerce anything malformed to zero.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A produced or requested amount in the item's unit of measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Zero quantity.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Decimal places kept by the `NUMERIC(14, 3)` columns.
    pub const STORED_SCALE: u32 = 3;

    /// Largest magnitude a `NUMERIC(14, 3)` column holds.
    pub const STORED_MAX: Self = Self(Decimal::from_parts(276_447_231, 23_283, 0, false, 3));

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Parse a user-entered amount, returning `None` when it is not a number.
    ///
    /// Accepts a comma as decimal separator when no dot is present. When both
    /// appear, the last one is the decimal separator and the other groups
    /// thousands, so `"1.000,5"` and `"1,000.5"` are both 1000.5.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        let normalized = match (trimmed.rfind(','), trimmed.rfind('.')) {
            (Some(comma), Some(dot)) if comma > dot => trimmed.replace('.', "").replace(',', "."),
            (Some(_), Some(_)) => trimmed.replace(',', ""),
            (Some(_), None) => trimmed.replacen(',', ".", 1),
            (None, _) => trimmed.to_string(),
        };
        Decimal::from_str(&normalized)
            .or_else(|_| Decimal::from_scientific(&normalized))
            .ok()
            .map(Self)
    }

    /// Parse a stored or user-entered amount, treating malformed input as zero.
    #[must_use]
    pub fn lenient(input: &str) -> Self {
        Self::parse(input).unwrap_or(Self::ZERO)
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Whether a `NUMERIC(14, 3)` column stores the amount without rounding
    /// or overflow.
    #[must_use]
    pub fn fits_storage(self) -> bool {
        self.0.normalize().scale() <= Self::STORED_SCALE && self.0.abs() <= Self::STORED_MAX.0
    }
}

impl From<Decimal> for Quantity {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<i64> for Quantity {
    fn from(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }
}

impl From<Quantity> for Decimal {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

// Saturating: totals over unbounded input must not panic.
impl Add for Quantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Quantity {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LenientQuantityVisitor)
    }
}

struct LenientQuantityVisitor;

impl Visitor<'_> for LenientQuantityVisitor {
    type Value = Quantity;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a decimal number or decimal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Quantity, E> {
        Ok(Quantity::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Quantity, E> {
        Ok(Quantity(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Quantity, E> {
        Ok(Decimal::try_from(v).map_or(Quantity::ZERO, Quantity))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Quantity, E> {
        Ok(Quantity::lenient(v))
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Quantity, E> {
        Ok(Quantity::ZERO)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Quantity, E> {
        Ok(Quantity::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Quantity, E> {
        Ok(Quantity::ZERO)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_fractional() {
        assert_eq!(Quantity::parse("40"), Some(Quantity::from(40)));
        assert_eq!(
            Quantity::parse(" 12.5 "),
            Some(Quantity::new(Decimal::new(125, 1)))
        );
    }

    #[test]
    fn test_parse_accepts_decimal_comma() {
        assert_eq!(
            Quantity::parse("12,5"),
            Some(Quantity::new(Decimal::new(125, 1)))
        );
    }

    #[test]
    fn test_parse_thousands_grouping() {
        let expected = Some(Quantity::new(Decimal::new(10_005, 1)));
        assert_eq!(Quantity::parse("1.000,5"), expected);
        assert_eq!(Quantity::parse("1,000.5"), expected);
        assert_eq!(
            Quantity::parse("1.234.567,25"),
            Some(Quantity::new(Decimal::new(123_456_725, 2)))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Quantity::parse(""), None);
        assert_eq!(Quantity::parse("abc"), None);
    }

    #[test]
    fn test_lenient_treats_garbage_as_zero() {
        assert_eq!(Quantity::lenient("not a number"), Quantity::ZERO);
        assert_eq!(Quantity::lenient("30"), Quantity::from(30));
    }

    #[test]
    fn test_deserialize_numbers_strings_and_garbage() {
        let values: Vec<Quantity> =
            serde_json::from_str(r#"[40, 2.5, "30", "oops", null, true]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Quantity::from(40),
                Quantity::new(Decimal::new(25, 1)),
                Quantity::from(30),
                Quantity::ZERO,
                Quantity::ZERO,
                Quantity::ZERO,
            ]
        );
    }

    #[test]
    fn test_serialize_normalized_string() {
        let q = Quantity::new(Decimal::new(4000, 2));
        assert_eq!(serde_json::to_string(&q).unwrap(), "\"40\"");
    }

    #[test]
    fn test_arithmetic_allows_negative_results() {
        let remaining = Quantity::from(100) - Quantity::from(120);
        assert_eq!(remaining, Quantity::from(-20));
        assert!(!remaining.is_positive());
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_panicking() {
        let max = Quantity::new(Decimal::MAX);
        assert_eq!(max + max, max);
        let mut total = max;
        total += Quantity::from(1);
        assert_eq!(total, max);
        assert_eq!(-max - max, Quantity::new(Decimal::MIN));
        let total: Quantity = [max, max, max].into_iter().sum();
        assert_eq!(total, max);
    }

    #[test]
    fn test_fits_storage() {
        assert!(Quantity::from(40).fits_storage());
        assert!(Quantity::parse("0.125").unwrap().fits_storage());
        assert!(Quantity::parse("2.5000").unwrap().fits_storage());
        assert!(!Quantity::parse("0.0004").unwrap().fits_storage());
        assert!(Quantity::parse("99999999999.999").unwrap().fits_storage());
        assert_eq!(
            Quantity::STORED_MAX,
            Quantity::parse("99999999999.999").unwrap()
        );
        assert!(!Quantity::parse("100000000000").unwrap().fits_storage());
        assert!(!Quantity::new(Decimal::MAX).fits_storage());
    }

    #[test]
    fn test_sum() {
        let total: Quantity = [40, 30, 50].into_iter().map(Quantity::from).sum();
        assert_eq!(total, Quantity::from(120));
    }
}

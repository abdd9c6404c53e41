//! Display formatting for prices and mileage (pt-BR conventions).

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{Amount, AmountKind};

/// Format a price as Brazilian currency: `R$ 89.900,00`.
///
/// A missing price renders as `R$ 0,00`; legacy text that cannot be read as a
/// number renders as `R$ N/A`.
#[must_use]
pub fn format_price(price: Option<&Amount>) -> String {
    let Some(price) = price else {
        return "R$ 0,00".to_string();
    };
    price.value(AmountKind::Price).map_or_else(
        || "R$ N/A".to_string(),
        |value| format!("R$ {}", group_thousands(value, 2, true)),
    )
}

/// Format a mileage in kilometres: `45.000 km`.
///
/// Up to three fraction digits are kept, trailing zeros dropped. A missing
/// value renders as `0 km`, unreadable legacy text as `N/A km`.
#[must_use]
pub fn format_mileage(mileage: Option<&Amount>) -> String {
    let Some(mileage) = mileage else {
        return "0 km".to_string();
    };
    mileage.value(AmountKind::Mileage).map_or_else(
        || "N/A km".to_string(),
        |value| format!("{} km", group_thousands(value, 3, false)),
    )
}

/// Render `value` with `.` thousands grouping and `,` as decimal separator.
///
/// With `fixed` the fraction is padded to exactly `scale` digits, otherwise
/// at most `scale` digits are kept and trailing zeros removed.
fn group_thousands(value: Decimal, scale: u32, fixed: bool) -> String {
    let rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    let rounded = if fixed { rounded } else { rounded.normalize() };

    let text = if fixed {
        format!("{:.*}", scale as usize, rounded.abs())
    } else {
        rounded.abs().to_string()
    };
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut grouped = String::with_capacity(text.len() + integer.len() / 3);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.push('-');
    }
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    if !fraction.is_empty() {
        grouped.push(',');
        grouped.push_str(fraction);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_two_decimals_and_grouping() {
        assert_eq!(format_price(Some(&Amount::from(89_900))), "R$ 89.900,00");
        assert_eq!(format_price(Some(&Amount::from(1_234_567))), "R$ 1.234.567,00");
        assert_eq!(format_price(Some(&Amount::from(950))), "R$ 950,00");
        assert_eq!(
            format_price(Some(&Amount::Number(Decimal::new(8_990_055, 2)))),
            "R$ 89.900,55"
        );
        assert_eq!(
            format_price(Some(&Amount::Number(Decimal::new(89_900_555, 3)))),
            "R$ 89.900,56"
        );
    }

    #[test]
    fn test_price_placeholders() {
        assert_eq!(format_price(None), "R$ 0,00");
        assert_eq!(
            format_price(Some(&Amount::Legacy("sob consulta".to_string()))),
            "R$ N/A"
        );
    }

    #[test]
    fn test_price_legacy_text() {
        assert_eq!(
            format_price(Some(&Amount::Legacy("R$ 95.500".to_string()))),
            "R$ 95.500,00"
        );
    }

    #[test]
    fn test_mileage() {
        assert_eq!(format_mileage(Some(&Amount::from(45_000))), "45.000 km");
        assert_eq!(format_mileage(Some(&Amount::from(0))), "0 km");
        assert_eq!(
            format_mileage(Some(&Amount::Number(Decimal::new(12_345, 1)))),
            "1.234,5 km"
        );
        assert_eq!(
            format_mileage(Some(&Amount::Legacy("32.000 km".to_string()))),
            "32.000 km"
        );
        assert_eq!(format_mileage(None), "0 km");
        assert_eq!(
            format_mileage(Some(&Amount::Legacy("rodado".to_string()))),
            "N/A km"
        );
    }
}

//! Price text normalization and price-role resolution

use serde::Deserialize;

/// Sentinel returned when price text holds no parseable number
pub const NOT_AVAILABLE: &str = "N/A";

/// How normalized prices are parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceMode {
    /// Whole numbers; a decimal point is dropped like any other non-digit
    #[default]
    Integer,
    /// Decimal prices, `.` is the decimal point
    Float,
}

/// Normalizes raw price text into a plain number string
///
/// Keeps digits (ASCII, Persian and Arabic-Indic) and thousands separators,
/// drops the separators and parses the rest. Text without a parseable number
/// yields [`NOT_AVAILABLE`].
///
/// # Example
///
/// ```
/// use shelf_scout::extract::{format_price, PriceMode};
///
/// assert_eq!(format_price("1,234 EGP", PriceMode::Integer), "1234");
/// assert_eq!(format_price("free", PriceMode::Integer), "N/A");
/// ```
pub fn format_price(text: &str, mode: PriceMode) -> String {
    let digits: String = text
        .chars()
        .filter_map(|c| match c {
            '0'..='9' => Some(c),
            '\u{06F0}'..='\u{06F9}' => char::from_digit(c as u32 - 0x06F0, 10),
            '\u{0660}'..='\u{0669}' => char::from_digit(c as u32 - 0x0660, 10),
            '.' if mode == PriceMode::Float => Some('.'),
            _ => None,
        })
        .collect();

    match mode {
        PriceMode::Integer => digits
            .parse::<u64>()
            .map(|value| value.to_string())
            .unwrap_or_else(|_| NOT_AVAILABLE.to_string()),
        PriceMode::Float => digits
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(|value| value.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    }
}

/// Regular and discounted price of a product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRoles {
    pub price: String,
    pub sales_price: Option<String>,
}

/// Decides which observed price is the regular price and which the sale price
///
/// Both inputs are outputs of [`format_price`]. A sale price is only set when
/// both prices are numbers and they differ; the higher one becomes `price`.
pub fn resolve_prices(current: Option<&str>, comparison: Option<&str>) -> PriceRoles {
    let current = current.filter(|p| !p.is_empty() && *p != NOT_AVAILABLE);
    let comparison = comparison.filter(|p| !p.is_empty() && *p != NOT_AVAILABLE);

    match (current, comparison) {
        (Some(current), Some(comparison)) => {
            match (current.parse::<f64>(), comparison.parse::<f64>()) {
                (Ok(a), Ok(b)) if a > b => PriceRoles {
                    price: current.to_string(),
                    sales_price: Some(comparison.to_string()),
                },
                (Ok(a), Ok(b)) if a < b => PriceRoles {
                    price: comparison.to_string(),
                    sales_price: Some(current.to_string()),
                },
                _ => PriceRoles {
                    price: current.to_string(),
                    sales_price: None,
                },
            }
        }
        (Some(price), None) | (None, Some(price)) => PriceRoles {
            price: price.to_string(),
            sales_price: None,
        },
        (None, None) => PriceRoles {
            price: NOT_AVAILABLE.to_string(),
            sales_price: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_strips_currency_and_separators() {
        assert_eq!(format_price("1,234 EGP", PriceMode::Integer), "1234");
        assert_eq!(format_price("  12,500,000 تومان ", PriceMode::Integer), "12500000");
    }

    #[test]
    fn test_format_price_not_available() {
        assert_eq!(format_price("free", PriceMode::Integer), NOT_AVAILABLE);
        assert_eq!(format_price("", PriceMode::Integer), NOT_AVAILABLE);
        assert_eq!(format_price("call us", PriceMode::Float), NOT_AVAILABLE);
    }

    #[test]
    fn test_format_price_persian_digits() {
        assert_eq!(format_price("۱,۲۳۴ تومان", PriceMode::Integer), "1234");
        assert_eq!(format_price("٤٥٠", PriceMode::Integer), "450");
    }

    #[test]
    fn test_format_price_float_mode() {
        assert_eq!(format_price("$1,234.50", PriceMode::Float), "1234.5");
        assert_eq!(format_price("99", PriceMode::Float), "99");
        // The decimal point is noise in integer mode
        assert_eq!(format_price("12.50", PriceMode::Integer), "1250");
    }

    #[test]
    fn test_resolve_discount() {
        let roles = resolve_prices(Some("100"), Some("150"));
        assert_eq!(roles.price, "150");
        assert_eq!(roles.sales_price.as_deref(), Some("100"));

        let roles = resolve_prices(Some("150"), Some("100"));
        assert_eq!(roles.price, "150");
        assert_eq!(roles.sales_price.as_deref(), Some("100"));
    }

    #[test]
    fn test_resolve_no_discount() {
        assert_eq!(resolve_prices(Some("100"), Some("100")).sales_price, None);
        assert_eq!(resolve_prices(Some("100"), None).sales_price, None);
        assert_eq!(resolve_prices(Some("100"), Some(NOT_AVAILABLE)).price, "100");
    }

    #[test]
    fn test_resolve_missing_current() {
        let roles = resolve_prices(Some(NOT_AVAILABLE), Some("150"));
        assert_eq!(roles.price, "150");
        assert_eq!(roles.sales_price, None);

        let roles = resolve_prices(None, None);
        assert_eq!(roles.price, NOT_AVAILABLE);
    }
}

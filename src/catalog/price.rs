use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    #[error("price must be a number")]
    NotANumber,
    #[error("price cannot be negative")]
    Negative,
}

/// Parse a price from a JSON number or a form string. Strings may use a
/// decimal comma; an empty string is zero.
pub fn parse_price(value: &Value) -> Result<Decimal, PriceError> {
    let price = match value {
        // go through the textual form so 19.99 stays exactly 19.99
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .map_err(|_| PriceError::NotANumber)?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Decimal::ZERO
            } else {
                Decimal::from_str(&s.replacen(',', ".", 1)).map_err(|_| PriceError::NotANumber)?
            }
        }
        _ => return Err(PriceError::NotANumber),
    };

    if price.is_sign_negative() && !price.is_zero() {
        return Err(PriceError::Negative);
    }
    Ok(price.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_numbers_exactly() {
        assert_eq!(parse_price(&json!(19.99)).unwrap(), Decimal::new(1999, 2));
        assert_eq!(parse_price(&json!(5)).unwrap(), Decimal::new(5, 0));
    }

    #[test]
    fn parses_form_strings_with_decimal_comma() {
        assert_eq!(parse_price(&json!("12,50")).unwrap(), Decimal::new(1250, 2));
        assert_eq!(parse_price(&json!(" 7.25 ")).unwrap(), Decimal::new(725, 2));
        assert_eq!(parse_price(&json!("")).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn rejects_garbage_and_negatives() {
        assert_eq!(parse_price(&json!("abc")), Err(PriceError::NotANumber));
        assert_eq!(parse_price(&json!(null)), Err(PriceError::NotANumber));
        assert_eq!(parse_price(&json!(true)), Err(PriceError::NotANumber));
        assert_eq!(parse_price(&json!(-1)), Err(PriceError::Negative));
    }
}

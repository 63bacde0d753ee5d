//! Recognition of name-or-literal tokens (`ast::Expr`).

use crate::error::{Error, Result};

/// A token is literal if it begins with `-`, an ASCII digit, or a single
/// quote (the quoted single-character form, e.g. `'A'`). Anything else is a
/// variable name.
pub(crate) fn is_literal_token(token: &str) -> bool {
    match token.as_bytes().first() {
        Some(b'-' | b'\'') => true,
        Some(b) => b.is_ascii_digit(),
        None => false,
    }
}

/// Parse a literal token into its 16-bit value, range-checking it.
pub(crate) fn parse_literal(token: &str) -> Result<i16> {
    let value: i32 = if let Some(rest) = token.strip_prefix('\'') {
        let ch = rest
            .chars()
            .next()
            .ok_or_else(|| Error::Internal(format!("empty character literal: {token:?}")))?;
        i32::from(ch as u32)
    } else {
        token
            .parse()
            .map_err(|_| Error::Internal(format!("invalid integer literal: {token:?}")))?
    };
    check_constant_in_range(value)
}

/// Range-check a constant to `[-32768, 32767]`.
pub(crate) fn check_constant_in_range(value: i32) -> Result<i16> {
    i16::try_from(value).map_err(|_| Error::ConstantOutOfRange(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_tokens() {
        assert!(is_literal_token("42"));
        assert!(is_literal_token("-7"));
        assert!(is_literal_token("'A'"));
        assert!(!is_literal_token("Xin"));
        assert!(!is_literal_token("$scratch"));
    }

    #[test]
    fn parses_decimal_and_character_literals() {
        assert_eq!(parse_literal("42").unwrap(), 42);
        assert_eq!(parse_literal("-42").unwrap(), -42);
        assert_eq!(parse_literal("'A'").unwrap(), 65);
    }

    #[test]
    fn boundary_values_are_accepted() {
        assert_eq!(parse_literal("-32768").unwrap(), -32768);
        assert_eq!(parse_literal("32767").unwrap(), 32767);
    }

    #[test]
    fn out_of_range_is_fatal() {
        assert!(matches!(
            parse_literal("32768"),
            Err(Error::ConstantOutOfRange(32768))
        ));
        assert!(matches!(
            parse_literal("-32769"),
            Err(Error::ConstantOutOfRange(-32769))
        ));
    }
}

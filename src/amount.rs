use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Why a transaction amount failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount '{0}' is negative")]
    Negative(String),
    #[error("amount '{0}' is not a plain decimal number")]
    Malformed(String),
    #[error("amount '{0}' has more than {places} significant decimal places", places = Amount::PLACES)]
    TooPrecise(String),
    #[error("amount '{0}' is too large")]
    Overflow(String),
}

/// Non-negative fixed-point decimal with 2 decimal places, stored as a scaled integer.
///
/// `Display` is the canonical form that gets hashed: no sign, no separators,
/// no leading zeros and exactly two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Amount(u64);

impl Amount {
    const SCALE: u64 = 100;
    const PLACES: usize = 2;

    pub fn from_scaled(value: u64) -> Self {
        Amount(value)
    }

    pub fn scaled(&self) -> u64 {
        self.0
    }

    /// Convert a float as received from a numeric JSON field.
    ///
    /// Goes through the shortest decimal representation of the float so
    /// that `1000.5` becomes `1000.50` and not a binary approximation.
    pub fn from_float(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::Malformed(value.to_string()));
        }
        value.to_string().parse()
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }
        if trimmed.starts_with('-') {
            return Err(AmountError::Negative(trimmed.to_string()));
        }
        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);

        let (whole, frac) = match unsigned.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (unsigned, ""),
        };
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
            return Err(AmountError::Malformed(trimmed.to_string()));
        }

        // Extra fractional digits are tolerated only when they carry no value
        let (kept, dropped) = frac.split_at(frac.len().min(Self::PLACES));
        if dropped.bytes().any(|b| b != b'0') {
            return Err(AmountError::TooPrecise(trimmed.to_string()));
        }

        let overflow = || AmountError::Overflow(trimmed.to_string());
        let whole: u64 = match whole.trim_start_matches('0') {
            "" => 0,
            digits => digits.parse().map_err(|_| overflow())?,
        };
        let mut cents: u64 = 0;
        for (i, b) in kept.bytes().enumerate() {
            let digit = u64::from(b - b'0');
            cents += digit * 10u64.pow((Self::PLACES - 1 - i) as u32);
        }

        whole
            .checked_mul(Self::SCALE)
            .and_then(|v| v.checked_add(cents))
            .map(Amount)
            .ok_or_else(overflow)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / Self::SCALE;
        let frac = self.0 % Self::SCALE;
        write!(f, "{whole}.{frac:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_scaled_preserves_value() {
        let amount = Amount::from_scaled(123456);
        assert_eq!(amount, Amount(123456));
        assert_eq!(amount.scaled(), 123456);
    }

    #[test]
    fn parse_canonical_forms() {
        assert_eq!("500.00".parse(), Ok(Amount::from_scaled(50_000)));
        assert_eq!("500".parse(), Ok(Amount::from_scaled(50_000)));
        assert_eq!("500.5".parse(), Ok(Amount::from_scaled(50_050)));
        assert_eq!("0.01".parse(), Ok(Amount::from_scaled(1)));
        assert_eq!(".5".parse(), Ok(Amount::from_scaled(50)));
        assert_eq!("7.".parse(), Ok(Amount::from_scaled(700)));
    }

    #[test]
    fn parse_tolerates_equivalent_spellings() {
        let expected = Amount::from_scaled(50_000);
        assert_eq!(" 500.00 ".parse(), Ok(expected));
        assert_eq!("+500".parse(), Ok(expected));
        assert_eq!("000500.0".parse(), Ok(expected));
        assert_eq!("500.0000".parse(), Ok(expected));
    }

    #[test]
    fn parse_zero() {
        assert_eq!("0".parse(), Ok(Amount::default()));
        assert_eq!("0.00".parse(), Ok(Amount::default()));
        assert_eq!("000".parse(), Ok(Amount::default()));
    }

    #[test]
    fn parse_rejects_negative() {
        assert_eq!(
            "-1.00".parse::<Amount>(),
            Err(AmountError::Negative("-1.00".to_string()))
        );
        assert!(matches!("-0".parse::<Amount>(), Err(AmountError::Negative(_))));
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!("".parse::<Amount>(), Err(AmountError::Empty));
        assert_eq!("   ".parse::<Amount>(), Err(AmountError::Empty));
    }

    #[test]
    fn parse_rejects_malformed() {
        for input in ["1,000.00", "abc", "1.2.3", ".", "1e3", "12 34", "+", "++1", "0x10"] {
            assert!(
                matches!(input.parse::<Amount>(), Err(AmountError::Malformed(_))),
                "{input} should be malformed"
            );
        }
    }

    #[test]
    fn parse_rejects_sub_cent_precision() {
        assert!(matches!(
            "500.005".parse::<Amount>(),
            Err(AmountError::TooPrecise(_))
        ));
        assert!(matches!(
            "0.0001".parse::<Amount>(),
            Err(AmountError::TooPrecise(_))
        ));
    }

    #[test]
    fn parse_rejects_overflow() {
        assert!(matches!(
            "184467440737095517".parse::<Amount>(),
            Err(AmountError::Overflow(_))
        ));
        assert!(matches!(
            "99999999999999999999999".parse::<Amount>(),
            Err(AmountError::Overflow(_))
        ));
    }

    #[test]
    fn from_float_uses_shortest_decimal() {
        assert_eq!(Amount::from_float(1000.5), Ok(Amount::from_scaled(100_050)));
        assert_eq!(Amount::from_float(0.1), Ok(Amount::from_scaled(10)));
        assert_eq!(Amount::from_float(42.0), Ok(Amount::from_scaled(4_200)));
    }

    #[test]
    fn from_float_rejects_bad_values() {
        assert!(matches!(Amount::from_float(-2.5), Err(AmountError::Negative(_))));
        assert!(matches!(Amount::from_float(f64::NAN), Err(AmountError::Malformed(_))));
        assert!(matches!(
            Amount::from_float(0.001),
            Err(AmountError::TooPrecise(_))
        ));
    }

    #[test]
    fn display_is_canonical() {
        assert_eq!(Amount::from_scaled(50_000).to_string(), "500.00");
        assert_eq!(Amount::from_scaled(50).to_string(), "0.50");
        assert_eq!(Amount::from_scaled(1).to_string(), "0.01");
        assert_eq!(Amount::from_scaled(0).to_string(), "0.00");
    }

    #[test]
    fn ordering() {
        let small = Amount::from_scaled(100);
        let large = Amount::from_scaled(200);
        assert!(small < large);
    }
}

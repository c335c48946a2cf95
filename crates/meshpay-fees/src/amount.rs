//! Exact decimal arithmetic for ledger amounts and fee rates.
//!
//! Ledgers express balances as decimal strings with a fixed number of
//! fractional digits (their *scale*). Reproducing their rounding to the
//! last representable unit rules out binary floating point, so amounts
//! are `i128` mantissas at a fixed working scale of 12 fractional
//! digits and rates are parts-per-million mantissas. All fee arithmetic
//! stays in integers; the only rounding is the explicit truncation,
//! floor, and ceiling steps the quoting protocol prescribes.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use crate::error::{FeeError, Result};

/// Fractional digits of the internal working representation.
pub const WORKING_SCALE: u32 = 12;

/// Finest ledger scale the model supports.
pub const MAX_SCALE: u32 = WORKING_SCALE;

const SCALING: i128 = 1_000_000_000_000;

const RATE_ONE: u32 = 1_000_000;

fn pow10(exp: u32) -> i128 {
    10i128.pow(exp)
}

/// A decimal amount with exact fractional fidelity.
///
/// Fixed point: `i128` mantissa, [`WORKING_SCALE`] fractional digits.
/// Comparisons are numeric, so `"4.9800"` and `"4.98"` parse equal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// One whole unit of a ledger with the given scale, e.g. `0.01`
    /// for scale 2.
    pub fn unit(scale: u32) -> Amount {
        Amount(pow10(WORKING_SCALE - scale))
    }

    /// `count` units of the given scale, e.g. `from_units(499, 2)` is
    /// `4.99`.
    pub fn from_units(count: i64, scale: u32) -> Amount {
        Amount(count as i128 * pow10(WORKING_SCALE - scale))
    }

    /// Raw mantissa at [`WORKING_SCALE`].
    pub fn mantissa(self) -> i128 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Round down to the given scale (toward negative infinity).
    pub fn floor_to_scale(self, scale: u32) -> Amount {
        let unit = pow10(WORKING_SCALE - scale);
        Amount(self.0.div_euclid(unit) * unit)
    }

    /// Round up to the given scale (toward positive infinity).
    pub fn ceil_to_scale(self, scale: u32) -> Amount {
        let unit = pow10(WORKING_SCALE - scale);
        Amount(-(-self.0).div_euclid(unit) * unit)
    }

    /// Multiply by a rate, truncating toward zero at the working scale.
    pub fn mul_rate(self, rate: Rate) -> Amount {
        Amount(self.0 * rate.0 as i128 / RATE_ONE as i128)
    }

    /// Divide by a rate, rounding any remainder up.
    ///
    /// Used only for reverse quoting, where every rounding step must
    /// favor the destination. The rate must be non-zero.
    pub fn div_rate_ceil(self, rate: Rate) -> Amount {
        debug_assert!(rate.0 > 0, "division by zero rate");
        let numer = self.0 * RATE_ONE as i128;
        let quot = numer.div_euclid(rate.0 as i128);
        if numer.rem_euclid(rate.0 as i128) != 0 {
            Amount(quot + 1)
        } else {
            Amount(quot)
        }
    }
}

impl Add for Amount {
    type Output = Amount;
    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;
    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        self.0 -= rhs.0;
    }
}

impl FromStr for Amount {
    type Err = FeeError;

    fn from_str(input: &str) -> Result<Amount> {
        let (negative, digits) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        let malformed = || FeeError::ParseAmount(input.to_string());
        if int_part.is_empty()
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }
        if digits.contains('.') && frac_part.is_empty() {
            return Err(malformed());
        }
        if frac_part.len() > WORKING_SCALE as usize {
            return Err(FeeError::TooPrecise(input.to_string(), WORKING_SCALE));
        }
        let int_value: i128 = int_part.parse().map_err(|_| malformed())?;
        let mut frac_value: i128 = 0;
        if !frac_part.is_empty() {
            frac_value = frac_part.parse().map_err(|_| malformed())?;
            frac_value *= pow10(WORKING_SCALE - frac_part.len() as u32);
        }
        let mantissa = int_value
            .checked_mul(SCALING)
            .and_then(|v| v.checked_add(frac_value))
            .ok_or_else(malformed)?;
        Ok(Amount(if negative { -mantissa } else { mantissa }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let int_part = magnitude / SCALING as u128;
        let frac_part = magnitude % SCALING as u128;
        if self.0 < 0 {
            write!(f, "-")?;
        }
        if frac_part == 0 {
            write!(f, "{int_part}")
        } else {
            let frac = format!("{frac_part:012}");
            write!(f, "{int_part}.{}", frac.trim_end_matches('0'))
        }
    }
}

/// A fractional rate in `[0, 1]`, parts-per-million.
///
/// Spread and slippage configurations are restricted to `[0, 1)`; the
/// value `1` only arises internally as the complement of a zero rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rate(u32);

impl Rate {
    pub const ZERO: Rate = Rate(0);
    pub const ONE: Rate = Rate(RATE_ONE);

    /// Build from a parts-per-million mantissa.
    pub fn from_ppm(ppm: u32) -> Result<Rate> {
        if ppm > RATE_ONE {
            return Err(FeeError::RateOutOfRange(format!("{ppm} ppm")));
        }
        Ok(Rate(ppm))
    }

    pub fn ppm(self) -> u32 {
        self.0
    }

    /// `1 - self`.
    pub fn complement(self) -> Rate {
        Rate(RATE_ONE - self.0)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl FromStr for Rate {
    type Err = FeeError;

    fn from_str(input: &str) -> Result<Rate> {
        let malformed = || FeeError::ParseRate(input.to_string());
        let (int_part, frac_part) = match input.split_once('.') {
            Some((i, f)) => (i, f),
            None => (input, ""),
        };
        if int_part.is_empty()
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
            || (input.contains('.') && frac_part.is_empty())
        {
            return Err(malformed());
        }
        // Rates finer than ppm are not representable; reject rather
        // than silently truncate, unless the extra digits are zeros.
        let (kept, rest) = frac_part.split_at(frac_part.len().min(6));
        if rest.bytes().any(|b| b != b'0') {
            return Err(malformed());
        }
        let int_value: u32 = int_part.parse().map_err(|_| malformed())?;
        let mut ppm: u32 = 0;
        if !kept.is_empty() {
            ppm = kept.parse::<u32>().map_err(|_| malformed())?;
            ppm *= 10u32.pow(6 - kept.len() as u32);
        }
        if int_value > 0 || ppm >= RATE_ONE {
            return Err(FeeError::RateOutOfRange(input.to_string()));
        }
        Ok(Rate(ppm))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == RATE_ONE {
            return write!(f, "1");
        }
        if self.0 == 0 {
            return write!(f, "0");
        }
        let frac = format!("{:06}", self.0);
        write!(f, "0.{}", frac.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(s: &str) -> Amount {
        s.parse().unwrap()
    }

    fn rate(s: &str) -> Rate {
        s.parse().unwrap()
    }

    #[test]
    fn parse_and_render_round_trip() {
        for s in ["0", "5", "4.9999", "104.98", "0.000000000001", "1004.9899"] {
            assert_eq!(amt(s).to_string(), s);
        }
        assert_eq!(amt("-11.39").to_string(), "-11.39");
        assert_eq!(amt("4.9800"), amt("4.98"));
        assert_eq!(amt("4.9800").to_string(), "4.98");
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for s in ["", ".", "4.", ".5", "4.9.9", "4,99", "abc", "- 1"] {
            assert!(s.parse::<Amount>().is_err(), "{s:?} should not parse");
        }
        assert_eq!(
            "0.1234567890123".parse::<Amount>(),
            Err(FeeError::TooPrecise("0.1234567890123".into(), 12))
        );
    }

    #[test]
    fn floor_and_ceil_to_scale() {
        assert_eq!(amt("4.9851").floor_to_scale(2), amt("4.98"));
        assert_eq!(amt("4.98").floor_to_scale(2), amt("4.98"));
        assert_eq!(amt("11.389781088408").ceil_to_scale(2), amt("11.39"));
        assert_eq!(amt("11.39").ceil_to_scale(2), amt("11.39"));
        assert_eq!(amt("-4.981").floor_to_scale(2), amt("-4.99"));
        assert_eq!(amt("-4.981").ceil_to_scale(2), amt("-4.98"));
    }

    #[test]
    fn mul_rate_truncates_at_working_scale() {
        // 4.9999 * 0.998 = 4.9899002 exactly
        assert_eq!(amt("4.9999").mul_rate(rate("0.002").complement()), amt("4.9899002"));
        // the exact-boundary case: 5 * 0.998 = 4.99, no drift
        assert_eq!(amt("5").mul_rate(rate("0.002").complement()), amt("4.99"));
        assert_eq!(amt("5").mul_rate(Rate::ONE), amt("5"));
        assert_eq!(amt("5").mul_rate(Rate::ZERO), Amount::ZERO);
    }

    #[test]
    fn div_rate_rounds_up() {
        // 10 / 0.877980 = 11.38978108840...
        let required = amt("10").div_rate_ceil(rate("0.122020").complement());
        assert_eq!(required.ceil_to_scale(2), amt("11.39"));
        // exact division leaves no remainder to round
        assert_eq!(amt("4.99").div_rate_ceil(Rate::ONE), amt("4.99"));
    }

    #[test]
    fn rate_parsing() {
        assert_eq!(rate("0.002").ppm(), 2_000);
        assert_eq!(rate("0.122020").ppm(), 122_020);
        assert_eq!(rate("0").ppm(), 0);
        assert_eq!(rate("0.5").complement(), rate("0.5"));
        assert_eq!(rate("0.0020000").ppm(), 2_000);
        assert!("1".parse::<Rate>().is_err());
        assert!("1.5".parse::<Rate>().is_err());
        assert!("0.0000001".parse::<Rate>().is_err());
        assert!("0.1,2".parse::<Rate>().is_err());
    }

    #[test]
    fn rate_display() {
        assert_eq!(rate("0.002").to_string(), "0.002");
        assert_eq!(rate("0.122020").to_string(), "0.12202");
        assert_eq!(Rate::ZERO.to_string(), "0");
        assert_eq!(Rate::ZERO.complement().to_string(), "1");
    }

    #[test]
    fn unit_is_one_ledger_step() {
        assert_eq!(Amount::unit(2), amt("0.01"));
        assert_eq!(Amount::unit(4), amt("0.0001"));
        assert_eq!(Amount::unit(12), amt("0.000000000001"));
    }
}

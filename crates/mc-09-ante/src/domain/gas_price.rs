//! Minimum gas prices as fixed-point integers.
//!
//! A price such as `0.025stake` is held as `25 * 10^15` atto-units per gas
//! so the required fee is computed with integer arithmetic only.

use shared_types::{validate_denom, Coin, Coins, CoinsError};
use std::fmt;
use std::str::FromStr;

/// Decimal places of a gas price.
pub const PRICE_PRECISION: u32 = 18;
const SCALE: u128 = 10u128.pow(PRICE_PRECISION);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GasPrice {
    pub denom: String,
    /// Price per unit of gas scaled by `10^18`.
    pub scaled_amount: u128,
}

impl GasPrice {
    /// Fee for `gas` units, rounded up.
    pub fn fee_for(&self, gas: u64) -> Option<u128> {
        let total = self.scaled_amount.checked_mul(u128::from(gas))?;
        Some(total.div_ceil(SCALE))
    }
}

impl FromStr for GasPrice {
    type Err = CoinsError;

    /// Parse `"0.025stake"` or `"1stake"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parse_err = || CoinsError::Parse(s.to_string());
        let split = s
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .ok_or_else(parse_err)?;
        let (number, denom) = s.split_at(split);
        validate_denom(denom)?;
        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() || fraction.len() > PRICE_PRECISION as usize {
            return Err(parse_err());
        }
        let whole: u128 = whole.parse().map_err(|_| parse_err())?;
        let fraction_scaled: u128 = if fraction.is_empty() {
            0
        } else {
            let digits: u128 = fraction.parse().map_err(|_| parse_err())?;
            digits * 10u128.pow(PRICE_PRECISION - fraction.len() as u32)
        };
        let scaled_amount = whole
            .checked_mul(SCALE)
            .and_then(|w| w.checked_add(fraction_scaled))
            .ok_or_else(|| CoinsError::Overflow(denom.to_string()))?;
        Ok(Self {
            denom: denom.to_string(),
            scaled_amount,
        })
    }
}

impl fmt::Display for GasPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.scaled_amount / SCALE;
        let fraction = self.scaled_amount % SCALE;
        if fraction == 0 {
            write!(f, "{whole}{}", self.denom)
        } else {
            let digits = format!("{fraction:018}");
            write!(f, "{whole}.{}{}", digits.trim_end_matches('0'), self.denom)
        }
    }
}

/// A set of minimum gas prices, sorted by denom.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GasPrices(Vec<GasPrice>);

impl GasPrices {
    pub fn iter(&self) -> impl Iterator<Item = &GasPrice> {
        self.0.iter()
    }

    /// True when no price is set or all prices are zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|p| p.scaled_amount == 0)
    }

    /// Fee required for `gas`, one coin per priced denom.
    pub fn required_fees(&self, gas: u64) -> Result<Coins, CoinsError> {
        let mut coins = Vec::with_capacity(self.0.len());
        for price in &self.0 {
            let amount = price
                .fee_for(gas)
                .ok_or_else(|| CoinsError::Overflow(price.denom.clone()))?;
            coins.push(Coin::new(price.denom.clone(), amount));
        }
        Coins::normalize(coins)
    }
}

impl FromStr for GasPrices {
    type Err = CoinsError;

    /// Parse `"0.025stake,1atom"`; an empty string is no minimum.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut prices = s
            .split(',')
            .map(GasPrice::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        prices.sort();
        for pair in prices.windows(2) {
            if pair[0].denom == pair[1].denom {
                return Err(CoinsError::DuplicateDenom(pair[0].denom.clone()));
            }
        }
        Ok(Self(prices))
    }
}

impl fmt::Display for GasPrices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(GasPrice::to_string).collect();
        f.write_str(&parts.join(","))
    }
}

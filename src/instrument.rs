use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    BTC,
    USD,
    ETH,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl FromStr for Asset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BTC" => Ok(Asset::BTC),
            "USD" => Ok(Asset::USD),
            "ETH" => Ok(Asset::ETH),
            other => Err(format!("unsupported asset `{other}`")),
        }
    }
}

/// A trading pair: base/quote, e.g. `BTC-USD`.
///
/// Serialized as its string code on the wire, and only the supported pairs
/// parse back; everything a client names must already exist in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pair {
    /// The asset you buy or sell
    pub base: Asset,
    /// The asset you pay or receive
    pub quote: Asset,
}

pub const BTC_USD: Pair = Pair {
    base: Asset::BTC,
    quote: Asset::USD,
};
pub const ETH_USD: Pair = Pair {
    base: Asset::ETH,
    quote: Asset::USD,
};

/// A decimal price the tick grid cannot represent.
#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    #[error("price {0} is not a positive finite number")]
    NotPositive(f64),
    #[error("price {0} is outside the representable range")]
    OutOfRange(f64),
}

impl Pair {
    /// The usual string code, e.g. "BTC-USD".
    pub fn code(&self) -> String {
        format!("{}-{}", self.base, self.quote)
    }

    /// crypto-USD factory for spot pairs
    pub fn crypto_usd(base: Asset) -> Self {
        Pair {
            base,
            quote: Asset::USD,
        }
    }

    pub fn supported() -> &'static [Pair] {
        &[BTC_USD, ETH_USD]
    }

    /// Ticks per quote unit. A scale of 100 means a tick size of 0.01, so
    /// `123.45` becomes `12345` ticks. Prices live on this grid everywhere
    /// inside the engine; only the boundary sees decimals.
    pub fn price_scale(&self) -> u64 {
        match self.base {
            Asset::BTC => 100,
            Asset::ETH => 100,
            Asset::USD => 100,
        }
    }

    /// Normalize a decimal price onto the tick grid, rounding to the
    /// nearest tick. Non-finite, non-positive, and overflowing inputs are
    /// rejected rather than folded onto the grid.
    pub fn price_to_ticks(&self, price: f64) -> Result<u64, PriceError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(PriceError::NotPositive(price));
        }
        let ticks = (price * self.price_scale() as f64).round();
        if ticks < 1.0 || ticks >= u64::MAX as f64 {
            return Err(PriceError::OutOfRange(price));
        }
        Ok(ticks as u64)
    }

    pub fn ticks_to_price(&self, ticks: u64) -> f64 {
        ticks as f64 / self.price_scale() as f64
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.quote)
    }
}

impl FromStr for Pair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pair::supported()
            .iter()
            .find(|p| p.code() == s)
            .cloned()
            .ok_or_else(|| format!("unsupported pair `{s}`"))
    }
}

impl TryFrom<String> for Pair {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Pair> for String {
    fn from(pair: Pair) -> Self {
        pair.code()
    }
}

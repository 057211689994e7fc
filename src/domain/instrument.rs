//! Instrument naming and pip conversion.

/// A single currency pair, e.g. "EUR_USD".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instrument {
    name: String,
}

impl Instrument {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Multiplier converting a raw price delta to pips.
    ///
    /// 100 for JPY-quoted pairs, 10000 for everything else.
    pub fn pip_factor(&self) -> i64 {
        if self.name.ends_with("_JPY") {
            100
        } else {
            10000
        }
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Convert a raw price delta to pips, rounded to 1 decimal place.
pub fn price_to_pip(price: f64, pip_factor: i64) -> f64 {
    let pips = price * pip_factor as f64;
    (pips * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpy_pairs_use_100() {
        assert_eq!(Instrument::new("USD_JPY").pip_factor(), 100);
        assert_eq!(Instrument::new("EUR_JPY").pip_factor(), 100);
    }

    #[test]
    fn other_pairs_use_10000() {
        assert_eq!(Instrument::new("EUR_USD").pip_factor(), 10000);
        assert_eq!(Instrument::new("GBP_USD").pip_factor(), 10000);
        assert_eq!(Instrument::new("USD_CHF").pip_factor(), 10000);
    }

    #[test]
    fn price_to_pip_rounds_to_one_decimal() {
        assert_eq!(price_to_pip(0.00607, 10000), 60.7);
        assert_eq!(price_to_pip(0.000449, 10000), 4.5);
        assert_eq!(price_to_pip(-0.00123, 10000), -12.3);
        assert_eq!(price_to_pip(0.123, 100), 12.3);
    }

    #[test]
    fn price_to_pip_zero() {
        assert_eq!(price_to_pip(0.0, 10000), 0.0);
    }

    #[test]
    fn display_is_pair_name() {
        assert_eq!(Instrument::new("EUR_USD").to_string(), "EUR_USD");
    }
}

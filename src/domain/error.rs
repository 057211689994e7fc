//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for pairtrader.
#[derive(Debug, thiserror::Error)]
pub enum PairtraderError {
    #[error("malformed candle{}: {reason}", date_suffix(.date))]
    MalformedCandle {
        date: Option<NaiveDate>,
        reason: String,
    },

    #[error("invalid position-sizing policy: {name}")]
    InvalidPolicy { name: String },

    #[error("degenerate market data on {date}: non-positive exit price {price}")]
    DegenerateMarketData { date: NaiveDate, price: f64 },

    #[error("insufficient data: {rows} rows split into {train} train / {test} test")]
    InsufficientData {
        rows: usize,
        train: usize,
        test: usize,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("model error: {reason}")]
    Model { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn date_suffix(date: &Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!(" on {d}"),
        None => String::new(),
    }
}

impl From<&PairtraderError> for std::process::ExitCode {
    fn from(err: &PairtraderError) -> Self {
        let code: u8 = match err {
            PairtraderError::Io(_) => 1,
            PairtraderError::ConfigParse { .. }
            | PairtraderError::ConfigMissing { .. }
            | PairtraderError::ConfigInvalid { .. } => 2,
            PairtraderError::Data { .. } | PairtraderError::MalformedCandle { .. } => 3,
            PairtraderError::InvalidPolicy { .. } | PairtraderError::Model { .. } => 4,
            PairtraderError::InsufficientData { .. }
            | PairtraderError::DegenerateMarketData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_candle_message_with_date() {
        let err = PairtraderError::MalformedCandle {
            date: NaiveDate::from_ymd_opt(2024, 1, 15),
            reason: "high_bid below low_bid".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2024-01-15"));
        assert!(msg.contains("high_bid below low_bid"));
    }

    #[test]
    fn malformed_candle_message_without_date() {
        let err = PairtraderError::MalformedCandle {
            date: None,
            reason: "short row".into(),
        };
        assert_eq!(err.to_string(), "malformed candle: short row");
    }

    #[test]
    fn insufficient_data_message() {
        let err = PairtraderError::InsufficientData {
            rows: 10,
            train: 10,
            test: 0,
        };
        assert!(err.to_string().contains("10 train / 0 test"));
    }

    #[test]
    fn exit_codes_are_stable() {
        let io: std::process::ExitCode = (&PairtraderError::Io(std::io::Error::other("x"))).into();
        assert_eq!(
            format!("{io:?}"),
            format!("{:?}", std::process::ExitCode::from(1))
        );

        let config: std::process::ExitCode = (&PairtraderError::ConfigMissing {
            section: "data".into(),
            key: "store".into(),
        })
            .into();
        assert_eq!(
            format!("{config:?}"),
            format!("{:?}", std::process::ExitCode::from(2))
        );
    }
}

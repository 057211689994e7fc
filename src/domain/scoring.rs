//! Strategy fitness scoring.

/// Fraction of simulated days with a strictly positive cumulative
/// balance.
///
/// Always in [0, 1]; an empty balance scores 0. The magnitude of gains
/// and losses does not enter the score.
pub fn score(balance: &[f64]) -> f64 {
    if balance.is_empty() {
        return 0.0;
    }
    let positive = balance.iter().filter(|&&b| b > 0.0).count();
    positive as f64 / balance.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn known_balance_scores_eleven_seventeenths() {
        let balance = [
            0.0, 4.5, 8.0, -19.0, -8.0, 4.0, 5.0, -1.0, 4.0, 5.0, 33.0, 2.0, 0.0, 0.0, 3.0, 3.0,
            3.0,
        ];
        assert_relative_eq!(score(&balance), 11.0 / 17.0);
    }

    #[test]
    fn all_positive_scores_one() {
        assert_eq!(score(&[1.0, 0.5, 2.0]), 1.0);
    }

    #[test]
    fn all_non_positive_scores_zero() {
        assert_eq!(score(&[0.0, -1.0, -0.5]), 0.0);
    }

    #[test]
    fn empty_balance_scores_zero() {
        assert_eq!(score(&[]), 0.0);
    }

    #[test]
    fn zero_days_do_not_count_as_positive() {
        assert_eq!(score(&[0.0, 0.0]), 0.0);
    }

    proptest! {
        #[test]
        fn score_is_bounded(balance in proptest::collection::vec(-1e6f64..1e6, 1..200)) {
            let s = score(&balance);
            prop_assert!((0.0..=1.0).contains(&s));
        }
    }
}

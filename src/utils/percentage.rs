use std::{fmt::Display, ops::Deref};

use chrono::Duration;

/// Share of a whole, used for the labels of the report chart.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || value.is_nan() {
            None
        } else {
            Some(Percentage(value))
        }
    }

    pub fn zero() -> Percentage {
        Percentage(0.)
    }

    /// Fraction of a full circle, `0.0..=1.0`.
    pub fn as_fraction(&self) -> f64 {
        self.0 / 100.
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Percentage of `value` in `whole`. An empty whole yields zero instead of NaN.
pub fn duration_percentage(value: Duration, whole: Duration) -> Percentage {
    if whole.num_seconds() <= 0 {
        return Percentage::zero();
    }
    Percentage::new_opt(value.num_seconds() as f64 / whole.num_seconds() as f64 * 100.)
        .unwrap_or_else(Percentage::zero)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::{duration_percentage, Percentage};

    #[test]
    fn test_duration_percentage_quarter() {
        let value = duration_percentage(Duration::minutes(15), Duration::hours(1));
        assert_eq!(*value, 25.);
        assert_eq!(value.to_string(), "25.0%");
    }

    #[test]
    fn test_duration_percentage_empty_whole() {
        assert_eq!(
            duration_percentage(Duration::zero(), Duration::zero()),
            Percentage::zero()
        );
    }

    #[test]
    fn test_negative_percentage_rejected() {
        assert!(Percentage::new_opt(-1.).is_none());
    }
}

use crate::{Error, Minutes, Result};

use serde::{Deserialize, Serialize};

/// Piecewise-constant inverse CDF mapping a uniform draw onto one of three durations.
///
/// A draw `u` maps to:
///
/// * `values[0]` when `u < lower`,
/// * `values[1]` when `lower <= u <= upper`,
/// * `values[2]` when `u > upper`.
///
/// Note the asymmetry: both edges of the middle band are inclusive. The default table uses the bands
/// `[0, 0.2)`, `[0.2, 0.6]`, `(0.6, 1)` with outputs of 1, 2 and 3 minutes, shared by interarrival and both service
/// times.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationTable {
    lower: f64,
    upper: f64,
    values: [Minutes; 3],
}

impl DurationTable {
    /// Build a table from its two band edges and three outputs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] unless `0 <= lower <= upper <= 1`.
    pub fn new(lower: f64, upper: f64, values: [Minutes; 3]) -> Result<Self> {
        let table = Self { lower, upper, values };
        table.validate()?;
        Ok(table)
    }

    /// Check the band edges. Tables arriving through deserialization skip [`new()`], so configuration validation
    /// calls this directly.
    ///
    /// [`new()`]: DurationTable::new
    pub fn validate(&self) -> Result {
        let ordered = 0.0 <= self.lower && self.lower <= self.upper && self.upper <= 1.0;
        if ordered {
            Ok(())
        } else {
            Err(Error::invalid_argument(format!(
                "duration bands must satisfy 0 <= lower <= upper <= 1, got lower {} and upper {}",
                self.lower, self.upper
            )))
        }
    }

    /// Resolve a draw to its duration.
    pub fn sample(&self, draw: f64) -> Minutes {
        if draw < self.lower {
            self.values[0]
        } else if draw <= self.upper {
            self.values[1]
        } else {
            self.values[2]
        }
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn values(&self) -> [Minutes; 3] {
        self.values
    }
}

impl Default for DurationTable {
    fn default() -> Self {
        Self {
            lower: 0.2,
            upper: 0.6,
            values: [1, 2, 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_band_edges() {
        let table = DurationTable::default();
        assert_eq!(1, table.sample(0.0));
        assert_eq!(1, table.sample(0.1999));
        assert_eq!(2, table.sample(0.2));
        assert_eq!(2, table.sample(0.6));
        assert_eq!(3, table.sample(0.6001));
        assert_eq!(3, table.sample(0.9999));
    }

    #[test]
    fn custom_values_are_used() {
        let table = DurationTable::new(0.2, 0.6, [0, 1, 2]).unwrap();
        assert_eq!(0, table.sample(0.1));
        assert_eq!(1, table.sample(0.4));
        assert_eq!(2, table.sample(0.7));
    }

    #[test]
    fn misordered_bands_are_rejected() {
        assert!(matches!(
            DurationTable::new(0.7, 0.3, [1, 2, 3]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            DurationTable::new(-0.1, 0.3, [1, 2, 3]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            DurationTable::new(0.1, f64::NAN, [1, 2, 3]),
            Err(Error::InvalidArgument(_))
        ));
    }
}

use crate::{ArrivalModel, DurationTable, Error, Result};

use serde::{Deserialize, Serialize};

/// Everything a caller chooses about a batch of trials.
///
/// Missing fields take their defaults when deserializing, so a configuration file only needs to name what it changes:
///
/// ```
/// use tandem_queue::SimConfig;
///
/// let config: SimConfig = serde_json::from_str(r#"{ "trial_count": 25, "balk_threshold": 0.33 }"#).unwrap();
/// assert_eq!(25, config.trial_count);
/// assert_eq!(10, config.customer_count);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of independent trials, at least 1.
    pub trial_count: usize,
    /// Customers per trial, at least 2.
    pub customer_count: usize,
    /// Balk draws at or below this value skip station 2. Must lie in `[0, 1]`.
    pub balk_threshold: f64,
    /// When false, no customer balks regardless of the threshold.
    pub balking: bool,
    /// Keep every trial's log and statistics in the run report.
    pub verbose: bool,
    pub interarrival: DurationTable,
    pub service1: DurationTable,
    pub service2: DurationTable,
}

impl SimConfig {
    /// Check every field against its domain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] describing the first field found out of range.
    pub fn validate(&self) -> Result {
        if self.trial_count < 1 {
            return Err(Error::invalid_argument("trial count must be at least 1"));
        }
        if self.customer_count < 2 {
            return Err(Error::invalid_argument(format!(
                "customer count must be at least 2, got {}",
                self.customer_count
            )));
        }
        self.arrival_model().map(|_| ())
    }

    /// The arrival model these settings describe.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if a duration table is misordered or the balk threshold is outside `[0, 1]`.
    pub fn arrival_model(&self) -> Result<ArrivalModel> {
        let model = ArrivalModel::default()
            .with_tables(self.interarrival, self.service1, self.service2)?
            .with_balk_threshold(self.balk_threshold)?;
        Ok(if self.balking { model } else { model.without_balking() })
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trial_count: 10,
            customer_count: 10,
            balk_threshold: ArrivalModel::DEFAULT_BALK_THRESHOLD,
            balking: true,
            verbose: true,
            interarrival: DurationTable::default(),
            service1: DurationTable::default(),
            service2: DurationTable::default(),
        }
    }
}

use crate::{CustomerDraws, DurationTable, Error, Minutes, Result};

use serde::Serialize;

/// The resolved random choices for one customer: three durations and the balk decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Durations {
    pub interarrival: Minutes,
    pub service1: Minutes,
    pub service2: Minutes,
    pub balks: bool,
}

/// Complete timing record for one customer passing through both stations.
///
/// A record is immutable once built. It is derived from the customer's own [`Durations`], the clock at the previous
/// arrival, and the begin/end times of its predecessor's service at each station. Nothing else in the predecessor is
/// read, and the predecessor is never modified.
///
/// For every record, `arrival1 <= service1_begin <= service1_end == arrival2`. For a customer that does not balk,
/// `arrival2 <= service2_begin <= service2_end` as well. A balking customer inherits its predecessor's station-2 begin
/// and end unchanged (or 0 and 0 with no predecessor) and records a station-2 wait of 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerRecord {
    sequence_id: usize,
    interarrival_time: Minutes,
    service1_time: Minutes,
    service2_time: Minutes,
    balks: bool,
    arrival1: Minutes,
    service1_begin: Minutes,
    service1_end: Minutes,
    wait1: Minutes,
    arrival2: Minutes,
    service2_begin: Minutes,
    service2_end: Minutes,
    wait2: Minutes,
    total_wait: Minutes,
    time_in_system: Minutes,
    idle_time: Minutes,
}

impl CustomerRecord {
    /// Run the two-station timing recurrence for durations that have already been resolved.
    ///
    /// `clock_at_prior_arrival` is the arrival time of the previous customer, or 0 for the first one. With no
    /// predecessor, every predecessor begin and end time is taken to be 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `sequence_id` is 0, as ids are 1-based, or if any time in the record
    /// would not fit in [`Minutes`].
    pub fn from_durations(
        sequence_id: usize,
        durations: Durations,
        predecessor: Option<&CustomerRecord>,
        clock_at_prior_arrival: Minutes,
    ) -> Result<Self> {
        if sequence_id == 0 {
            return Err(Error::invalid_argument("customer sequence ids start at 1"));
        }

        let (prev_service1_end, prev_service2_begin, prev_service2_end) = predecessor
            .map(|prev| (prev.service1_end, prev.service2_begin, prev.service2_end))
            .unwrap_or((0, 0, 0));

        // station 1
        let arrival1 = add_minutes(clock_at_prior_arrival, durations.interarrival, "arrival time")?;
        let service1_begin = arrival1.max(prev_service1_end);
        let service1_end = add_minutes(service1_begin, durations.service1, "station 1 service end")?;
        let wait1 = service1_begin - arrival1;
        let idle1 = service1_begin - prev_service1_end;

        // station 2
        let arrival2 = service1_end;
        let (service2_begin, service2_end, wait2, departure, idle2) = if durations.balks {
            (prev_service2_begin, prev_service2_end, 0, service1_end, 0)
        } else {
            let begin = arrival2.max(prev_service2_end);
            let end = add_minutes(begin, durations.service2, "station 2 service end")?;
            (begin, end, begin - arrival2, end, begin - prev_service2_end)
        };

        Ok(Self {
            sequence_id,
            interarrival_time: durations.interarrival,
            service1_time: durations.service1,
            service2_time: durations.service2,
            balks: durations.balks,
            arrival1,
            service1_begin,
            service1_end,
            wait1,
            arrival2,
            service2_begin,
            service2_end,
            wait2,
            total_wait: add_minutes(wait1, wait2, "total wait")?,
            time_in_system: departure - arrival1,
            idle_time: add_minutes(idle1, idle2, "idle time")?,
        })
    }

    pub fn sequence_id(&self) -> usize {
        self.sequence_id
    }

    pub fn interarrival_time(&self) -> Minutes {
        self.interarrival_time
    }

    pub fn service1_time(&self) -> Minutes {
        self.service1_time
    }

    /// Drawn for every customer, including those who balk and so never use it.
    pub fn service2_time(&self) -> Minutes {
        self.service2_time
    }

    pub fn balks(&self) -> bool {
        self.balks
    }

    pub fn arrival1(&self) -> Minutes {
        self.arrival1
    }

    pub fn service1_begin(&self) -> Minutes {
        self.service1_begin
    }

    pub fn service1_end(&self) -> Minutes {
        self.service1_end
    }

    pub fn wait1(&self) -> Minutes {
        self.wait1
    }

    pub fn arrival2(&self) -> Minutes {
        self.arrival2
    }

    pub fn service2_begin(&self) -> Minutes {
        self.service2_begin
    }

    pub fn service2_end(&self) -> Minutes {
        self.service2_end
    }

    pub fn wait2(&self) -> Minutes {
        self.wait2
    }

    pub fn total_wait(&self) -> Minutes {
        self.total_wait
    }

    pub fn time_in_system(&self) -> Minutes {
        self.time_in_system
    }

    /// Idle gap before this customer at station 1, plus the gap at station 2 if the customer used it.
    pub fn idle_time(&self) -> Minutes {
        self.idle_time
    }

    /// Time the customer leaves the system: end of station-2 service, or end of station-1 service for a balker.
    pub fn departure(&self) -> Minutes {
        if self.balks {
            self.service1_end
        } else {
            self.service2_end
        }
    }
}

/// `lhs + rhs`, or [`Error::InvalidArgument`] naming `what` if the sum does not fit in [`Minutes`].
pub(crate) fn add_minutes(lhs: Minutes, rhs: Minutes, what: &str) -> Result<Minutes> {
    lhs.checked_add(rhs)
        .ok_or_else(|| Error::invalid_argument(format!("{what} overflows: {lhs} + {rhs} minutes")))
}

/// Turns four uniform draws into a [`CustomerRecord`].
///
/// One model covers both the balking and the non-balking facility. With balking switched off by
/// [`without_balking()`], the balk draw is still consumed but every customer continues to station 2, so a stream of
/// draws lines up with the same customers either way.
///
/// [`without_balking()`]: ArrivalModel::without_balking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrivalModel {
    interarrival: DurationTable,
    service1: DurationTable,
    service2: DurationTable,
    balk_threshold: f64,
    balking: bool,
}

impl ArrivalModel {
    pub const DEFAULT_BALK_THRESHOLD: f64 = 0.5;

    /// Replace the balk threshold on this model. A balk draw `u` balks when `u <= threshold`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `balk_threshold` is outside `[0, 1]`.
    pub fn with_balk_threshold(mut self, balk_threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&balk_threshold) {
            return Err(Error::invalid_argument(format!(
                "balk threshold {balk_threshold} is outside [0, 1]"
            )));
        }
        self.balk_threshold = balk_threshold;
        Ok(self)
    }

    /// Switch balking off: every customer visits both stations.
    pub fn without_balking(mut self) -> Self {
        self.balking = false;
        self
    }

    /// Replace the three duration tables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if any table fails [`DurationTable::validate`], which can happen for a table
    /// that was deserialized rather than built with [`DurationTable::new`].
    pub fn with_tables(
        mut self,
        interarrival: DurationTable,
        service1: DurationTable,
        service2: DurationTable,
    ) -> Result<Self> {
        interarrival.validate()?;
        service1.validate()?;
        service2.validate()?;
        self.interarrival = interarrival;
        self.service1 = service1;
        self.service2 = service2;
        Ok(self)
    }

    /// Resolve four draws to durations and a balk decision.
    pub fn resolve(&self, draws: &CustomerDraws) -> Durations {
        Durations {
            interarrival: self.interarrival.sample(draws.interarrival()),
            service1: self.service1.sample(draws.service1()),
            service2: self.service2.sample(draws.service2()),
            balks: self.balking && draws.balk() <= self.balk_threshold,
        }
    }

    /// Build the record for customer `sequence_id`. This is a pure function of its arguments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `sequence_id` is 0 or a time overflows [`Minutes`].
    pub fn build(
        &self,
        sequence_id: usize,
        draws: CustomerDraws,
        predecessor: Option<&CustomerRecord>,
        clock_at_prior_arrival: Minutes,
    ) -> Result<CustomerRecord> {
        CustomerRecord::from_durations(sequence_id, self.resolve(&draws), predecessor, clock_at_prior_arrival)
    }

    pub fn balking(&self) -> bool {
        self.balking
    }

    pub fn balk_threshold(&self) -> f64 {
        self.balk_threshold
    }
}

impl Default for ArrivalModel {
    fn default() -> Self {
        Self {
            interarrival: DurationTable::default(),
            service1: DurationTable::default(),
            service2: DurationTable::default(),
            balk_threshold: Self::DEFAULT_BALK_THRESHOLD,
            balking: true,
        }
    }
}

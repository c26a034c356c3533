use crate::arrival::add_minutes;
use crate::{CustomerRecord, Error, Minutes, Result};

use serde::{Deserialize, Serialize};

/// Summary statistics for one trial, derived once from its completed log.
///
/// Averages are in minutes and probabilities are fractions in `[0, 1]`. Any ratio whose denominator counts a subset
/// of customers that may legitimately be empty (customers who waited, customers who waited at station 2, ...) falls
/// back to 0 when that subset is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialStatistics {
    /// Station-1 wait averaged over all customers.
    pub average_q1_time: f64,
    /// Station-2 wait summed over non-balking customers, divided by the number of customers who waited anywhere.
    ///
    /// The denominator is kept from the model this crate reproduces. See
    /// [`average_q2_time_per_customer`](Self::average_q2_time_per_customer) for the same sum divided by the
    /// customer count.
    pub average_q2_time: f64,
    /// Station-2 wait summed over non-balking customers, divided by the number of customers.
    pub average_q2_time_per_customer: f64,
    /// Total wait averaged over all customers.
    pub average_waiting_time: f64,
    /// Total wait averaged over customers who waited at either station.
    pub average_wait_time_who_wait: f64,
    /// Station-1 wait averaged over customers who waited at station 1.
    pub average_q1_time_wait: f64,
    /// Station-2 wait averaged over non-balking customers who waited at station 2.
    pub average_q2_time_wait: f64,
    /// Service received at both stations, averaged over all customers.
    pub average_service_time: f64,
    pub average_service1_time: f64,
    /// Station-2 service summed over non-balking customers, divided by the number of customers.
    pub average_service2_time: f64,
    /// Sum of every interarrival time divided by one less than the number of customers.
    pub average_interarrival_time: f64,
    pub average_system_time: f64,
    /// Fraction of customers who waited at either station.
    pub wait_probability: f64,
    pub wait1_probability: f64,
    /// Non-balking customers who waited at station 2, as a fraction of all customers.
    pub wait2_probability: f64,
    /// Summed idle gaps at both servers over twice the makespan of the trial.
    pub idle_probability: f64,
}

#[derive(Debug, Default)]
struct Totals {
    q1_wait: Minutes,
    q2_wait: Minutes,
    total_wait: Minutes,
    service: Minutes,
    service1: Minutes,
    service2: Minutes,
    interarrival: Minutes,
    system: Minutes,
    idle: Minutes,
    makespan: Minutes,
    who_wait: usize,
    who_wait_q1: usize,
    who_wait_q2: usize,
}

impl Totals {
    fn add(&mut self, record: &CustomerRecord) -> Result {
        self.q1_wait = add_minutes(self.q1_wait, record.wait1(), "summed station 1 wait")?;
        self.total_wait = add_minutes(self.total_wait, record.total_wait(), "summed wait")?;
        self.service1 = add_minutes(self.service1, record.service1_time(), "summed station 1 service")?;
        self.service = add_minutes(self.service, record.service1_time(), "summed service")?;
        self.interarrival = add_minutes(self.interarrival, record.interarrival_time(), "summed interarrival")?;
        self.system = add_minutes(self.system, record.time_in_system(), "summed time in system")?;
        self.idle = add_minutes(self.idle, record.idle_time(), "summed idle time")?;
        self.makespan = self.makespan.max(record.departure());

        if !record.balks() {
            self.q2_wait = add_minutes(self.q2_wait, record.wait2(), "summed station 2 wait")?;
            self.service2 = add_minutes(self.service2, record.service2_time(), "summed station 2 service")?;
            self.service = add_minutes(self.service, record.service2_time(), "summed service")?;
            if record.wait2() > 0 {
                self.who_wait_q2 += 1;
            }
        }
        if record.total_wait() > 0 {
            self.who_wait += 1;
        }
        if record.wait1() > 0 {
            self.who_wait_q1 += 1;
        }
        Ok(())
    }
}

/// `numerator / denominator`, or 0 for an empty denominator.
fn ratio_or_zero<N, D>(numerator: N, denominator: D) -> f64
where
    N: Into<Quantity>,
    D: Into<Quantity>,
{
    let denominator = denominator.into().0;
    if denominator == 0.0 {
        0.0
    } else {
        numerator.into().0 / denominator
    }
}

// Minutes and counts both fit exactly in an f64 at the sizes a trial reaches.
struct Quantity(f64);

impl From<Minutes> for Quantity {
    fn from(value: Minutes) -> Self {
        Self(value as f64)
    }
}

impl From<usize> for Quantity {
    fn from(value: usize) -> Self {
        Self(value as f64)
    }
}

impl TrialStatistics {
    /// Summarize a completed log in one pass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] for fewer than 2 records, as the average interarrival time divides by one less
    /// than the number of customers. Returns [`Error::InvalidArgument`] if a summed time does not fit in [`Minutes`].
    pub fn from_records(records: &[CustomerRecord]) -> Result<Self> {
        let n = records.len();
        if n < 2 {
            return Err(Error::invalid_state(format!(
                "average interarrival time needs at least 2 customers, log holds {n}"
            )));
        }

        let mut totals = Totals::default();
        for record in records {
            totals.add(record)?;
        }
        let server_time = add_minutes(totals.makespan, totals.makespan, "server time over both stations")?;

        Ok(Self {
            average_q1_time: ratio_or_zero(totals.q1_wait, n),
            average_q2_time: ratio_or_zero(totals.q2_wait, totals.who_wait),
            average_q2_time_per_customer: ratio_or_zero(totals.q2_wait, n),
            average_waiting_time: ratio_or_zero(totals.total_wait, n),
            average_wait_time_who_wait: ratio_or_zero(totals.total_wait, totals.who_wait),
            average_q1_time_wait: ratio_or_zero(totals.q1_wait, totals.who_wait_q1),
            average_q2_time_wait: ratio_or_zero(totals.q2_wait, totals.who_wait_q2),
            average_service_time: ratio_or_zero(totals.service, n),
            average_service1_time: ratio_or_zero(totals.service1, n),
            average_service2_time: ratio_or_zero(totals.service2, n),
            average_interarrival_time: ratio_or_zero(totals.interarrival, n - 1),
            average_system_time: ratio_or_zero(totals.system, n),
            wait_probability: ratio_or_zero(totals.who_wait, n),
            wait1_probability: ratio_or_zero(totals.who_wait_q1, n),
            wait2_probability: ratio_or_zero(totals.who_wait_q2, n),
            idle_probability: ratio_or_zero(totals.idle, server_time),
        })
    }

    /// Apply `f` to every field pairwise, writing the result back into `self`.
    pub(crate) fn combine_with(&mut self, other: &Self, f: impl Fn(f64, f64) -> f64) {
        self.average_q1_time = f(self.average_q1_time, other.average_q1_time);
        self.average_q2_time = f(self.average_q2_time, other.average_q2_time);
        self.average_q2_time_per_customer = f(self.average_q2_time_per_customer, other.average_q2_time_per_customer);
        self.average_waiting_time = f(self.average_waiting_time, other.average_waiting_time);
        self.average_wait_time_who_wait = f(self.average_wait_time_who_wait, other.average_wait_time_who_wait);
        self.average_q1_time_wait = f(self.average_q1_time_wait, other.average_q1_time_wait);
        self.average_q2_time_wait = f(self.average_q2_time_wait, other.average_q2_time_wait);
        self.average_service_time = f(self.average_service_time, other.average_service_time);
        self.average_service1_time = f(self.average_service1_time, other.average_service1_time);
        self.average_service2_time = f(self.average_service2_time, other.average_service2_time);
        self.average_interarrival_time = f(self.average_interarrival_time, other.average_interarrival_time);
        self.average_system_time = f(self.average_system_time, other.average_system_time);
        self.wait_probability = f(self.wait_probability, other.wait_probability);
        self.wait1_probability = f(self.wait1_probability, other.wait1_probability);
        self.wait2_probability = f(self.wait2_probability, other.wait2_probability);
        self.idle_probability = f(self.idle_probability, other.idle_probability);
    }
}

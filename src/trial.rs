mod statistics;

pub use statistics::TrialStatistics;

use crate::{ArrivalModel, CustomerDraws, CustomerRecord, DrawSource, Error, Minutes, Result};

use serde::Serialize;

/// How many earlier customers were still at each station when a customer arrived.
///
/// `station1` counts prior customers whose station-1 service had not yet ended at the customer's `arrival1`.
/// `station2` counts prior non-balking customers whose station-2 service had not yet ended at the customer's
/// `arrival2`. The count includes the customer in service as well as those waiting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueSizes {
    pub station1: usize,
    pub station2: usize,
}

impl QueueSizes {
    /// Scan `prior` for customers still occupying each station when `arrival` shows up.
    ///
    /// This is a linear scan per arrival, so a full trial costs O(n²). The sizes this model targets stay small
    /// enough that the direct definition is kept as-is.
    pub fn at_arrival(prior: &[CustomerRecord], arrival: &CustomerRecord) -> Self {
        let station1 = prior
            .iter()
            .filter(|earlier| earlier.service1_end() > arrival.arrival1())
            .count();
        let station2 = prior
            .iter()
            .filter(|earlier| !earlier.balks() && earlier.service2_end() > arrival.arrival2())
            .count();
        Self { station1, station2 }
    }
}

/// Ordered log of every customer in one trial, along with the queue sizes each of them found on arrival.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrialLog {
    records: Vec<CustomerRecord>,
    queue_sizes: Vec<QueueSizes>,
}

impl TrialLog {
    fn with_capacity(customer_count: usize) -> Self {
        Self {
            records: Vec::with_capacity(customer_count),
            queue_sizes: Vec::with_capacity(customer_count),
        }
    }

    fn push(&mut self, record: CustomerRecord) {
        let sizes = QueueSizes::at_arrival(&self.records, &record);
        self.records.push(record);
        self.queue_sizes.push(sizes);
    }

    /// Every record in arrival order.
    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by its 1-based sequence id.
    pub fn record(&self, sequence_id: usize) -> Option<&CustomerRecord> {
        sequence_id.checked_sub(1).and_then(|index| self.records.get(index))
    }

    /// Queue sizes found by customer `sequence_id` on arrival.
    pub fn queue_sizes(&self, sequence_id: usize) -> Option<QueueSizes> {
        sequence_id
            .checked_sub(1)
            .and_then(|index| self.queue_sizes.get(index))
            .copied()
    }

    /// Number of customers at station 1 when customer `sequence_id` arrived.
    pub fn queue_size_1(&self, sequence_id: usize) -> Option<usize> {
        self.queue_sizes(sequence_id).map(|sizes| sizes.station1)
    }

    /// Number of customers at station 2 when customer `sequence_id` reached it.
    pub fn queue_size_2(&self, sequence_id: usize) -> Option<usize> {
        self.queue_sizes(sequence_id).map(|sizes| sizes.station2)
    }

    /// Iterate over `(record, queue sizes)` pairs in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&CustomerRecord, QueueSizes)> + '_ {
        self.records.iter().zip(self.queue_sizes.iter().copied())
    }
}

/// One completed trial: the customer log and the statistics derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trial {
    log: TrialLog,
    statistics: TrialStatistics,
}

impl Trial {
    pub fn log(&self) -> &TrialLog {
        &self.log
    }

    pub fn statistics(&self) -> &TrialStatistics {
        &self.statistics
    }

    pub fn into_parts(self) -> (TrialLog, TrialStatistics) {
        (self.log, self.statistics)
    }
}

/// Simulate `customer_count` customers through both stations.
///
/// Follows this loop, with a clock that starts at 0 for every trial:
///
/// 1. Take four draws from `source`.
/// 2. Build the next [`CustomerRecord`] from those draws, the previous record (if any), and the clock.
/// 3. Append it to the log, recording the queue sizes it found.
/// 4. Advance the clock to the new record's `arrival1`.
///
/// Once every customer is logged, the [`TrialStatistics`] are computed in a single pass.
///
/// The source is borrowed, not consumed, so consecutive trials sharing a source read consecutive stretches of one
/// stream.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `customer_count < 2` or if a draw falls outside `[0, 1)`. Any error from the
/// source itself is forwarded unchanged.
pub fn run_trial<S>(model: &ArrivalModel, customer_count: usize, source: &mut S) -> Result<Trial>
where
    S: DrawSource + ?Sized,
{
    if customer_count < 2 {
        return Err(Error::invalid_argument(format!(
            "a trial needs at least 2 customers, got {customer_count}"
        )));
    }

    let mut log = TrialLog::with_capacity(customer_count);
    let mut clock: Minutes = 0;
    for sequence_id in 1..=customer_count {
        let draws = CustomerDraws::take(source)?;
        let record = model.build(sequence_id, draws, log.records.last(), clock)?;
        clock = record.arrival1();

        tracing::trace!(
            sequence_id,
            arrival = record.arrival1(),
            wait1 = record.wait1(),
            wait2 = record.wait2(),
            balks = record.balks(),
            "customer logged"
        );
        log.push(record);
    }

    let statistics = TrialStatistics::from_records(log.records())?;
    tracing::debug!(
        customers = customer_count,
        clock,
        average_waiting_time = statistics.average_waiting_time,
        wait_probability = statistics.wait_probability,
        "trial complete"
    );

    Ok(Trial { log, statistics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReplayDraws;

    #[test]
    fn queue_sizes_count_customers_still_in_service() {
        let model = ArrivalModel::default();
        // first: arrives at 1, station 1 until 4, station 2 until 7
        // second: arrives at 2, station 1 4..5, station 2 7..8
        // third: arrives at 3, station 1 5..6, balks
        let mut draws = ReplayDraws::new([
            0.1, 0.9, 0.9, 0.9, //
            0.1, 0.1, 0.1, 0.9, //
            0.1, 0.1, 0.1, 0.1,
        ]);
        let trial = run_trial(&model, 3, &mut draws).unwrap();
        let log = trial.log();

        assert_eq!(Some(QueueSizes::default()), log.queue_sizes(1));
        assert_eq!(Some(1), log.queue_size_1(2), "first customer should still be at station 1");
        assert_eq!(Some(1), log.queue_size_2(2), "first customer should still be at station 2");
        assert_eq!(Some(2), log.queue_size_1(3));
        // third reaches station 2 at 6: both earlier customers are still there
        assert_eq!(Some(2), log.queue_size_2(3));
        assert_eq!(None, log.queue_sizes(4));
        assert_eq!(None, log.queue_sizes(0));
    }

    #[test]
    fn balking_customers_do_not_count_toward_station_two() {
        let model = ArrivalModel::default();
        // first balks and leaves at 4; second reaches station 2 at 5
        let mut draws = ReplayDraws::new([
            0.1, 0.9, 0.9, 0.1, //
            0.1, 0.1, 0.1, 0.9,
        ]);
        let trial = run_trial(&model, 2, &mut draws).unwrap();
        assert_eq!(Some(1), trial.log().queue_size_1(2));
        assert_eq!(Some(0), trial.log().queue_size_2(2));
    }

    #[test]
    fn clock_advances_with_each_arrival() {
        let model = ArrivalModel::default();
        let mut draws = ReplayDraws::new([
            0.9, 0.1, 0.1, 0.9, //
            0.4, 0.1, 0.1, 0.9, //
            0.1, 0.1, 0.1, 0.9,
        ]);
        let trial = run_trial(&model, 3, &mut draws).unwrap();
        let arrivals: Vec<Minutes> = trial.log().records().iter().map(CustomerRecord::arrival1).collect();
        assert_eq!(vec![3, 5, 6], arrivals);

        let ids: Vec<usize> = trial.log().records().iter().map(CustomerRecord::sequence_id).collect();
        assert_eq!(vec![1, 2, 3], ids);
    }

    #[test]
    fn too_few_customers_is_rejected() {
        let mut draws = ReplayDraws::new([0.5; 8]);
        let result = run_trial(&ArrivalModel::default(), 1, &mut draws);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert_eq!(0, draws.consumed(), "no draws should be taken for a rejected trial");
    }

    #[test]
    fn out_of_range_draw_halts_trial() {
        let mut draws = ReplayDraws::new([0.5, 0.5, 0.5, 0.5, 0.5, 1.0, 0.5, 0.5]);
        let result = run_trial(&ArrivalModel::default(), 2, &mut draws);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn exhausted_source_is_forwarded() {
        let mut draws = ReplayDraws::new([0.5; 6]);
        let result = run_trial(&ArrivalModel::default(), 2, &mut draws);
        assert!(matches!(result, Err(Error::InvalidState(_))));
    }
}

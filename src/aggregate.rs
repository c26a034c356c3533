use crate::trial::run_trial;
use crate::{ArrivalModel, DrawSource, Error, Result, SimConfig, Trial, TrialStatistics};

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::thread;

/// Grand averages over a batch of trials.
///
/// Every field of [`TrialStatistics`] is averaged arithmetically across trials with equal weight, on the assumption
/// that all trials ran the same number of customers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateStatistics {
    pub trial_count: usize,
    pub customer_count: usize,
    pub means: TrialStatistics,
}

impl AggregateStatistics {
    /// Reduce per-trial statistics to their field-wise means.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `trials` is empty.
    pub fn from_trials(trials: &[TrialStatistics], customer_count: usize) -> Result<Self> {
        if trials.is_empty() {
            return Err(Error::invalid_argument("cannot average zero trials"));
        }

        let mut means = TrialStatistics::default();
        for statistics in trials {
            means.combine_with(statistics, |sum, value| sum + value);
        }
        let trial_count = trials.len();
        let divisor = trial_count as f64;
        let sums = means;
        means.combine_with(&sums, |_, sum| sum / divisor);

        Ok(Self {
            trial_count,
            customer_count,
            means,
        })
    }
}

/// Outcome of a batch of trials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    aggregate: AggregateStatistics,
    trials: Option<Vec<Trial>>,
}

impl RunReport {
    fn new(aggregate: AggregateStatistics, trials: Vec<Trial>, verbose: bool) -> Self {
        Self {
            aggregate,
            trials: if verbose { Some(trials) } else { None },
        }
    }

    pub fn aggregate(&self) -> &AggregateStatistics {
        &self.aggregate
    }

    /// Every trial in execution order, present only when the configuration asked for verbose output.
    pub fn trials(&self) -> Option<&[Trial]> {
        self.trials.as_deref()
    }

    pub fn into_trials(self) -> Option<Vec<Trial>> {
        self.trials
    }
}

/// Run `config.trial_count` trials one after another, all reading from the same `source`.
///
/// The source is never reset: trial `k + 1` starts on the draw right after the last one trial `k` consumed, so the
/// batch as a whole reads one continuous stream four draws per customer. Each trial starts with a fresh clock and an
/// empty log.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the configuration fails [`SimConfig::validate()`], and forwards the first
/// error raised by any trial.
pub fn run_trials<S>(config: &SimConfig, source: &mut S) -> Result<RunReport>
where
    S: DrawSource + ?Sized,
{
    config.validate()?;
    let model = config.arrival_model()?;

    let span = tracing::info_span!("run_trials", trials = config.trial_count, customers = config.customer_count);
    let _entered = span.enter();

    let mut trials = Vec::with_capacity(config.trial_count);
    for index in 0..config.trial_count {
        let _trial_span = tracing::debug_span!("trial", index).entered();
        trials.push(run_trial(&model, config.customer_count, source)?);
    }

    finish(config, trials)
}

/// Run `config.trial_count` trials in parallel, each on its own scoped thread with its own source.
///
/// At most [`thread::available_parallelism()`] trial threads run at once; larger batches run in successive waves.
/// `make_source` is called once per trial with the trial's 0-based index, before any thread starts. Trials share
/// nothing, so the report matches what [`run_trials`] would produce trial by trial if each trial were handed the
/// same source, and the trials come back in index order.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the configuration fails [`SimConfig::validate()`], and otherwise the error
/// of the lowest-indexed trial that failed. Returns [`Error::InvalidState`] if the operating system refuses a trial
/// thread.
pub fn run_independent_trials<S, F>(config: &SimConfig, mut make_source: F) -> Result<RunReport>
where
    S: DrawSource + Send,
    F: FnMut(usize) -> S,
{
    config.validate()?;
    let model = config.arrival_model()?;
    let customer_count = config.customer_count;

    let span = tracing::info_span!(
        "run_independent_trials",
        trials = config.trial_count,
        customers = customer_count
    );
    let _entered = span.enter();

    let sources: Vec<S> = (0..config.trial_count).map(&mut make_source).collect();
    let workers = thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(1);
    let trials = run_in_batches(&model, customer_count, sources, workers)?;
    finish(config, trials)
}

/// Run one trial per source with at most `workers` threads alive at a time, keeping the sources' order.
fn run_in_batches<S: DrawSource + Send>(
    model: &ArrivalModel,
    customer_count: usize,
    sources: Vec<S>,
    workers: usize,
) -> Result<Vec<Trial>> {
    let mut trials = Vec::with_capacity(sources.len());
    let mut pending = sources.into_iter().enumerate().peekable();

    while pending.peek().is_some() {
        let batch: Vec<(usize, S)> = pending.by_ref().take(workers.max(1)).collect();
        let outcomes = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(batch.len());
            for (index, mut source) in batch {
                let handle = thread::Builder::new()
                    .name(format!("trial-{index}"))
                    .spawn_scoped(scope, move || run_trial(model, customer_count, &mut source))
                    .map_err(|e| Error::invalid_state(format!("could not spawn thread for trial {index}: {e}")))?;
                handles.push(handle);
            }

            Ok::<_, Error>(
                handles
                    .into_iter()
                    .map(|handle| {
                        handle
                            .join()
                            .unwrap_or_else(|_| Err(Error::invalid_state("trial thread panicked")))
                    })
                    .collect::<Vec<Result<Trial>>>(),
            )
        })?;

        for outcome in outcomes {
            trials.push(outcome?);
        }
    }
    Ok(trials)
}

fn finish(config: &SimConfig, trials: Vec<Trial>) -> Result<RunReport> {
    let statistics: Vec<TrialStatistics> = trials.iter().map(|trial| *trial.statistics()).collect();
    let aggregate = AggregateStatistics::from_trials(&statistics, config.customer_count)?;
    tracing::info!(
        trials = aggregate.trial_count,
        average_waiting_time = aggregate.means.average_waiting_time,
        average_system_time = aggregate.means.average_system_time,
        "trials complete"
    );
    Ok(RunReport::new(aggregate, trials, config.verbose))
}

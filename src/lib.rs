//! # Overview
//!
//! tandem-queue models a two-station service facility. Customers arrive one at a time and queue for a single server
//! at station 1. After service, each customer either balks (skips station 2 and leaves) or queues for the single
//! server at station 2 and then departs. Both stations serve in FIFO order.
//!
//! The crate is organized bottom-up:
//!
//! * An [`ArrivalModel`] turns four uniform draws and the previous customer's record into a [`CustomerRecord`]. This
//!   is a pure function: no clock or counter lives anywhere but in its arguments.
//! * [`run_trial()`] drives one trial of customers through the model, building a [`TrialLog`] that also records how
//!   many customers each arrival found at both stations, and then derives [`TrialStatistics`] from the finished log.
//! * [`run_trials()`] executes a batch of trials back to back on one stream of draws and reduces their statistics to
//!   [`AggregateStatistics`]. [`run_independent_trials()`] does the same with one source per trial, spreading the
//!   trials across scoped threads.
//!
//! Randomness is injected through the [`DrawSource`] trait. [`RngDraws`] adapts any [`rand::Rng`], which makes seeded
//! replications straightforward, and [`ReplayDraws`] plays back a fixed sequence. The model consumes exactly four draws
//! per customer, in the order interarrival, service 1, service 2, balk, so two sources yielding the same values always
//! produce the same records.
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use tandem_queue::{run_trials, RngDraws, SimConfig};
//!
//! let config = SimConfig { trial_count: 5, customer_count: 50, verbose: false, ..SimConfig::default() };
//! let mut draws = RngDraws::new(StdRng::seed_from_u64(2013));
//! let report = run_trials(&config, &mut draws).unwrap();
//! assert_eq!(5, report.aggregate().trial_count);
//! assert!(report.trials().is_none());
//! ```
//!
//! # Logging
//!
//! The crate emits [`tracing`] events and spans: one span per batch and per trial, a `debug` summary at the end of
//! each trial, and a `trace` event per customer. No subscriber is installed; that choice belongs to the binary.
//!
//! # Errors
//!
//! All fallible operations return [`Result`]. [`Error::InvalidArgument`] flags inputs outside their domain and
//! [`Error::InvalidState`] flags operations invoked before their preconditions hold. Ratios over a subset of
//! customers that turns out to be empty resolve to 0 rather than erroring.

mod aggregate;
mod arrival;
mod config;
mod distribution;
mod draws;
mod error;
mod trial;

pub use aggregate::{run_independent_trials, run_trials, AggregateStatistics, RunReport};
pub use arrival::{ArrivalModel, CustomerRecord, Durations};
pub use config::SimConfig;
pub use distribution::DurationTable;
pub use draws::{CustomerDraws, DrawSource, ReplayDraws, RngDraws};
pub use error::{Error, Result};
pub use trial::{run_trial, QueueSizes, Trial, TrialLog, TrialStatistics};

/// Simulation time and durations, in whole minutes.
pub type Minutes = u64;

//! This example runs a batch of trials through the tandem queue and prints the per-trial logs followed by the grand
//! averages. The facility has two single-server stations in series. Roughly half of the customers leave after station 1
//! instead of queueing for station 2.
//!
//! A fresh seed is chosen on every run and printed with the results, so an interesting batch can be reproduced by
//! passing the same seed to `Pcg64::seed_from_u64`. Set `TANDEM_LOG=tandem_queue=debug` (or `trace`) to watch the
//! trials as they execute.

use rand::SeedableRng;
use rand_pcg::Pcg64;
use tandem_queue::{run_trials, RngDraws, RunReport, SimConfig, Trial};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TANDEM_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

fn print_trial(index: usize, trial: &Trial) {
    println!();
    println!("Trial {}", index + 1);
    println!(
        "{:>5} {:>5} {:>4} {:>4} {:>5} {:>7} {:>5} {:>5} {:>5} {:>5} {:>5} {:>5} {:>6} {:>3} {:>3}",
        "cust", "inter", "s1", "s2", "balk", "arrive", "q1", "s1beg", "s1end", "q2", "s2beg", "s2end", "system", "Q1",
        "Q2"
    );
    for (record, sizes) in trial.log().iter() {
        let (wait2, begin2, end2) = if record.balks() {
            ("-".to_string(), "--".to_string(), "--".to_string())
        } else {
            (
                record.wait2().to_string(),
                record.service2_begin().to_string(),
                record.service2_end().to_string(),
            )
        };
        println!(
            "{:>5} {:>5} {:>4} {:>4} {:>5} {:>7} {:>5} {:>5} {:>5} {:>5} {:>5} {:>5} {:>6} {:>3} {:>3}",
            record.sequence_id(),
            record.interarrival_time(),
            record.service1_time(),
            record.service2_time(),
            if record.balks() { "Y" } else { "-" },
            record.arrival1(),
            record.wait1(),
            record.service1_begin(),
            record.service1_end(),
            wait2,
            begin2,
            end2,
            record.time_in_system(),
            sizes.station1,
            sizes.station2,
        );
    }
}

fn print_summary(seed: u64, report: &RunReport) {
    let aggregate = report.aggregate();
    let means = &aggregate.means;

    println!();
    println!(
        "Averages for {} trials of {} customers (seed {seed}):",
        aggregate.trial_count, aggregate.customer_count
    );
    println!(
        "{:>48}: {:6.2} min  [Q1 {:5.2}  Q2 {:5.2}]",
        "Average waiting time for all customers",
        means.average_waiting_time,
        means.average_q1_time,
        means.average_q2_time_per_customer
    );
    println!(
        "{:>48}: {:6.2} min  [Q1 {:5.2}  Q2 {:5.2}]",
        "Average waiting time for customers who wait",
        means.average_wait_time_who_wait,
        means.average_q1_time_wait,
        means.average_q2_time_wait
    );
    println!(
        "{:>48}: {:6.2} min  [S1 {:5.2}  S2 {:5.2}]",
        "Average service time", means.average_service_time, means.average_service1_time, means.average_service2_time
    );
    println!(
        "{:>48}: {:6.1} %    [Q1 {:5.1}  Q2 {:5.1}]",
        "Probability a customer has to wait",
        means.wait_probability * 100.0,
        means.wait1_probability * 100.0,
        means.wait2_probability * 100.0
    );
    println!(
        "{:>48}: {:6.2} min",
        "Average time between arrivals", means.average_interarrival_time
    );
    println!(
        "{:>48}: {:6.2} min",
        "Average time each customer spends in system", means.average_system_time
    );
    println!("{:>48}: {:6.1} %", "Fraction of server time idle", means.idle_probability * 100.0);
}

fn main() {
    init_tracing();

    let config = SimConfig::default();
    let seed: u64 = rand::random();
    let mut draws = RngDraws::new(Pcg64::seed_from_u64(seed));

    let report = run_trials(&config, &mut draws).expect("default configuration should run without error");

    if let Some(trials) = report.trials() {
        for (index, trial) in trials.iter().enumerate() {
            print_trial(index, trial);
        }
    }
    print_summary(seed, &report);
}

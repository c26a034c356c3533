mod util;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tandem_queue::*;

fn seeded(seed: u64) -> RngDraws<Pcg64> {
    RngDraws::new(Pcg64::seed_from_u64(seed))
}

fn config(trial_count: usize, customer_count: usize) -> SimConfig {
    SimConfig {
        trial_count,
        customer_count,
        ..SimConfig::default()
    }
}

#[test]
fn first_customer_scenario() {
    let mut draws = ReplayDraws::new([0.1, 0.1, 0.1, 0.9, 0.9, 0.9, 0.9, 0.9]);
    let trial = run_trial(&ArrivalModel::default(), 2, &mut draws).expect("trial should run");
    let first = trial.log().record(1).expect("first customer should be logged");

    assert_eq!(
        (1, 1, 1, false),
        (
            first.interarrival_time(),
            first.service1_time(),
            first.service2_time(),
            first.balks()
        )
    );
    assert_eq!(
        (1, 1, 2, 0),
        (first.arrival1(), first.service1_begin(), first.service1_end(), first.wait1())
    );
    assert_eq!(
        (2, 2, 3, 0),
        (first.arrival2(), first.service2_begin(), first.service2_end(), first.wait2())
    );
    assert_eq!((0, 2, 3), (first.total_wait(), first.time_in_system(), first.idle_time()));
}

#[test]
fn second_arrival_finds_first_at_station_one() {
    // first customer holds station 1 from 1 to 4, second arrives at 2
    let mut draws = ReplayDraws::new([0.1, 0.9, 0.1, 0.9, 0.1, 0.1, 0.1, 0.9]);
    let trial = run_trial(&ArrivalModel::default(), 2, &mut draws).expect("trial should run");
    let second = trial.log().record(2).expect("second customer should be logged");

    assert!(second.arrival1() < trial.log().record(1).unwrap().service1_end());
    assert!(second.wait1() > 0, "second customer should wait at station 1");
    assert_eq!(Some(1), trial.log().queue_size_1(2));
}

#[test]
fn identical_seeds_give_identical_logs() {
    let first = run_trials(&config(4, 60), &mut seeded(11)).expect("run should complete");
    let second = run_trials(&config(4, 60), &mut seeded(11)).expect("run should complete");
    assert_eq!(first, second);

    let other = run_trials(&config(4, 60), &mut seeded(12)).expect("run should complete");
    assert_ne!(first.trials(), other.trials(), "different seeds should diverge");
}

#[test]
fn replayed_stream_matches_generator() {
    let customers = 40;
    let mut rng = Pcg64::seed_from_u64(99);
    let recorded: Vec<f64> = (0..customers * 4).map(|_| rng.random::<f64>()).collect();

    let model = ArrivalModel::default();
    let live = run_trial(&model, customers, &mut seeded(99)).expect("trial should run");
    let replayed = run_trial(&model, customers, &mut ReplayDraws::new(recorded)).expect("trial should run");
    assert_eq!(live, replayed);
}

#[test]
fn two_customer_trials_compute_every_statistic() {
    for seed in 0..200 {
        let report = run_trials(&config(1, 2), &mut seeded(seed)).expect("two customers should be enough");
        let means = report.aggregate().means;
        assert!(
            means.average_interarrival_time >= 1.0,
            "seed {seed}: interarrival average should be a sum of two draws over one"
        );
        assert!(!means.average_q2_time.is_nan(), "seed {seed}: quirky average must not be NaN");
    }
}

#[test]
fn aggregate_is_mean_of_trials() {
    let report = run_trials(&config(8, 30), &mut seeded(5)).expect("run should complete");
    let trials = report.trials().expect("verbose run should keep trials");
    assert_eq!(8, trials.len());

    let n = trials.len() as f64;
    let mean_wait: f64 = trials.iter().map(|t| t.statistics().average_waiting_time).sum::<f64>() / n;
    let mean_system: f64 = trials.iter().map(|t| t.statistics().average_system_time).sum::<f64>() / n;
    let mean_wait2: f64 = trials.iter().map(|t| t.statistics().wait2_probability).sum::<f64>() / n;

    let means = report.aggregate().means;
    assert_floats_near_equal!(mean_wait, means.average_waiting_time, "average waiting time");
    assert_floats_near_equal!(mean_system, means.average_system_time, "average system time");
    assert_floats_near_equal!(mean_wait2, means.wait2_probability, "station 2 wait probability");
}

#[test]
fn successive_trials_consume_successive_draws() {
    let customers = 12;
    let batch = run_trials(&config(3, customers), &mut seeded(21)).expect("run should complete");

    let model = ArrivalModel::default();
    let mut draws = seeded(21);
    for trial in batch.trials().expect("verbose run should keep trials") {
        let expected = run_trial(&model, customers, &mut draws).expect("trial should run");
        assert_eq!(&expected, trial);
    }
}

#[test]
fn everyone_balking_leaves_station_two_untouched() {
    let config = SimConfig {
        balk_threshold: 1.0,
        ..config(3, 25)
    };
    let report = run_trials(&config, &mut seeded(8)).expect("run should complete");

    for trial in report.trials().unwrap() {
        assert!(trial.log().records().iter().all(CustomerRecord::balks));
        assert!(trial
            .log()
            .records()
            .iter()
            .all(|r| r.service2_begin() == 0 && r.service2_end() == 0));
        assert_eq!(0.0, trial.statistics().average_service2_time);
        assert_eq!(0.0, trial.statistics().average_q2_time_wait);
    }
    assert_eq!(0.0, report.aggregate().means.average_q2_time_wait);
}

#[test]
fn disabled_balking_sends_everyone_to_station_two() {
    let config = SimConfig {
        balking: false,
        ..config(2, 25)
    };
    let report = run_trials(&config, &mut seeded(8)).expect("run should complete");
    for trial in report.trials().unwrap() {
        assert!(trial.log().records().iter().all(|r| !r.balks()));
    }
}

#[test]
fn balking_switch_keeps_draws_aligned() {
    let customers = 20;
    let balking = run_trial(&ArrivalModel::default(), customers, &mut seeded(3)).unwrap();
    let direct = run_trial(&ArrivalModel::default().without_balking(), customers, &mut seeded(3)).unwrap();

    for (a, b) in balking.log().records().iter().zip(direct.log().records()) {
        assert_eq!(a.arrival1(), b.arrival1());
        assert_eq!(a.service1_time(), b.service1_time());
        assert_eq!(a.service2_time(), b.service2_time());
    }
}

#[test]
fn probabilities_stay_in_unit_interval() {
    let report = run_trials(&config(20, 100), &mut seeded(2013)).expect("run should complete");
    for trial in report.trials().unwrap() {
        let s = trial.statistics();
        for p in [s.wait_probability, s.wait1_probability, s.wait2_probability, s.idle_probability] {
            assert!((0.0..=1.0).contains(&p), "probability {p} out of range");
        }
        assert!(s.wait1_probability <= s.wait_probability);
        assert!(s.average_q1_time <= s.average_waiting_time);
    }
}

#[test]
fn independent_trials_match_per_trial_seeds() {
    let customers = 30;
    let report = run_independent_trials(&config(6, customers), |index| seeded(index as u64)).expect("run should complete");

    let model = ArrivalModel::default();
    for (index, trial) in report.trials().unwrap().iter().enumerate() {
        let expected = run_trial(&model, customers, &mut seeded(index as u64)).unwrap();
        assert_eq!(&expected, trial);
    }
}

#[test]
fn huge_durations_are_rejected_instead_of_overflowing() {
    let big = DurationTable::new(0.2, 0.6, [u64::MAX / 2 + 1; 3]).expect("band edges are ordered");
    let model = ArrivalModel::default()
        .with_tables(big, big, big)
        .expect("tables should validate");
    let result = run_trial(&model, 2, &mut ReplayDraws::new([0.5; 8]));
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn invalid_configuration_is_rejected_before_drawing() {
    let mut draws = ReplayDraws::new([0.5; 8]);
    let bad = SimConfig {
        customer_count: 1,
        ..SimConfig::default()
    };
    assert!(matches!(run_trials(&bad, &mut draws), Err(Error::InvalidArgument(_))));
    assert_eq!(0, draws.consumed());
}

#[test]
fn runs_under_a_trace_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("tandem_queue=trace"))
        .with_test_writer()
        .try_init();

    let report = run_trials(&config(2, 5), &mut seeded(1)).expect("run should complete");
    assert_eq!(2, report.aggregate().trial_count);
}

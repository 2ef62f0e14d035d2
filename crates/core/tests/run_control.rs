//! Snapshot cadence and stop requests as seen by a caller of `Scheduler::run`

use std::thread;
use std::time::Duration;

use wildfire_ca_core::{
    CancellationFlag, CellParams, CellState, GridDims, GridStore, Scheduler, SimulationConfig,
    SimulationView, StopReason,
};

fn fire_grid(side: usize) -> GridStore {
    let params = CellParams {
        wind_speed: 1.0,
        initial_fuel: 3.0,
        ..CellParams::default()
    };
    let mut grid =
        GridStore::uniform(GridDims::new(side, side), params, CellState::unburnt(1.0)).unwrap();
    grid.ignite(side / 2, side / 2).unwrap();
    grid
}

fn config(horizon: u64, snapshot_every: u64) -> SimulationConfig {
    SimulationConfig {
        horizon,
        snapshot_every,
        seed: 42,
        tau: 0.2,
        k0: 0.3,
        ..SimulationConfig::default()
    }
}

#[test]
fn test_snapshot_cadence() {
    let mut scheduler = Scheduler::new(fire_grid(9), config(10, 3)).unwrap();
    let mut steps = Vec::new();
    let summary = scheduler.run(
        &mut |view: &SimulationView<'_>| {
            steps.push(view.step);
            true
        },
        &CancellationFlag::new(),
    );

    assert_eq!(steps, vec![0, 3, 6, 9, 10]);
    assert_eq!(summary.dumps, 5);
    assert_eq!(summary.steps_completed, 10);
    assert_eq!(summary.stop_reason, StopReason::HorizonReached);
}

#[test]
fn test_horizon_multiple_of_cadence_dumps_last_generation_twice() {
    let mut scheduler = Scheduler::new(fire_grid(9), config(6, 3)).unwrap();
    let mut steps = Vec::new();
    scheduler.run(
        &mut |view: &SimulationView<'_>| {
            steps.push(view.step);
            true
        },
        &CancellationFlag::new(),
    );
    assert_eq!(steps, vec![0, 3, 6, 6]);
}

#[test]
fn test_stop_requested_inside_dump_ends_at_that_generation() {
    let cancel = CancellationFlag::new();
    let mut scheduler = Scheduler::new(fire_grid(11), config(50, 1)).unwrap();
    let mut dumped = Vec::new();
    let summary = scheduler.run(
        &mut |view: &SimulationView<'_>| {
            if view.step == 4 {
                cancel.request_stop();
            }
            dumped.push((view.step, view.states.to_vec()));
            true
        },
        &cancel,
    );

    assert_eq!(summary.stop_reason, StopReason::Cancelled);
    assert_eq!(summary.steps_completed, 4);
    let steps: Vec<u64> = dumped.iter().map(|(step, _)| *step).collect();
    assert_eq!(steps, vec![0, 1, 2, 3, 4, 4]);

    // the final dump shows generation 4, the same one an uninterrupted run reaches
    let mut reference = Scheduler::new(fire_grid(11), config(50, 1)).unwrap();
    for _ in 0..4 {
        reference.step();
    }
    assert_eq!(dumped.last().unwrap().1, reference.grid().current());
}

#[test]
fn test_stop_from_another_thread() {
    let cancel = CancellationFlag::new();
    let remote = cancel.clone();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        remote.request_stop();
    });

    let mut scheduler = Scheduler::new(fire_grid(16), config(u64::MAX, 1_000)).unwrap();
    let mut last_step = None;
    let summary = scheduler.run(
        &mut |view: &SimulationView<'_>| {
            last_step = Some(view.step);
            true
        },
        &cancel,
    );
    stopper.join().unwrap();

    assert_eq!(summary.stop_reason, StopReason::Cancelled);
    assert_eq!(last_step, Some(summary.steps_completed));
    assert_eq!(scheduler.step_count(), summary.steps_completed);
}

#[test]
fn test_resumed_run_continues_step_numbering() {
    let mut scheduler = Scheduler::new(fire_grid(9), config(8, 4)).unwrap();
    let mut steps = Vec::new();
    let mut record = |view: &SimulationView<'_>| {
        steps.push(view.step);
        view.step < 4
    };
    let first = scheduler.run(&mut record, &CancellationFlag::new());
    assert_eq!(first.stop_reason, StopReason::DumpRequested);

    let second = scheduler.run(
        &mut |view: &SimulationView<'_>| {
            steps.push(view.step);
            true
        },
        &CancellationFlag::new(),
    );
    assert_eq!(second.steps_completed, 4);
    assert_eq!(steps, vec![0, 4, 4, 4, 8, 8]);
}

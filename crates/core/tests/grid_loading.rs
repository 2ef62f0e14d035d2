//! Loading grids from cell rows and running them

use std::io::Cursor;

use wildfire_ca_core::ingest::CellRecord;
use wildfire_ca_core::{
    CancellationFlag, CellParams, CellState, GridDims, GridError, GridLoader, IngestError,
    Scheduler, SimulationConfig, SimulationView,
};

fn rows_for(dims: GridDims, ignite: (usize, usize)) -> String {
    let mut out = String::from("# row,col,P,S,F,D,gamma,B,N\n");
    for idx in 0..dims.len() {
        let (row, col) = dims.coords(idx);
        let record = CellRecord {
            row,
            col,
            params: CellParams {
                altitude: (row + col) as f32,
                flammability: 0.9,
                wind_speed: 1.5,
                wind_direction: 0.25,
                initial_fuel: 2.0,
            },
            state: if (row, col) == ignite {
                CellState::burning(1.0)
            } else {
                CellState::unburnt(1.0)
            },
        };
        out.push_str(&record.to_row());
        out.push('\n');
    }
    out
}

#[test]
fn test_loaded_grid_runs() {
    let dims = GridDims::new(6, 8);
    let grid = GridLoader::read_from(dims, Cursor::new(rows_for(dims, (3, 4)))).unwrap();
    assert!(grid.state(3, 4).unwrap().burning);

    let config = SimulationConfig {
        horizon: 12,
        snapshot_every: 4,
        seed: 5,
        ..SimulationConfig::default()
    };
    let mut scheduler = Scheduler::new(grid, config).unwrap();
    let mut stats = Vec::new();
    scheduler.run(
        &mut |view: &SimulationView<'_>| {
            stats.push(view.stats());
            true
        },
        &CancellationFlag::new(),
    );

    assert_eq!(stats[0].burning_cells, 1);
    assert!(stats.iter().skip(1).any(|s| s.spent_cells > 0));
}

#[test]
fn test_rows_in_any_order() {
    let dims = GridDims::new(3, 3);
    let text = rows_for(dims, (0, 0));
    let mut lines: Vec<&str> = text.lines().collect();
    lines.reverse();
    let grid = GridLoader::read_from(dims, Cursor::new(lines.join("\n"))).unwrap();
    let ordered = GridLoader::read_from(dims, Cursor::new(text.clone())).unwrap();
    assert_eq!(grid.current(), ordered.current());
    assert_eq!(grid.params(), ordered.params());
}

#[test]
fn test_burning_without_fuel_rejected() {
    let input = "0,0,0,1,0,0,1,0,1\n";
    let err = GridLoader::read_from(GridDims::new(1, 1), Cursor::new(input)).unwrap_err();
    assert!(matches!(
        err,
        IngestError::Grid(GridError::BurningWithoutFuel { row: 0, col: 0, .. })
    ));
}

#[test]
fn test_flammability_out_of_range_rejected() {
    let input = "0,0,0,1.5,0,0,1,1,0\n";
    let err = GridLoader::read_from(GridDims::new(1, 1), Cursor::new(input)).unwrap_err();
    assert!(matches!(
        err,
        IngestError::Grid(GridError::InvalidParameter {
            field: "flammability",
            ..
        })
    ));
}

#[test]
fn test_error_messages_name_the_line() {
    let input = "0,0,0,1,0,0,1,1,0\n0,1,0,1,0,0\n";
    let err = GridLoader::read_from(GridDims::new(1, 2), Cursor::new(input)).unwrap_err();
    assert!(err.to_string().contains("line 2"), "got: {err}");
}

#[test]
fn test_out_of_bounds_row_names_the_line() {
    let input = "0,0,0,1,0,0,1,1,0\n5,0,0,1,0,0,1,1,0\n";
    let err = GridLoader::read_from(GridDims::new(1, 2), Cursor::new(input)).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("line 2"), "got: {message}");
    assert!(message.contains("(5, 0)"), "got: {message}");
}

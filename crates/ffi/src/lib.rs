//! C interface to the wildfire cellular automaton
//!
//! An instance owns one grid and its scheduler. Callers create it from
//! row-major parameter and state arrays, drive it with `wildfire_run` (with a
//! dump callback) or `wildfire_step`, and query cells between calls. Every
//! fallible function returns a `WildfireErrorCode` and records a message
//! retrievable with `wildfire_get_last_error`.
//!
//! `wildfire_request_stop` only sets an atomic flag and may be called from a
//! C signal handler; a running `wildfire_run` finishes its current step, makes
//! its final dump and returns `WildfireStopReason::Cancelled`.

mod error;
mod helpers;
mod instance;
mod types;

use std::os::raw::c_void;

use wildfire_ca_core::{DumpSink, SimulationView};

pub use error::{wildfire_get_last_error, wildfire_get_last_error_code, WildfireErrorCode};
pub use instance::{wildfire_default_config, wildfire_destroy, wildfire_new, WildfireInstance};
pub use types::{
    WildfireCellParams, WildfireCellState, WildfireConfig, WildfireDumpFn, WildfireRunSummary,
    WildfireSnapshot, WildfireStopReason,
};

use error::DefaultWildfireError;
use helpers::{ffi_status, instance_from_ptr, lock_scheduler, write_out};

/// Forwards snapshots to a C callback.
struct CallbackSink {
    callback: WildfireDumpFn,
    user_data: *mut c_void,
    buffer: Vec<WildfireCellState>,
}

impl DumpSink for CallbackSink {
    fn dump(&mut self, view: &SimulationView<'_>) -> bool {
        let Some(callback) = self.callback else {
            return true;
        };

        self.buffer.clear();
        self.buffer
            .extend(view.states.iter().copied().map(WildfireCellState::from));
        let stats = view.stats();
        let snapshot = WildfireSnapshot {
            rows: view.dims.rows,
            cols: view.dims.cols,
            step: view.step,
            states: self.buffer.as_ptr(),
            burning_cells: stats.burning_cells,
            spent_cells: stats.spent_cells,
            total_fuel: stats.total_fuel,
        };

        // SAFETY: `wildfire_run`'s caller vouches for the callback and its user data.
        unsafe { callback(&snapshot, self.user_data) }
    }
}

/// Run the simulation until the horizon, a callback-requested stop or
/// `wildfire_request_stop`.
///
/// `callback` (nullable) receives the starting generation, every
/// `snapshot_every` completed steps, and a final snapshot however the run
/// ends. Returning `false` stops the run. A second call resumes from the
/// current step. A stop request made before the call is honored immediately;
/// use `wildfire_clear_stop` to re-arm the instance.
///
/// `out_summary` may be null.
///
/// # Safety
/// - `ptr` must be null or a live pointer from `wildfire_new`.
/// - `callback` must be safe to call with `user_data` from this thread and
///   must not call into the instance except `wildfire_request_stop`.
/// - `out_summary` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn wildfire_run(
    ptr: *const WildfireInstance,
    callback: WildfireDumpFn,
    user_data: *mut c_void,
    out_summary: *mut WildfireRunSummary,
) -> WildfireErrorCode {
    ffi_status(|| {
        // SAFETY: forwarded from this function's contract.
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let mut scheduler = lock_scheduler(instance)?;
        let mut sink = CallbackSink {
            callback,
            user_data,
            buffer: Vec::with_capacity(scheduler.grid().dims().len()),
        };
        let summary = scheduler.run(&mut sink, &instance.cancel);
        if !out_summary.is_null() {
            // SAFETY: non-null and writable per the contract.
            unsafe { write_out(out_summary, "out_summary", summary.into()) }?;
        }
        Ok(())
    })
}

/// Advance the simulation by `steps` generations without invoking any dump.
///
/// # Safety
/// `ptr` must be null or a live pointer from `wildfire_new`.
#[no_mangle]
pub unsafe extern "C" fn wildfire_step(ptr: *const WildfireInstance, steps: u64) -> WildfireErrorCode {
    ffi_status(|| {
        // SAFETY: forwarded from this function's contract.
        let instance = unsafe { instance_from_ptr(ptr) }?;
        let mut scheduler = lock_scheduler(instance)?;
        for _ in 0..steps {
            scheduler.step();
        }
        Ok(())
    })
}

/// Ask a running (or the next) `wildfire_run` to stop at the next step boundary.
///
/// Async-signal-safe: performs a single atomic store, no allocation, no lock and
/// no error bookkeeping. A null `ptr` is ignored.
///
/// # Safety
/// `ptr` must be null or a live pointer from `wildfire_new`.
#[no_mangle]
pub unsafe extern "C" fn wildfire_request_stop(ptr: *const WildfireInstance) {
    // SAFETY: null or live per the contract.
    if let Some(instance) = unsafe { ptr.as_ref() } {
        instance.cancel.request_stop();
    }
}

/// Clear a previous stop request so the instance can run again.
///
/// # Safety
/// `ptr` must be null or a live pointer from `wildfire_new`.
#[no_mangle]
pub unsafe extern "C" fn wildfire_clear_stop(ptr: *const WildfireInstance) -> WildfireErrorCode {
    ffi_status(|| {
        // SAFETY: forwarded from this function's contract.
        let instance = unsafe { instance_from_ptr(ptr) }?;
        instance.cancel.reset();
        Ok(())
    })
}

/// Read the state of cell `(row, col)` in the current generation.
///
/// Returns `WildfireErrorCode::OutOfBounds` for coordinates outside the grid.
///
/// # Safety
/// - `ptr` must be null or a live pointer from `wildfire_new`.
/// - `out_state` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn wildfire_get_cell(
    ptr: *const WildfireInstance,
    row: usize,
    col: usize,
    out_state: *mut WildfireCellState,
) -> WildfireErrorCode {
    ffi_status(|| {
        // SAFETY: forwarded from this function's contract.
        let instance = unsafe { instance_from_ptr(ptr) }?;
        if out_state.is_null() {
            return Err(DefaultWildfireError::null_pointer("out_state"));
        }
        let scheduler = lock_scheduler(instance)?;
        let grid = scheduler.grid();
        let dims = grid.dims();
        let state = grid
            .state(row, col)
            .ok_or_else(|| DefaultWildfireError::out_of_bounds(row, col, dims.rows, dims.cols))?;
        // SAFETY: checked non-null above, writable per the contract.
        unsafe { write_out(out_state, "out_state", state.into()) }
    })
}

/// Read the grid dimensions.
///
/// # Safety
/// - `ptr` must be null or a live pointer from `wildfire_new`.
/// - `out_rows` and `out_cols` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn wildfire_get_dimensions(
    ptr: *const WildfireInstance,
    out_rows: *mut usize,
    out_cols: *mut usize,
) -> WildfireErrorCode {
    ffi_status(|| {
        // SAFETY: forwarded from this function's contract.
        let instance = unsafe { instance_from_ptr(ptr) }?;
        if out_rows.is_null() {
            return Err(DefaultWildfireError::null_pointer("out_rows"));
        }
        let dims = lock_scheduler(instance)?.grid().dims();
        // SAFETY: writable per the contract.
        unsafe {
            write_out(out_cols, "out_cols", dims.cols)?;
            write_out(out_rows, "out_rows", dims.rows)
        }
    })
}

/// Read the number of completed steps.
///
/// # Safety
/// - `ptr` must be null or a live pointer from `wildfire_new`.
/// - `out_step` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn wildfire_get_step(
    ptr: *const WildfireInstance,
    out_step: *mut u64,
) -> WildfireErrorCode {
    ffi_status(|| {
        // SAFETY: forwarded from this function's contract.
        let instance = unsafe { instance_from_ptr(ptr) }?;
        if out_step.is_null() {
            return Err(DefaultWildfireError::null_pointer("out_step"));
        }
        let step = lock_scheduler(instance)?.step_count();
        // SAFETY: writable per the contract.
        unsafe { write_out(out_step, "out_step", step) }
    })
}

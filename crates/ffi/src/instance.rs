use std::ptr;
use std::slice;
use std::sync::Mutex;

use tracing::info;
use wildfire_ca_core::{
    CancellationFlag, CellParams, CellState, GridDims, GridError, GridStore, Scheduler,
    SimulationConfig,
};

use crate::error::{DefaultWildfireError, WildfireErrorCode};
use crate::helpers::{track_error, track_result};
use crate::types::{WildfireCellParams, WildfireCellState, WildfireConfig};

/// One wildfire run owned by a C caller.
///
/// # Thread Safety
/// The scheduler sits behind a `Mutex`: `wildfire_run`, `wildfire_step` and the
/// queries serialize on it, so a query issued while a run is in progress waits
/// for the run to end. The cancellation flag lives outside the lock, which lets
/// `wildfire_request_stop` reach a running simulation from any thread or from a
/// signal handler.
pub struct WildfireInstance {
    pub(crate) scheduler: Mutex<Scheduler>,
    pub(crate) cancel: CancellationFlag,
}

impl WildfireInstance {
    /// Build an instance from caller-owned arrays, copying them.
    ///
    /// # Safety
    /// `params` and `states` must be null or point to `rows * cols` readable
    /// elements; `config` must be null or point to a readable config.
    ///
    /// # Errors
    ///
    /// Null arrays, invalid grids and invalid configurations are reported with
    /// their matching error code.
    pub(crate) unsafe fn new(
        rows: usize,
        cols: usize,
        params: *const WildfireCellParams,
        states: *const WildfireCellState,
        config: *const WildfireConfig,
    ) -> Result<Box<Self>, DefaultWildfireError> {
        if params.is_null() {
            return Err(DefaultWildfireError::null_pointer("params"));
        }
        if states.is_null() {
            return Err(DefaultWildfireError::null_pointer("states"));
        }

        let dims = GridDims::new(rows, cols);
        if dims.is_empty() {
            return Err(GridError::EmptyGrid { rows, cols }.into());
        }
        let len = dims
            .checked_len()
            .ok_or(GridError::DimensionOverflow { rows, cols })?;

        // SAFETY: non-null and `len` elements long per the caller's contract.
        let (params, states) = unsafe {
            (
                slice::from_raw_parts(params, len),
                slice::from_raw_parts(states, len),
            )
        };
        // SAFETY: null or readable per the caller's contract.
        let config = unsafe { config.as_ref() }
            .copied()
            .map_or_else(SimulationConfig::default, SimulationConfig::from);

        let grid = GridStore::new(
            dims,
            params.iter().copied().map(CellParams::from).collect(),
            states.iter().copied().map(CellState::from).collect(),
        )?;
        let scheduler = Scheduler::new(grid, config)?;
        info!("Created {}x{} wildfire instance", rows, cols);

        Ok(Box::new(Self {
            scheduler: Mutex::new(scheduler),
            cancel: CancellationFlag::new(),
        }))
    }
}

/// Run configuration with the library defaults filled in.
#[no_mangle]
pub extern "C" fn wildfire_default_config() -> WildfireConfig {
    SimulationConfig::default().into()
}

/// Create a wildfire instance and return it via out-parameter.
///
/// The grid is `rows * cols` cells in row-major order (index `row * cols + col`).
/// `params` and `states` are copied, so the caller may free them afterwards.
/// Pass a null `config` to use `wildfire_default_config()`.
///
/// Returns
/// - `WildfireErrorCode::Ok` (0) with a valid instance in `out_instance`
/// - `WildfireErrorCode::NullPointer` if an array or `out_instance` is null
/// - `WildfireErrorCode::InvalidGrid` for zero dimensions, out-of-range
///   parameters or a burning cell without fuel
/// - `WildfireErrorCode::InvalidConfig` if the configuration is rejected
///
/// On failure `out_instance` is set to null; `wildfire_get_last_error()` has
/// the details.
///
/// # Safety
///
/// - `out_instance` must be null or valid for writes.
/// - `params` and `states` must be null or point to `rows * cols` elements.
/// - `config` must be null or point to a readable `WildfireConfig`.
/// - The caller owns the returned instance and MUST call `wildfire_destroy`
///   exactly once.
///
/// Example
/// ```c
/// WildfireConfig config = wildfire_default_config();
/// config.horizon = 200;
/// WildfireInstance *sim = NULL;
/// if (wildfire_new(rows, cols, params, states, &config, &sim) != Ok) {
///     fprintf(stderr, "%s\n", wildfire_get_last_error());
///     return;
/// }
/// // ... wildfire_run(sim, on_dump, ctx, &summary) ...
/// wildfire_destroy(sim);
/// ```
#[no_mangle]
pub unsafe extern "C" fn wildfire_new(
    rows: usize,
    cols: usize,
    params: *const WildfireCellParams,
    states: *const WildfireCellState,
    config: *const WildfireConfig,
    out_instance: *mut *mut WildfireInstance,
) -> WildfireErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultWildfireError::null_pointer("out_instance"));
    }

    // SAFETY: pointer contracts are forwarded from this function's.
    let created = unsafe { WildfireInstance::new(rows, cols, params, states, config) };
    match track_result(created) {
        Ok(instance) => {
            unsafe {
                *out_instance = Box::into_raw(instance);
            }
            WildfireErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                *out_instance = ptr::null_mut();
            }
            code
        }
    }
}

/// Destroy an instance previously created by `wildfire_new`.
///
/// If `ptr` is null this is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by `wildfire_new` and not freed already.
/// - No other thread may be using the instance, and the caller must not use the
///   pointer again.
#[no_mangle]
pub unsafe extern "C" fn wildfire_destroy(ptr: *mut WildfireInstance) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: created by `Box::into_raw` in `wildfire_new` and not yet freed.
    unsafe {
        drop(Box::from_raw(ptr));
    }
}

use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use wildfire_ca_core::{ConfigError, GridError};

/// Common interface for FFI error types.
///
/// - `code()` - Returns the error code to be passed across FFI boundary
/// - `msg()` - Returns the error message for diagnostic purposes
pub(crate) trait WildfireError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> WildfireErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `WildfireError` for the FFI failure scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultWildfireError {
    code: WildfireErrorCode,
    msg: String,
}

impl DefaultWildfireError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_instance"`, `"ptr"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: WildfireErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for poisoned lock.
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: WildfireErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    /// Create error for a grid that failed validation.
    pub fn invalid_grid(message: &str) -> Self {
        Self {
            code: WildfireErrorCode::InvalidGrid,
            msg: format!("Invalid grid: {message}"),
        }
    }

    /// Create error for a run configuration that failed validation.
    pub fn invalid_config(message: &str) -> Self {
        Self {
            code: WildfireErrorCode::InvalidConfig,
            msg: format!("Invalid configuration: {message}"),
        }
    }

    /// Create error for a cell coordinate outside the grid.
    pub fn out_of_bounds(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        Self {
            code: WildfireErrorCode::OutOfBounds,
            msg: format!("Cell ({row}, {col}) lies outside the {rows}x{cols} grid"),
        }
    }
}

impl WildfireError for DefaultWildfireError {
    fn code(&self) -> WildfireErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

impl From<GridError> for DefaultWildfireError {
    fn from(error: GridError) -> Self {
        match error {
            GridError::OutOfBounds {
                row,
                col,
                rows,
                cols,
            } => Self::out_of_bounds(row, col, rows, cols),
            other => Self::invalid_grid(&other.to_string()),
        }
    }
}

impl From<ConfigError> for DefaultWildfireError {
    fn from(error: ConfigError) -> Self {
        Self::invalid_config(&error.to_string())
    }
}

/// FFI error codes returned by wildfire functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildfireErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Lock poisoned: a panic occurred while the simulation was locked.
    LockPoisoned = 2,

    /// Grid dimensions, parameters or initial states are invalid.
    InvalidGrid = 3,

    /// Run configuration violates a constraint (e.g. zero snapshot cadence).
    InvalidConfig = 4,

    /// Cell coordinate outside the grid.
    OutOfBounds = 5,
}

impl From<DefaultWildfireError> for WildfireErrorCode {
    fn from(error: DefaultWildfireError) -> Self {
        error.code
    }
}

thread_local! {
    /// Most recent FFI error on this thread (C string, error code).
    /// The CString is kept here so the pointer handed out stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, WildfireErrorCode)> = const { RefCell::new((None, WildfireErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, WildfireErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, WildfireErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if an error occurred.
/// - `null` if the last call on this thread succeeded.
///
/// # Thread Safety
/// Error messages are stored per-thread, so each thread sees only its own errors.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread that
/// sets or clears the error. **DO NOT FREE THIS POINTER.**
///
/// Example:
/// ```c
/// WildfireInstance *sim = NULL;
/// if (wildfire_new(rows, cols, params, states, &config, &sim) != Ok) {
///     fprintf(stderr, "wildfire_new failed: %s\n", wildfire_get_last_error());
/// }
/// ```
#[no_mangle]
pub extern "C" fn wildfire_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code on this thread.
///
/// Returns `WildfireErrorCode::Ok` (0) if the last call succeeded.
#[no_mangle]
pub extern "C" fn wildfire_get_last_error_code() -> WildfireErrorCode {
    with_last_error(|(_cstring, code)| *code)
}

use std::ffi::CString;
use std::sync::MutexGuard;

use tracing::debug;
use wildfire_ca_core::Scheduler;

use crate::error::{with_last_error_mut, DefaultWildfireError, WildfireError, WildfireErrorCode};
use crate::instance::WildfireInstance;

/// Set the thread-local error message and code.
pub(crate) fn set_last_error(error: &impl WildfireError) {
    debug!("FFI call failed: {}", error.msg());
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl WildfireError) -> WildfireErrorCode {
    set_last_error(error);
    error.code()
}

/// Record the outcome of a fallible operation: clears the last error on
/// success, stores it on failure.
pub(crate) fn track_result<T>(result: Result<T, DefaultWildfireError>) -> Result<T, WildfireErrorCode> {
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(error) => Err(track_error(&error)),
    }
}

/// Run the body of a status-returning FFI function and record its outcome.
pub(crate) fn ffi_status<F>(body: F) -> WildfireErrorCode
where
    F: FnOnce() -> Result<(), DefaultWildfireError>,
{
    match track_result(body()) {
        Ok(()) => WildfireErrorCode::Ok,
        Err(code) => code,
    }
}

/// Clear the thread-local error message and code.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = WildfireErrorCode::Ok;
    });
}

/// Borrow an instance from a caller-supplied pointer.
///
/// # Safety
/// `ptr` must be null or a live pointer returned by `wildfire_new`.
pub(crate) unsafe fn instance_from_ptr<'a>(
    ptr: *const WildfireInstance,
) -> Result<&'a WildfireInstance, DefaultWildfireError> {
    // SAFETY: caller guarantees `ptr` is null or points to a live instance.
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultWildfireError::null_pointer("ptr"))
}

/// Lock the scheduler of an instance.
pub(crate) fn lock_scheduler(
    instance: &WildfireInstance,
) -> Result<MutexGuard<'_, Scheduler>, DefaultWildfireError> {
    instance
        .scheduler
        .lock()
        .map_err(|_| DefaultWildfireError::lock_poisoned("scheduler"))
}

/// Write `value` through an out-parameter.
///
/// # Safety
/// `out` must be null or valid for writes of `T`.
pub(crate) unsafe fn write_out<T>(
    out: *mut T,
    name: &str,
    value: T,
) -> Result<(), DefaultWildfireError> {
    if out.is_null() {
        return Err(DefaultWildfireError::null_pointer(name));
    }
    // SAFETY: non-null and writable per the caller's contract.
    unsafe { out.write(value) };
    Ok(())
}

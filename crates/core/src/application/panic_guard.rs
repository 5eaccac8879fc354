// Panic isolation for observer callbacks
use std::panic::{catch_unwind, UnwindSafe};
use tracing::error;

/// Result of a panic-guarded execution
#[derive(Debug)]
pub enum PanicGuardResult<T> {
    /// Execution completed successfully
    Success(T),
    /// Execution panicked
    Panicked(String),
}

/// Execute a closure with panic isolation
///
/// Observers run inside the engine's critical section; a panicking observer
/// must not poison the engine lock or take the timers down with it.
///
/// # Example
/// ```text
/// let result = execute_guarded(|| panic!("render failed"));
/// assert!(matches!(result, PanicGuardResult::Panicked(_)));
/// ```
pub fn execute_guarded<F, T>(f: F) -> PanicGuardResult<T>
where
    F: FnOnce() -> T + UnwindSafe,
{
    match catch_unwind(f) {
        Ok(result) => PanicGuardResult::Success(result),
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };

            error!(panic_msg = %panic_msg, "State observer panicked");
            PanicGuardResult::Panicked(panic_msg)
        }
    }
}

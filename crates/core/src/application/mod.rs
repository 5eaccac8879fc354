// Application Layer - Simulation engine

pub mod manager;
pub mod panic_guard;
pub mod shutdown;
pub mod worker;

// Re-exports
pub use manager::Manager;
pub use panic_guard::{execute_guarded, PanicGuardResult};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use worker::Worker;

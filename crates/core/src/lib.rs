// Queue Simulator Core - Engine, Domain & Ports
// NO presentation dependencies: the UI only consumes snapshots

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::Manager;
pub use domain::{SimulationConfig, Snapshot};
pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Port Layer - Interfaces for injected collaborators

pub mod observer;
pub mod random_source; // For deterministic testing
pub mod time_provider;

// Re-exports
pub use observer::{snapshot_channel, ChannelObserver, FnObserver, StateObserver};
pub use random_source::RandomSource;
pub use time_provider::TimeProvider;

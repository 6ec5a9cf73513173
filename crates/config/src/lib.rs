pub mod env;
pub mod tracing_init;

pub use env::{AppConfig, ConfigOverrides, IssueQuerySettings};
pub use tracing_init::init_tracing;

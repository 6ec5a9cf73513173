pub mod client;
pub mod issue_sync;
pub mod models;
pub mod normalize;
pub mod query;

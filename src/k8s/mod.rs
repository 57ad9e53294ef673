pub mod client;
pub mod exec;
pub mod query;

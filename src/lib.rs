// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod config;
pub mod facade;
pub mod pipeline;
pub mod predictor;
pub mod store;
pub mod tables;

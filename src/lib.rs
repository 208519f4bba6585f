pub mod arena;
pub mod client;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod schedule;

// src/lib.rs

pub mod config;
pub mod error;
pub mod history;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod reasoning;
pub mod server;
pub mod structured;

pub use config::CONFIG;

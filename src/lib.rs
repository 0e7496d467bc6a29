pub mod command;
pub mod config;
pub mod errors;
pub mod orchestrator;
pub mod progress;
pub mod runner;
pub mod summary;
pub mod tee;
pub mod window;

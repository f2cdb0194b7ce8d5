#![forbid(unsafe_code)]

pub mod browse;
pub mod cli;
pub mod client;
pub mod config;
pub mod covers;
pub mod debounce;
pub mod error;
pub mod logging;
pub mod model;
pub mod orchestrator;
pub mod query;
pub mod render;
pub mod search;
pub mod session;
pub mod view;

//! Daily tracker for routine tasks, hour planning, goals, meals and water. Every day lives in its
//! own JSON file and can be edited from the command line or through a small HTTP API.
//!

pub mod cli;
pub mod fs;
pub mod planner;
pub mod server;
pub mod storage;
pub mod tracker;
pub mod utils;

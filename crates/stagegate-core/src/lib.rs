pub mod board;
pub mod catalog;
pub mod config;
pub mod cost;
pub mod decision;
pub mod error;
pub mod gate;
pub mod io;
pub mod paths;
pub mod status;
pub mod store;
pub mod tracker;
pub mod types;

pub use error::{GateError, Result};

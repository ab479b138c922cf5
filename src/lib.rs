//! jqmon - monitor an HPC job queue through a remote status service.
//!
//! The library holds everything that does not need a terminal: the value
//! model and normalization, the table projections, search, the HTTP client
//! and the ssh tunnel. The binary adds the CLI, plain output and the TUI.

pub mod display;
pub mod error;
pub mod formatting;
pub mod models;
pub mod query;
pub mod search;
pub mod tables;
pub mod tunnel;
pub mod utils;

pub use error::{Error, Result};

//! Project time tracking. Entries are kept in a plain CSV file, totals are derived on the fly,
//! a live timer records new entries and a PDF report can be exported at any time.
//!

pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod report;
pub mod store;
pub mod tracking;
pub mod utils;

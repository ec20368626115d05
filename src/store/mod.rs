//! Entries are kept by [entry_store::EntryStore]. The basic idea is:
//!  - There is a single CSV file holding every entry, one row per entry, no header.
//!  - The whole file is rewritten on every change, never appended to.
//!  - Totals per project are derived from the entries and never written anywhere.

pub mod backup;
pub mod entities;
pub mod entry_store;
pub mod filters;
pub mod totals;

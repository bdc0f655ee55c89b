//! packdex
//!
//! Extraction-and-synchronization engine for chat "pack" listings: parses
//! free-form message text into structured records, keeps an in-memory
//! cache reconciled against periodic re-scans, and answers multi-keyword
//! filtered queries over the current snapshot.
//!
//! The browser-driving scraper, HTTP routing, and admin UI are external
//! collaborators; this crate starts at the raw message batch they deliver.

pub mod config;
pub mod covers;
pub mod filter;
pub mod logging;
pub mod model;
pub mod parser;
pub mod source;
pub mod store;

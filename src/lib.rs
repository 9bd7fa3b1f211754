//! # jotdb
//!
//! An embedded, single-file JSON document store:
//! - Persistent map from string identifiers to JSON documents
//! - Whole-map flushes throttled by a save interval
//! - Background flushing that never blocks readers or writers
//! - Newline-delimited JSON backing file, tolerant of damaged records
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Database                              │
//! │   (open / get / put / insert / count / save / close / exit)  │
//! └──────────┬───────────────────┬───────────────────┬──────────┘
//!            │                   │                   │
//!            ▼                   ▼                   ▼
//!    ┌──────────────┐   ┌───────────────┐   ┌──────────────┐
//!    │ Document Map │   │ SaveScheduler │   │ FileBackend  │
//!    │   (Mutex)    │   │  (throttle +  │   │  (NDJSON +   │
//!    │              │   │   in-flight)  │   │   fsync)     │
//!    └──────────────┘   └───────┬───────┘   └──────▲───────┘
//!                               │ spawns           │
//!                               ▼                  │
//!                        background flush ─────────┘
//! ```
//!
//! The document map is the source of truth between flushes; the file is
//! guaranteed equal to it only at the instant a save completes.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod document;
pub mod error;
pub mod id;

mod backend;
mod scheduler;

pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::Config;
pub use document::{Document, ID_FIELD};
pub use engine::Database;
pub use error::{JotError, Result};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of jotdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

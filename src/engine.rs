//! Engine Module
//!
//! The storage engine that composes the document map, the persistence
//! backend and the save scheduler into the public database contract.
//!
//! ## Responsibilities
//! - Load the backing file into memory on open
//! - Serialize concurrent mutations of the document map
//! - Ask the scheduler after each mutation whether to flush in the background
//! - Run the final flush on close/exit

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::backend::FileBackend;
use crate::config::Config;
use crate::document::{self, Document};
use crate::error::{JotError, Result};
use crate::id;
use crate::scheduler::SaveScheduler;

/// The embedded document database
///
/// ## Concurrency Model
///
/// Two locks, always acquired in the same order (flush lock first):
///
/// - **Flush lock** (`backend`): whoever holds it is the only party writing
///   the backing file, so at most one flush runs at any instant. `None` once
///   the database is closed.
/// - **State lock** (`state`): guards the document map, the scheduler state
///   and the opened flag. Mutations hold it just long enough to update the
///   map and ask the scheduler for a decision; flushes hold it just long
///   enough to clone a snapshot. No caller ever waits behind a disk write.
///
/// A flush takes its snapshot after acquiring the flush lock, so the file
/// never regresses to content older than an image already written.
pub struct Database {
    shared: Arc<Shared>,
}

struct Shared {
    path: PathBuf,
    config: Config,

    /// Flush lock; `None` once the database is closed
    backend: Mutex<Option<FileBackend>>,

    /// Document map + scheduler + lifecycle flag
    state: Mutex<State>,
}

struct State {
    map: HashMap<String, Document>,
    scheduler: SaveScheduler,
    opened: bool,
}

impl Database {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open or create a database at `path` with the default configuration
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, Config::default())
    }

    /// Open or create a database at `path`
    ///
    /// The backing file is created if absent. Existing content is decoded
    /// into memory; undecodable content yields an empty starting map and a
    /// logged warning, never a construction failure.
    pub fn open_with(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Step 1: Open the backing file (the only fatal failure here)
        let mut backend = FileBackend::open(&path)?;

        // Step 2: Decode existing content into the document map
        let map = backend.load();
        info!(path = %path.display(), documents = map.len(), "database opened");

        // Step 3: Assemble engine state; the throttle window starts now
        let scheduler = SaveScheduler::new(config.save_interval, Instant::now());
        Ok(Self {
            shared: Arc::new(Shared {
                path,
                config,
                backend: Mutex::new(Some(backend)),
                state: Mutex::new(State {
                    map,
                    scheduler,
                    opened: true,
                }),
            }),
        })
    }

    /// Release the backing file without a final flush
    ///
    /// Documents written since the last flush stay in memory only; use
    /// [`exit`](Self::exit) (or rely on drop) for flush-then-close.
    pub fn close(&self) -> Result<()> {
        let mut slot = self.shared.backend.lock();
        self.shared.state.lock().opened = false;
        match slot.take() {
            Some(backend) => backend.close(),
            None => Ok(()),
        }
    }

    /// Flush once, then close
    ///
    /// Idempotent: calling it again once closed is a no-op. The final save
    /// runs with the flush lock held across both steps, so a still-running
    /// background flush can neither interleave with it nor rewrite the file
    /// afterwards. The handle is released even when the final save fails.
    pub fn exit(&self) -> Result<()> {
        let mut slot = self.shared.backend.lock();
        {
            let mut state = self.shared.state.lock();
            if !state.opened {
                return Ok(());
            }
            state.opened = false;
        }

        debug!(path = %self.shared.path.display(), "exiting, saving data");
        let flushed = self.shared.flush_locked(&mut slot);
        let closed = match slot.take() {
            Some(backend) => backend.close(),
            None => Ok(()),
        };
        flushed.and(closed)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Look up a document by identifier
    ///
    /// Returns a copy; the stored document cannot be reached through the
    /// returned value. Absence is `None`, never an error.
    pub fn get(&self, id: &str) -> Option<Document> {
        self.shared.state.lock().map.get(id).cloned()
    }

    /// Number of documents currently stored
    pub fn count(&self) -> usize {
        self.shared.state.lock().map.len()
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Store `doc` under `id`, replacing any previous document
    ///
    /// The identifier is stamped into the document under
    /// [`ID_FIELD`](crate::ID_FIELD) so the map key and the embedded id
    /// always agree. The document is moved into the map, so no reference
    /// held by the caller can alias the stored value. May start a background
    /// flush; never waits for one.
    pub fn put(&self, id: &str, mut doc: Document) -> Result<()> {
        document::stamp_id(&mut doc, id);

        let start_flush = {
            let mut state = self.shared.state.lock();
            if !state.opened {
                return Err(JotError::Closed);
            }
            state.map.insert(id.to_string(), doc);
            state.scheduler.try_begin(Instant::now())
        };

        if start_flush {
            self.spawn_flush();
        }
        Ok(())
    }

    /// Store any serializable value representing a JSON object
    ///
    /// Validated before it enters the map: a value that does not serialize
    /// to an object fails with [`JotError::InvalidDocument`], so a bad
    /// document can never abort a later background flush.
    pub fn put_value<T: Serialize>(&self, id: &str, value: &T) -> Result<()> {
        match serde_json::to_value(value) {
            Ok(serde_json::Value::Object(doc)) => self.put(id, doc),
            Ok(_) => Err(JotError::InvalidDocument),
            Err(source) => Err(JotError::Encode {
                id: id.to_string(),
                source,
            }),
        }
    }

    /// Store `doc` under a freshly generated identifier and return it
    pub fn insert(&self, doc: Document) -> Result<String> {
        let new_id = id::generate();
        self.put(&new_id, doc)?;
        Ok(new_id)
    }

    // =========================================================================
    // Flushing
    // =========================================================================

    /// Synchronously flush the document map to disk, bypassing the throttle
    ///
    /// Rewrites the whole backing file, truncates it to the new length and
    /// forces it durable before returning. The background scheduler runs
    /// this same routine. On success the throttle window restarts.
    pub fn save(&self) -> Result<()> {
        let mut slot = self.shared.backend.lock();
        self.shared.flush_locked(&mut slot)?;
        self.shared
            .state
            .lock()
            .scheduler
            .record_flush(Instant::now());
        Ok(())
    }

    /// Run one scheduled flush on a background thread
    ///
    /// The in-flight marker set by the scheduler is cleared whatever the
    /// outcome; the interval anchor advances only on success, so a failed
    /// flush is retried on a later mutation.
    fn spawn_flush(&self) {
        let shared = Arc::clone(&self.shared);
        thread::spawn(move || {
            let result = {
                let mut slot = shared.backend.lock();
                shared.flush_locked(&mut slot)
            };

            let success = result.is_ok();
            match result {
                Ok(()) => {}
                Err(JotError::Closed) => {
                    debug!("scheduled flush skipped, database already closed");
                }
                Err(err) => {
                    error!(%err, "background flush failed");
                }
            }

            shared.state.lock().scheduler.complete(Instant::now(), success);
        });
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// True once the save interval has elapsed since the last completed flush
    pub fn save_expired(&self) -> bool {
        self.shared.state.lock().scheduler.expired(Instant::now())
    }

    /// Number of completed flushes, scheduled and explicit
    pub fn flush_count(&self) -> u64 {
        self.shared.state.lock().scheduler.flushes_completed()
    }

    /// Whether the database is still open
    pub fn is_open(&self) -> bool {
        self.shared.state.lock().opened
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// The configuration the database was opened with
    pub fn config(&self) -> &Config {
        &self.shared.config
    }
}

impl Shared {
    /// Write the current map through an already-acquired flush lock
    ///
    /// The snapshot is cloned under the state lock only after the flush lock
    /// is held, so it is no older than the most recently completed `put` at
    /// that moment.
    fn flush_locked(&self, slot: &mut Option<FileBackend>) -> Result<()> {
        let backend = slot.as_mut().ok_or(JotError::Closed)?;
        let snapshot = self.state.lock().map.clone();
        debug!(path = %self.path.display(), documents = snapshot.len(), "saving entries to local file");
        backend.write_map(&snapshot)
    }
}

impl Drop for Database {
    /// Best-effort final flush when the owning scope releases the database
    fn drop(&mut self) {
        if let Err(err) = self.exit() {
            error!(%err, "final save on drop failed");
        }
    }
}

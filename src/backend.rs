//! Persistence Backend
//!
//! Encodes the document map to the backing file and decodes it back on load.
//!
//! ## File format
//!
//! Newline-delimited JSON: one document object per line, each carrying its
//! identifier in the [`ID_FIELD`](crate::ID_FIELD) field. Every flush
//! rewrites the whole file: seek to offset zero, write all records, truncate
//! to the new length, then fsync. There is no atomic-rename step, so a crash
//! in the middle of a rewrite can leave a partial file; load tolerates this
//! by skipping any line that fails to decode.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::document::{self, Document};
use crate::error::{JotError, Result};

/// Owns the open handle to the single backing file
pub(crate) struct FileBackend {
    path: PathBuf,
    file: File,
}

impl FileBackend {
    /// Open or create the backing file for read+write
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)
            .map_err(|source| JotError::StorageUnavailable {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Decode the file into a document map
    ///
    /// A line that fails to parse, or parses to something without a string
    /// identifier field, is skipped and logged. Damaged content never aborts
    /// the load: the worst case is an empty starting map.
    pub(crate) fn load(&mut self) -> HashMap<String, Document> {
        let mut map = HashMap::new();

        if let Err(err) = self.file.seek(SeekFrom::Start(0)) {
            warn!(path = %self.path.display(), %err, "cannot seek backing file, starting empty");
            return map;
        }

        let reader = BufReader::new(&self.file);
        for (index, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!(line = index + 1, %err, "read failed mid-load, keeping records so far");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let doc: Document = match serde_json::from_str(&line) {
                Ok(doc) => doc,
                Err(err) => {
                    warn!(line = index + 1, %err, "skipping undecodable record");
                    continue;
                }
            };

            let id = match document::embedded_id(&doc) {
                Some(id) => id.to_string(),
                None => {
                    warn!(line = index + 1, "skipping record without a string id field");
                    continue;
                }
            };
            map.insert(id, doc);
        }

        map
    }

    /// Rewrite the whole file from a map snapshot and force it durable
    ///
    /// Write discipline: rewrite from offset zero, truncate to the new
    /// length, then flush and fsync. The file is only guaranteed to match
    /// the map at the moment this returns.
    pub(crate) fn write_map(&mut self, map: &HashMap<String, Document>) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;

        let len = {
            let mut writer = BufWriter::new(&mut self.file);
            for (id, doc) in map {
                serde_json::to_writer(&mut writer, doc).map_err(|err| {
                    match err.io_error_kind() {
                        Some(kind) => JotError::Flush(io::Error::new(kind, err)),
                        None => JotError::Encode {
                            id: id.clone(),
                            source: err,
                        },
                    }
                })?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
            writer.stream_position()?
        };

        self.file.set_len(len)?;
        self.file.sync_all()?;

        debug!(path = %self.path.display(), documents = map.len(), bytes = len, "wrote document map");
        Ok(())
    }

    /// Final sync before the handle is dropped
    pub(crate) fn close(self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}

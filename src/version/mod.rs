// src/version/mod.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};
use tracing::debug;

/// Name of the registry file inside the data directory.
pub const VERSIONS_FILE: &str = "versions.json";

/// Registry of downloaded data snapshots, backed by a single JSON file
/// mapping `<filename>` → RFC 3339 timestamp.
///
/// Meant to be opened, queried and dropped around each access; nothing is
/// kept in memory between opens.
#[derive(Debug)]
pub struct Versions {
    path: PathBuf,
    entries: BTreeMap<String, DateTime<Utc>>,
}

impl Versions {
    /// Load the registry stored under `data_dir`. A missing file is an empty registry.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let path = data_dir.as_ref().join(VERSIONS_FILE);
        let entries = match File::open(&path) {
            Ok(f) => serde_json::from_reader(BufReader::new(f))
                .with_context(|| format!("parsing version registry {:?}", &path))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no version registry yet");
                BTreeMap::new()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("opening version registry {:?}", &path))
            }
        };
        Ok(Self { path, entries })
    }

    /// Version recorded for `filename`, if any.
    pub fn get(&self, filename: &str) -> Option<DateTime<Utc>> {
        self.entries.get(filename).copied()
    }

    /// Record `version` for `filename`, for whatever fetches the data files.
    /// Call [`Versions::save`] to persist.
    pub fn set(&mut self, filename: impl Into<String>, version: DateTime<Utc>) {
        self.entries.insert(filename.into(), version);
    }

    /// Write the registry back, via a temp file renamed over the old one.
    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating data directory {:?}", dir))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let file = File::create(&tmp)
                .with_context(|| format!("creating version registry {:?}", &tmp))?;
            let mut w = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut w, &self.entries)
                .context("serializing version registry")?;
            w.flush().context("flushing version registry")?;
        }
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing version registry {:?}", &self.path))?;
        Ok(())
    }
}

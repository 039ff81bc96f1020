// src/user_languages/mod.rs

mod record;

pub use record::{UserLanguage, UNKNOWN_SKILL};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use once_cell::unsync::OnceCell;
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::{config, tsv::TsvReader, version::Versions};

/// Name of the dataset table this module reads.
pub const TABLE: &str = "user_languages";

/// The self-reported skill levels of members in one language.
///
/// Iterating reopens the data file every time, so the same value can be
/// walked any number of times.
#[derive(Debug)]
pub struct UserLanguages {
    language: String,
    data_dir: PathBuf,
    version: OnceCell<Option<DateTime<Utc>>>,
}

impl UserLanguages {
    /// Accessor for `language` under the configured data directory.
    pub fn new(language: impl Into<String>) -> Self {
        Self::with_data_dir(language, config::data_dir())
    }

    pub fn with_data_dir(language: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            language: language.into(),
            data_dir: data_dir.into(),
            version: OnceCell::new(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// `<lang>_user_languages.tsv`
    pub fn filename(&self) -> String {
        format!("{}_{}.tsv", self.language, TABLE)
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(TABLE).join(self.filename())
    }

    /// Version of the downloaded data, looked up once and cached for the
    /// lifetime of this value. Lookup errors are returned and not cached.
    pub fn version(&self) -> Result<Option<DateTime<Utc>>> {
        self.version
            .get_or_try_init(|| {
                let versions = Versions::open(&self.data_dir)?;
                Ok(versions.get(&self.filename()))
            })
            .copied()
    }

    /// Stream the rows of the data file.
    ///
    /// A missing or unreadable file logs a warning and yields nothing.
    pub fn iter(&self) -> UserLanguagesIter {
        UserLanguagesIter::open(&self.path())
    }
}

impl<'a> IntoIterator for &'a UserLanguages {
    type Item = Result<UserLanguage>;
    type IntoIter = UserLanguagesIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over one pass of a data file. Owns the open file, which is
/// closed when the iterator is dropped.
pub struct UserLanguagesIter {
    path: PathBuf,
    rows: Option<TsvReader<BufReader<File>>>,
}

impl UserLanguagesIter {
    #[tracing::instrument(level = "debug", skip(path), fields(path = %path.display()))]
    fn open(path: &Path) -> Self {
        let rows = match File::open(path) {
            Ok(f) => Some(TsvReader::new(BufReader::new(f))),
            Err(e) => {
                debug!(error = %e, "open failed");
                warn_unavailable();
                None
            }
        };
        Self {
            path: path.to_path_buf(),
            rows,
        }
    }
}

fn warn_unavailable() {
    warn!("no data locally available for the '{}' table.", TABLE);
}

impl Iterator for UserLanguagesIter {
    type Item = Result<UserLanguage>;

    fn next(&mut self) -> Option<Self::Item> {
        let rows = self.rows.as_mut()?;
        match rows.next() {
            Some(Ok(row)) => {
                let line = row.line;
                Some(
                    row.into_fields()
                        .and_then(UserLanguage::from_fields)
                        .with_context(|| format!("{}:{}", self.path.display(), line)),
                )
            }
            Some(Err(e)) => {
                // Same outcome as a file that could not be opened at all.
                debug!(error = %e, line = rows.lines_read(), "read failed");
                warn_unavailable();
                self.rows = None;
                None
            }
            None => {
                self.rows = None;
                None
            }
        }
    }
}

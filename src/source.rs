use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;

use crate::record::Record;
use crate::Error;

/// Where the record set comes from. Called once at start up and again on every accepted
/// `reload`; the returned records become the next published snapshot.
pub trait RecordSource: Send + Sync {
    fn load(&self) -> Result<Vec<Record>, Error>;
}

impl<F> RecordSource for F
where
    F: Fn() -> Result<Vec<Record>, Error> + Send + Sync,
{
    fn load(&self) -> Result<Vec<Record>, Error> {
        self()
    }
}

#[derive(Debug, ThisError)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("malformed record set in {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A JSON document holding an array of flat objects with string values:
///
/// ```json
/// [
///     { "alias": "b-smith", "name": "smith bob c.", "email": "b-smith@example.edu" },
///     { "alias": "j-smith", "name": "smith john z.", "slack": "\"delete this\"" }
/// ]
/// ```
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> JsonFile {
        JsonFile { path: path.into() }
    }
}

impl RecordSource for JsonFile {
    fn load(&self) -> Result<Vec<Record>, Error> {
        let file = File::open(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;

        let records: Vec<Record> =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                SourceError::Malformed {
                    path: self.path.clone(),
                    source,
                }
            })?;

        Ok(records)
    }
}

/// Preformatted response text for `status` and `siteinfo`. Each text already ends with its
/// own terminating response line and is written back verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticText {
    pub status: Vec<String>,
    pub siteinfo: Vec<String>,
}

impl StaticText {
    /// Loads whichever texts have a file configured and falls back to the defaults for the rest.
    pub fn load(status: Option<&Path>, siteinfo: Option<&Path>) -> Result<StaticText, Error> {
        let defaults = StaticText::default();

        Ok(StaticText {
            status: match status {
                Some(path) => read_lines(path)?,
                None => defaults.status,
            },
            siteinfo: match siteinfo {
                Some(path) => read_lines(path)?,
                None => defaults.siteinfo,
            },
        })
    }
}

impl Default for StaticText {
    fn default() -> Self {
        StaticText {
            status: vec![String::from("201:Database ready, read-only.")],
            siteinfo: vec![
                format!("-200:0:version:{}", env!("CARGO_PKG_VERSION")),
                String::from("-200:1:server:rustph"),
                String::from("200:Ok."),
            ],
        }
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>, SourceError> {
    let text = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // `str::lines` already drops a trailing `\r` from each line.
    Ok(text.lines().map(str::to_string).collect())
}

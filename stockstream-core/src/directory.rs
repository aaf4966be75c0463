//! Ticker directory: company name to ticker symbol lookup.
//!
//! Loaded once at startup from a CSV reference file with a header row and
//! at least two columns: company name first, symbol second. Extra columns
//! are ignored. The directory is immutable after load.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to open ticker reference file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed ticker reference file: {0}")]
    Malformed(String),

    #[error("ticker reference file lists no companies")]
    Empty,
}

impl From<csv::Error> for DirectoryError {
    fn from(e: csv::Error) -> Self {
        DirectoryError::Malformed(e.to_string())
    }
}

/// One row of the reference file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerEntry {
    pub company: String,
    pub symbol: String,
}

/// Ordered company → symbol map.
#[derive(Debug, Clone)]
pub struct TickerDirectory {
    entries: Vec<TickerEntry>,
    index: HashMap<String, usize>,
}

impl TickerDirectory {
    /// Load the directory from a CSV file on disk.
    pub fn from_path(path: &Path) -> Result<Self, DirectoryError> {
        let file = File::open(path).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let directory = Self::from_reader(file)?;
        debug!(path = %path.display(), companies = directory.len(), "loaded ticker directory");
        Ok(directory)
    }

    /// Parse the directory from any CSV source.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DirectoryError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let header_len = rdr.headers()?.len();
        if header_len < 2 {
            return Err(DirectoryError::Malformed(format!(
                "expected at least two header columns (company name, symbol), found {header_len}"
            )));
        }

        let mut pairs = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            // Line 1 is the header.
            let line = i + 2;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let (Some(company), Some(symbol)) = (record.get(0), record.get(1)) else {
                return Err(DirectoryError::Malformed(format!(
                    "line {line}: expected company name and symbol"
                )));
            };
            if company.is_empty() || symbol.is_empty() {
                return Err(DirectoryError::Malformed(format!(
                    "line {line}: empty company name or symbol"
                )));
            }
            pairs.push((company.to_string(), symbol.to_string()));
        }

        if pairs.is_empty() {
            return Err(DirectoryError::Empty);
        }

        Ok(Self::from_pairs(pairs))
    }

    /// Build from `(company, symbol)` pairs. Later duplicates of a company name are dropped.
    pub fn from_pairs<I, C, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, S)>,
        C: Into<String>,
        S: Into<String>,
    {
        let mut entries = Vec::new();
        let mut index = HashMap::new();
        for (company, symbol) in pairs {
            let company = company.into();
            if index.contains_key(&company) {
                warn!(company = %company, "duplicate company in ticker directory, keeping first");
                continue;
            }
            index.insert(company.clone(), entries.len());
            entries.push(TickerEntry {
                company,
                symbol: symbol.into(),
            });
        }
        Self { entries, index }
    }

    /// Symbol for a company name, `None` if the name is not in the directory.
    pub fn lookup(&self, company: &str) -> Option<&str> {
        self.index
            .get(company)
            .map(|&i| self.entries[i].symbol.as_str())
    }

    /// Resolve several names, silently dropping the unknown ones.
    pub fn resolve_all<S: AsRef<str>>(&self, companies: &[S]) -> Vec<String> {
        companies
            .iter()
            .filter_map(|c| {
                let name = c.as_ref();
                let symbol = self.lookup(name);
                if symbol.is_none() {
                    debug!(company = name, "no ticker symbol for company, dropping");
                }
                symbol.map(str::to_string)
            })
            .collect()
    }

    /// Company names in file order (the selection list).
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.company.as_str()).collect()
    }

    pub fn entries(&self) -> &[TickerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

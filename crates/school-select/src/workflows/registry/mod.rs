//! School register import and the immutable registry handle shared by the
//! selection workflow.

mod domain;
mod normalizer;
mod parser;

pub use domain::{Region, SchoolCategory, SchoolRecord};

use parser::RegisterEntry;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registry handle loaded once per process and passed to every consumer.
pub type SharedRegistry = Arc<SchoolRegistry>;

#[derive(Debug)]
pub enum RegistryImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Empty,
}

impl std::fmt::Display for RegistryImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryImportError::Io(err) => write!(f, "failed to read school register: {}", err),
            RegistryImportError::Csv(err) => write!(f, "invalid school register CSV: {}", err),
            RegistryImportError::Empty => {
                write!(f, "school register contained no rows with a code and name")
            }
        }
    }
}

impl std::error::Error for RegistryImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryImportError::Io(err) => Some(err),
            RegistryImportError::Csv(err) => Some(err),
            RegistryImportError::Empty => None,
        }
    }
}

impl From<std::io::Error> for RegistryImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RegistryImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Read-only table of schools in register order, indexed by code.
#[derive(Debug, Clone, Default)]
pub struct SchoolRegistry {
    records: Vec<SchoolRecord>,
    by_code: HashMap<String, usize>,
}

impl SchoolRegistry {
    /// Build a registry, keeping the first record for any repeated code.
    pub fn new<I>(records: I) -> Self
    where
        I: IntoIterator<Item = SchoolRecord>,
    {
        let mut registry = Self::default();
        for record in records {
            registry.insert(record);
        }
        registry
    }

    fn insert(&mut self, record: SchoolRecord) -> bool {
        if self.by_code.contains_key(&record.code) {
            return false;
        }
        self.by_code.insert(record.code.clone(), self.records.len());
        self.records.push(record);
        true
    }

    pub fn records(&self) -> &[SchoolRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&SchoolRecord> {
        self.by_code
            .get(code.trim())
            .and_then(|index| self.records.get(*index))
    }

    /// Regions present in the register, sorted by key. The first spelling
    /// seen for a region is the one kept.
    pub fn regions(&self) -> Vec<Region> {
        self.records
            .iter()
            .filter(|record| !record.region.is_empty())
            .map(|record| record.region.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(self)
    }
}

/// Counts reported after an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub loaded: usize,
    pub skipped_incomplete: usize,
    pub skipped_duplicate: usize,
    /// Rows kept after replacing bytes that were not valid UTF-8.
    pub repaired_encoding: usize,
}

#[derive(Debug)]
pub struct RegistryImport {
    pub registry: SchoolRegistry,
    pub summary: ImportSummary,
}

/// Loads one or more register sheets exported as CSV.
pub struct RegistryImporter;

impl RegistryImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<RegistryImport, RegistryImportError> {
        Self::from_paths([path])
    }

    /// Each path is one sheet; sheets are concatenated in the order given.
    pub fn from_paths<I, P>(paths: I) -> Result<RegistryImport, RegistryImportError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut files = Vec::new();
        for path in paths {
            let path = path.as_ref();
            debug!(path = %path.display(), "opening register sheet");
            files.push(std::fs::File::open(path)?);
        }
        Self::from_readers(files)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<RegistryImport, RegistryImportError> {
        Self::from_readers([reader])
    }

    pub fn from_readers<I, R>(readers: I) -> Result<RegistryImport, RegistryImportError>
    where
        I: IntoIterator<Item = R>,
        R: Read,
    {
        let mut registry = SchoolRegistry::default();
        let mut summary = ImportSummary::default();

        for (sheet, reader) in readers.into_iter().enumerate() {
            let parsed = parser::parse_entries(reader)?;
            summary.repaired_encoding += parsed.repaired;
            for entry in parsed.entries {
                apply_entry(sheet, entry, &mut registry, &mut summary);
            }
        }

        if registry.is_empty() {
            return Err(RegistryImportError::Empty);
        }

        info!(
            loaded = summary.loaded,
            skipped_incomplete = summary.skipped_incomplete,
            skipped_duplicate = summary.skipped_duplicate,
            repaired_encoding = summary.repaired_encoding,
            "school register imported"
        );

        Ok(RegistryImport { registry, summary })
    }
}

fn apply_entry(
    sheet: usize,
    entry: RegisterEntry,
    registry: &mut SchoolRegistry,
    summary: &mut ImportSummary,
) {
    match entry {
        RegisterEntry::Complete(record) => {
            let code = record.code.clone();
            if registry.insert(record) {
                summary.loaded += 1;
            } else {
                warn!(sheet, %code, "duplicate school code skipped");
                summary.skipped_duplicate += 1;
            }
        }
        RegisterEntry::Incomplete { line } => {
            debug!(sheet, line, "register row without code or name skipped");
            summary.skipped_incomplete += 1;
        }
    }
}

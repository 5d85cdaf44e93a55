use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::normalizer::{clean_cell, normalize_header};

/// Geographic region as written in the register.
///
/// Equality, ordering and hashing use a canonical key (whitespace collapsed,
/// upper-cased), so "greater accra" and "Greater Accra" are the same region;
/// the cleaned label is what gets displayed and serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Region {
    label: String,
    key: String,
}

impl Region {
    pub fn new(raw: &str) -> Self {
        Self {
            label: clean_cell(raw),
            key: normalize_header(raw),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Region {}

impl Hash for Region {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for Region {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Region {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl From<String> for Region {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for Region {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Region> for String {
    fn from(value: Region) -> Self {
        value.label
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Register category grade. Only A, B and C carry rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SchoolCategory {
    A,
    B,
    C,
    D,
    Other(String),
    Unspecified,
}

impl SchoolCategory {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "A" => Self::A,
            "B" => Self::B,
            "C" => Self::C,
            "D" => Self::D,
            "" => Self::Unspecified,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::Other(value) => value,
            Self::Unspecified => "",
        }
    }

    /// Categories open to TVET-only applicants.
    pub fn admits_tvet_track(&self) -> bool {
        matches!(self, Self::A | Self::B | Self::C)
    }
}

impl From<String> for SchoolCategory {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<SchoolCategory> for String {
    fn from(value: SchoolCategory) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for SchoolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the school register. Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolRecord {
    pub code: String,
    pub name: String,
    pub region: Region,
    pub gender_admitted: String,
    pub category: SchoolCategory,
    pub cutoff: Option<String>,
    pub school_type: String,
    pub programmes_offered: String,
    pub remarks: String,
    pub boarding: Option<String>,
}

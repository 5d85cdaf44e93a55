use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::workflows::registry::{Region, SchoolRecord};

pub const MAX_PREFERRED_REGIONS: usize = 3;
pub const AGGREGATE_RANGE: RangeInclusive<u8> = 6..=30;
pub const MAIN_CHOICES: usize = 5;
pub const ALTERNATE_CHOICES: usize = 2;

/// Student preferences driving the eligibility filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityCriteria {
    pub aggregate_score: u8,
    pub gender: String,
    pub preferred_regions: Vec<Region>,
    #[serde(default)]
    pub career_keyword: Option<String>,
    #[serde(default)]
    pub tvet_only: bool,
    #[serde(default)]
    pub stem_only: bool,
}

impl EligibilityCriteria {
    /// Caller-side checks; the filter itself accepts any criteria.
    pub fn validate(&self) -> Result<(), CriteriaError> {
        let regions = self.distinct_regions();
        if regions.is_empty() {
            return Err(CriteriaError::NoPreferredRegions);
        }
        if regions.len() > MAX_PREFERRED_REGIONS {
            return Err(CriteriaError::TooManyRegions {
                max: MAX_PREFERRED_REGIONS,
                found: regions.len(),
            });
        }
        if !AGGREGATE_RANGE.contains(&self.aggregate_score) {
            return Err(CriteriaError::AggregateOutOfRange {
                found: self.aggregate_score,
            });
        }
        Ok(())
    }

    /// Career keyword with surrounding whitespace removed; blank is absent.
    pub fn career(&self) -> Option<&str> {
        self.career_keyword
            .as_deref()
            .map(str::trim)
            .filter(|keyword| !keyword.is_empty())
    }

    fn distinct_regions(&self) -> BTreeSet<&Region> {
        self.preferred_regions
            .iter()
            .filter(|region| !region.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CriteriaError {
    #[error("select at least one preferred region")]
    NoPreferredRegions,
    #[error("select at most {max} preferred regions (found {found})")]
    TooManyRegions { max: usize, found: usize },
    #[error("predicted aggregate must be between 6 and 30 (found {found})")]
    AggregateOutOfRange { found: u8 },
}

/// School codes a student picked from the candidate lists, in rank order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRequest {
    pub main_codes: Vec<String>,
    pub alternate_codes: Vec<String>,
}

/// Raised when a selection does not fill every main and alternate slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error(
    "You must select exactly {expected_main} main and {expected_alternates} alternative schools \
     (found {found_main} main, {found_alternates} alternative)"
)]
pub struct IncompleteSelection {
    pub expected_main: usize,
    pub expected_alternates: usize,
    pub found_main: usize,
    pub found_alternates: usize,
}

impl IncompleteSelection {
    pub fn check(found_main: usize, found_alternates: usize) -> Result<(), Self> {
        if found_main == MAIN_CHOICES && found_alternates == ALTERNATE_CHOICES {
            return Ok(());
        }
        Err(Self {
            expected_main: MAIN_CHOICES,
            expected_alternates: ALTERNATE_CHOICES,
            found_main,
            found_alternates,
        })
    }
}

/// Five ranked main choices plus two alternates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionBundle {
    main: Vec<SchoolRecord>,
    alternates: Vec<SchoolRecord>,
}

impl SelectionBundle {
    pub fn new(
        main: Vec<SchoolRecord>,
        alternates: Vec<SchoolRecord>,
    ) -> Result<Self, IncompleteSelection> {
        IncompleteSelection::check(main.len(), alternates.len())?;
        Ok(Self { main, alternates })
    }

    pub fn main(&self) -> &[SchoolRecord] {
        &self.main
    }

    pub fn alternates(&self) -> &[SchoolRecord] {
        &self.alternates
    }
}

mod cutoff;
mod keywords;

pub use cutoff::CutoffRange;
pub use keywords::KeywordSet;

use super::domain::EligibilityCriteria;
use crate::workflows::registry::{Region, SchoolRecord};
use serde::Serialize;

/// Conjunctive filter compiled from a student's criteria.
///
/// The filter never fails: criteria validation is the caller's job, and
/// unreadable register data (a malformed cutoff, say) counts as
/// unconstrained rather than excluding the school.
#[derive(Debug, Clone)]
pub struct EligibilityFilter {
    regions: Vec<Region>,
    aggregate_score: u8,
    gender: KeywordSet,
    career: KeywordSet,
    technical: Option<KeywordSet>,
    stem: Option<KeywordSet>,
}

impl EligibilityFilter {
    pub fn new(criteria: &EligibilityCriteria) -> Self {
        Self {
            regions: criteria.preferred_regions.clone(),
            aggregate_score: criteria.aggregate_score,
            gender: KeywordSet::single(&criteria.gender),
            career: criteria.career().map(KeywordSet::single).unwrap_or_default(),
            technical: criteria.tvet_only.then(KeywordSet::technical),
            stem: criteria.stem_only.then(KeywordSet::stem),
        }
    }

    pub fn matches(&self, record: &SchoolRecord) -> bool {
        self.regions.contains(&record.region)
            && self.gender.permits(&record.gender_admitted)
            && cutoff::admits(record.cutoff.as_deref(), self.aggregate_score)
            && self.technical.as_ref().map_or(true, |keywords| {
                record.category.admits_tvet_track() && keywords.matches(&record.school_type)
            })
            && self
                .stem
                .as_ref()
                .map_or(true, |keywords| keywords.matches(&record.programmes_offered))
            && self.career.permits(&record.programmes_offered)
    }

    /// Matching records in input order.
    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a SchoolRecord>
    where
        I: IntoIterator<Item = &'a SchoolRecord>,
    {
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect()
    }
}

/// Filtered schools plus the appendix-listed subset offered as alternates.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateSet<'a> {
    pub schools: Vec<&'a SchoolRecord>,
    pub appendix_pool: Vec<&'a SchoolRecord>,
}

impl<'a> CandidateSet<'a> {
    pub fn new<F>(schools: Vec<&'a SchoolRecord>, is_appendix_listed: F) -> Self
    where
        F: Fn(&SchoolRecord) -> bool,
    {
        let appendix_pool = schools
            .iter()
            .copied()
            .filter(|record| is_appendix_listed(record))
            .collect();
        Self {
            schools,
            appendix_pool,
        }
    }

    /// No school matched: the terminal "adjust your preferences" outcome.
    pub fn is_empty(&self) -> bool {
        self.schools.is_empty()
    }

    pub fn find(&self, code: &str) -> Option<&'a SchoolRecord> {
        find_code(&self.schools, code)
    }

    pub fn find_alternate(&self, code: &str) -> Option<&'a SchoolRecord> {
        find_code(&self.appendix_pool, code)
    }
}

fn find_code<'a>(pool: &[&'a SchoolRecord], code: &str) -> Option<&'a SchoolRecord> {
    let code = code.trim();
    pool.iter().copied().find(|record| record.code == code)
}

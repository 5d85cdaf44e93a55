use super::domain::SelectionBundle;
use super::eligibility::KeywordSet;
use crate::config::SelectionConfig;
use crate::workflows::registry::{SchoolCategory, SchoolRecord};

/// Validation failures raised by the selection guard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuidelineViolation {
    #[error("too many Category A schools: at most {max} allowed among main choices (found {found})")]
    TooManyCategoryA { max: usize, found: usize },
    #[error("too many Category B schools: at most {max} allowed among main choices (found {found})")]
    TooManyCategoryB { max: usize, found: usize },
    #[error("alternate not appendix-eligible: {name} ({code}) is not listed in {marker}")]
    AlternateNotAppendixEligible {
        code: String,
        name: String,
        marker: String,
    },
}

impl GuidelineViolation {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::TooManyCategoryA { .. } => "too_many_category_a",
            Self::TooManyCategoryB { .. } => "too_many_category_b",
            Self::AlternateNotAppendixEligible { .. } => "alternate_not_appendix_eligible",
        }
    }
}

pub const DEFAULT_APPENDIX_MARKER: &str = "APPENDIX 3";
const DEFAULT_MAX_CATEGORY_A: usize = 1;
const DEFAULT_MAX_CATEGORY_B: usize = 2;

/// Category caps and the remarks marker that flags alternate-eligible schools.
#[derive(Debug, Clone)]
pub struct GuidelinePolicy {
    max_category_a: usize,
    max_category_b: usize,
    appendix_marker: String,
    marker_keywords: KeywordSet,
}

impl GuidelinePolicy {
    pub fn new(appendix_marker: &str) -> Self {
        let trimmed = appendix_marker.trim();
        let marker = if trimmed.is_empty() {
            DEFAULT_APPENDIX_MARKER
        } else {
            trimmed
        };

        Self {
            max_category_a: DEFAULT_MAX_CATEGORY_A,
            max_category_b: DEFAULT_MAX_CATEGORY_B,
            appendix_marker: marker.to_string(),
            marker_keywords: KeywordSet::single(marker),
        }
    }

    pub fn with_caps(mut self, max_category_a: usize, max_category_b: usize) -> Self {
        self.max_category_a = max_category_a;
        self.max_category_b = max_category_b;
        self
    }

    pub fn max_category_a(&self) -> usize {
        self.max_category_a
    }

    pub fn max_category_b(&self) -> usize {
        self.max_category_b
    }

    pub fn appendix_marker(&self) -> &str {
        &self.appendix_marker
    }

    pub fn is_appendix_eligible(&self, record: &SchoolRecord) -> bool {
        self.marker_keywords.matches(&record.remarks)
    }
}

impl Default for GuidelinePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_APPENDIX_MARKER)
    }
}

impl From<&SelectionConfig> for GuidelinePolicy {
    fn from(config: &SelectionConfig) -> Self {
        Self::new(&config.appendix_marker)
    }
}

/// Pure check of a complete selection against the guideline policy.
#[derive(Debug, Clone, Default)]
pub struct SelectionGuard {
    policy: GuidelinePolicy,
}

impl SelectionGuard {
    pub fn with_policy(policy: GuidelinePolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &SelectionConfig) -> Self {
        Self::with_policy(GuidelinePolicy::from(config))
    }

    pub fn policy(&self) -> &GuidelinePolicy {
        &self.policy
    }

    /// First failing rule wins: Category A cap, Category B cap, then alternates.
    pub fn validate(&self, bundle: &SelectionBundle) -> Result<(), GuidelineViolation> {
        let category_a = count_category(bundle.main(), &SchoolCategory::A);
        if category_a > self.policy.max_category_a {
            return Err(GuidelineViolation::TooManyCategoryA {
                max: self.policy.max_category_a,
                found: category_a,
            });
        }

        let category_b = count_category(bundle.main(), &SchoolCategory::B);
        if category_b > self.policy.max_category_b {
            return Err(GuidelineViolation::TooManyCategoryB {
                max: self.policy.max_category_b,
                found: category_b,
            });
        }

        if let Some(record) = bundle
            .alternates()
            .iter()
            .find(|record| !self.policy.is_appendix_eligible(record))
        {
            return Err(GuidelineViolation::AlternateNotAppendixEligible {
                code: record.code.clone(),
                name: record.name.clone(),
                marker: self.policy.appendix_marker.clone(),
            });
        }

        Ok(())
    }
}

fn count_category(records: &[SchoolRecord], category: &SchoolCategory) -> usize {
    records
        .iter()
        .filter(|record| &record.category == category)
        .count()
}

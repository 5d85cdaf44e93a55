use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{
    CriteriaError, EligibilityCriteria, IncompleteSelection, SelectionBundle, SelectionRequest,
};
use super::eligibility::{CandidateSet, EligibilityFilter};
use super::form::{DocumentRenderer, RenderError, RenderedDocument, SelectionForm};
use super::guidelines::{GuidelineViolation, SelectionGuard};
use crate::config::SelectionConfig;
use crate::workflows::registry::{Region, SchoolRecord, SchoolRegistry, SharedRegistry};

pub const NO_MATCH_MESSAGE: &str =
    "No schools match your criteria. Please adjust your preferences.";

/// Which list a submitted code was expected to come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoicePool {
    Main,
    Alternate,
}

impl fmt::Display for ChoicePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoicePool::Main => f.write_str("eligible schools"),
            ChoicePool::Alternate => f.write_str("appendix-listed alternatives"),
        }
    }
}

/// Error raised by the selection service.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error(transparent)]
    Criteria(#[from] CriteriaError),
    #[error(transparent)]
    Incomplete(#[from] IncompleteSelection),
    #[error("invalid school code {code}: not in the list of {pool} shown")]
    UnknownSchool { code: String, pool: ChoicePool },
    #[error("school code {code} was chosen more than once")]
    DuplicateChoice { code: String },
    #[error(transparent)]
    Guideline(#[from] GuidelineViolation),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl SelectionError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Criteria(_) => "invalid_criteria",
            Self::Incomplete(_) => "incomplete_selection",
            Self::UnknownSchool { .. } => "unknown_school",
            Self::DuplicateChoice { .. } => "duplicate_choice",
            Self::Guideline(violation) => violation.reason_code(),
            Self::Render(_) => "render_failed",
        }
    }
}

/// Service composing the shared registry, eligibility filter, guard and renderer.
pub struct SchoolSelectionService<D> {
    registry: SharedRegistry,
    guard: Arc<SelectionGuard>,
    renderer: Arc<D>,
    selection_year: i32,
}

impl<D> SchoolSelectionService<D>
where
    D: DocumentRenderer + 'static,
{
    pub fn new(registry: SharedRegistry, renderer: Arc<D>, config: &SelectionConfig) -> Self {
        let guard = SelectionGuard::from_config(config);
        Self::with_guard(registry, guard, renderer, config.selection_year)
    }

    pub fn with_guard(
        registry: SharedRegistry,
        guard: SelectionGuard,
        renderer: Arc<D>,
        selection_year: i32,
    ) -> Self {
        Self {
            registry,
            guard: Arc::new(guard),
            renderer,
            selection_year,
        }
    }

    pub fn registry(&self) -> &SchoolRegistry {
        &self.registry
    }

    pub fn guard(&self) -> &SelectionGuard {
        &self.guard
    }

    pub fn regions(&self) -> Vec<Region> {
        self.registry.regions()
    }

    pub fn school(&self, code: &str) -> Option<&SchoolRecord> {
        self.registry.get(code)
    }

    /// Filter the register for a student. An empty set is a valid outcome.
    pub fn candidates(
        &self,
        criteria: &EligibilityCriteria,
    ) -> Result<CandidateSet<'_>, SelectionError> {
        criteria.validate()?;

        let filter = EligibilityFilter::new(criteria);
        let schools = filter.apply(self.registry.records());
        let policy = self.guard.policy();
        let candidates = CandidateSet::new(schools, |record| policy.is_appendix_eligible(record));

        info!(
            regions = criteria.preferred_regions.len(),
            tvet_only = criteria.tvet_only,
            stem_only = criteria.stem_only,
            matched = candidates.schools.len(),
            appendix = candidates.appendix_pool.len(),
            "eligibility filter applied"
        );

        Ok(candidates)
    }

    /// Resolve submitted codes against the candidate lists and check guidelines.
    ///
    /// Alternates resolve only against the appendix pool, so an alternate
    /// without the appendix marker surfaces here as [`SelectionError::UnknownSchool`]
    /// with [`ChoicePool::Alternate`]. The guard's own alternate check stays as
    /// defence in depth for bundles built outside this method.
    pub fn validate(
        &self,
        criteria: &EligibilityCriteria,
        request: &SelectionRequest,
    ) -> Result<SelectionBundle, SelectionError> {
        IncompleteSelection::check(request.main_codes.len(), request.alternate_codes.len())?;
        reject_duplicates(request)?;

        let candidates = self.candidates(criteria)?;
        let main = resolve(&request.main_codes, ChoicePool::Main, |code| {
            candidates.find(code)
        })?;
        let alternates = resolve(&request.alternate_codes, ChoicePool::Alternate, |code| {
            candidates.find_alternate(code)
        })?;

        let bundle = SelectionBundle::new(main, alternates)?;
        if let Err(violation) = self.guard.validate(&bundle) {
            debug!(reason = violation.reason_code(), "selection rejected");
            return Err(violation.into());
        }

        info!("selection passed guideline checks");
        Ok(bundle)
    }

    pub fn selection_form(
        &self,
        student_name: &str,
        criteria: &EligibilityCriteria,
        request: &SelectionRequest,
    ) -> Result<SelectionForm, SelectionError> {
        let bundle = self.validate(criteria, request)?;
        Ok(SelectionForm::build(
            student_name,
            criteria,
            &bundle,
            self.guard.policy(),
            self.selection_year,
        ))
    }

    /// Validate, lay out and render the printable form.
    pub fn form(
        &self,
        student_name: &str,
        criteria: &EligibilityCriteria,
        request: &SelectionRequest,
    ) -> Result<RenderedDocument, SelectionError> {
        let form = self.selection_form(student_name, criteria, request)?;
        let document = self.renderer.render(&form)?;
        info!(
            file_name = %document.file_name,
            bytes = document.bytes.len(),
            "selection form rendered"
        );
        Ok(document)
    }
}

fn reject_duplicates(request: &SelectionRequest) -> Result<(), SelectionError> {
    let mut seen = HashSet::new();
    for code in request.main_codes.iter().chain(&request.alternate_codes) {
        let code = code.trim();
        if !seen.insert(code) {
            return Err(SelectionError::DuplicateChoice {
                code: code.to_string(),
            });
        }
    }
    Ok(())
}

fn resolve<'a, F>(
    codes: &[String],
    pool: ChoicePool,
    lookup: F,
) -> Result<Vec<SchoolRecord>, SelectionError>
where
    F: Fn(&str) -> Option<&'a SchoolRecord>,
{
    codes
        .iter()
        .map(|code| {
            lookup(code)
                .cloned()
                .ok_or_else(|| SelectionError::UnknownSchool {
                    code: code.trim().to_string(),
                    pool,
                })
        })
        .collect()
}

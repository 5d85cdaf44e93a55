//! Eligibility filtering, guideline validation and the printable selection
//! form, plus the service and HTTP router composing them.

pub mod domain;
pub mod eligibility;
pub mod form;
pub mod guidelines;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    CriteriaError, EligibilityCriteria, IncompleteSelection, SelectionBundle, SelectionRequest,
    ALTERNATE_CHOICES, MAIN_CHOICES, MAX_PREFERRED_REGIONS,
};
pub use eligibility::{CandidateSet, CutoffRange, EligibilityFilter, KeywordSet};
pub use form::{
    BlockStyle, DocumentRenderer, FormBlock, PdfRenderer, PlainTextRenderer, RenderError,
    RenderedDocument, SelectionForm,
};
pub use guidelines::{
    GuidelinePolicy, GuidelineViolation, SelectionGuard, DEFAULT_APPENDIX_MARKER,
};
pub use router::{selection_router, FormRequest, ValidationRequest};
pub use service::{ChoicePool, SchoolSelectionService, SelectionError, NO_MATCH_MESSAGE};

use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::workflows::registry::{Region, SchoolCategory, SchoolRecord, SchoolRegistry};
use crate::workflows::selection::{
    selection_router, DocumentRenderer, EligibilityCriteria, GuidelinePolicy, PdfRenderer,
    PlainTextRenderer,
    RenderError, RenderedDocument, SchoolSelectionService, SelectionBundle, SelectionForm,
    SelectionGuard, SelectionRequest,
};

pub(super) const YEAR: i32 = 2025;

/// code, name, region, gender, category, cutoff, school type, programmes, remarks, boarding
type Row = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    Option<&'static str>,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
);

#[rustfmt::skip]
const ROWS: &[Row] = &[
    ("0010101", "Accra Academy", "Greater Accra", "Boys (Male)", "A", Some("6-10"), "SHS", "General Science, General Arts", "", "Boarding"),
    ("0010102", "Achimota School", "Greater Accra", "Mixed (Male/Female)", "A", Some("6-8"), "SHS", "General Science, Business", "", "Boarding"),
    ("0010103", "Accra Technical Training Centre", "Greater Accra", "Mixed (Male/Female)", "B", Some("10-24"), "TVET", "Electrical Engineering, Building Technology", "APPENDIX 3", "Day"),
    ("0010104", "Presbyterian Boys' Legon", "Greater Accra", "Boys (Male)", "B", Some("6-12"), "SHS", "General Science, Visual Arts", "", "Boarding"),
    ("0020201", "Prempeh College", "Ashanti", "Boys (Male)", "A", Some("6-9"), "SHS", "General Science, STEM", "", "Boarding"),
    ("0020202", "Kumasi Technical Institute", "Ashanti", "Mixed (Male/Female)", "C", Some("N/A"), "Technical", "Automotive Engineering, Welding", "APPENDIX 3", "Day/Boarding"),
    ("0020203", "Opoku Ware School", "Ashanti", "Boys (Male)", "B", Some("6-14"), "SHS", "General Arts, Business", "", "Boarding"),
    ("0020204", "Ejisuman SHS", "Ashanti", "Mixed (Male/Female)", "C", Some("10-30"), "SHS", "Agricultural Science, Home Economics", "Appendix 3 listed", "Day"),
    ("0030301", "Keta SHTS", "Volta", "Mixed (Male/Female)", "C", Some("12-28"), "SHS/TVET", "General Science, Technical Drawing", "APPENDIX 3", "Boarding"),
    ("0030302", "Mawuli School", "Volta", "Mixed (Male/Female)", "B", None, "SHS", "General Science, General Arts", "", "Boarding"),
    ("0030303", "Anlo Day SHS", "Volta", "Mixed (Male/Female)", "D", Some("15-30"), "SHS", "Business, Nursing Preparatory", "APPENDIX 3", "Day"),
    ("0040401", "Wesley Girls' High School", "Central", "Girls (Female)", "A", Some("6-8"), "SHS", "General Science, Home Economics", "", "Boarding"),
];

fn row_to_record(row: &Row) -> SchoolRecord {
    let (code, name, region, gender, category, cutoff, school_type, programmes, remarks, boarding) =
        *row;
    SchoolRecord {
        code: code.to_string(),
        name: name.to_string(),
        region: Region::new(region),
        gender_admitted: gender.to_string(),
        category: SchoolCategory::parse(category),
        cutoff: cutoff.map(str::to_string),
        school_type: school_type.to_string(),
        programmes_offered: programmes.to_string(),
        remarks: remarks.to_string(),
        boarding: Some(boarding.to_string()),
    }
}

pub(super) fn registry() -> SchoolRegistry {
    SchoolRegistry::new(ROWS.iter().map(row_to_record))
}

pub(super) fn criteria(aggregate: u8) -> EligibilityCriteria {
    EligibilityCriteria {
        aggregate_score: aggregate,
        gender: "Male".to_string(),
        preferred_regions: vec![
            Region::new("Greater Accra"),
            Region::new("Ashanti"),
            Region::new("Volta"),
        ],
        career_keyword: None,
        tvet_only: false,
        stem_only: false,
    }
}

/// Main: one A, two B, two C. Alternates drawn from the appendix pool.
pub(super) fn valid_request() -> SelectionRequest {
    SelectionRequest {
        main_codes: vec![
            "0010101".to_string(),
            "0010103".to_string(),
            "0010104".to_string(),
            "0020202".to_string(),
            "0030301".to_string(),
        ],
        alternate_codes: vec!["0020204".to_string(), "0030303".to_string()],
    }
}

pub(super) fn build_service() -> SchoolSelectionService<PlainTextRenderer> {
    SchoolSelectionService::with_guard(
        registry().into_shared(),
        SelectionGuard::default(),
        Arc::new(PlainTextRenderer::default()),
        YEAR,
    )
}

pub(super) fn build_pdf_service() -> SchoolSelectionService<PdfRenderer> {
    SchoolSelectionService::with_guard(
        registry().into_shared(),
        SelectionGuard::default(),
        Arc::new(PdfRenderer::default()),
        YEAR,
    )
}

/// Renderer standing in for a sink that cannot produce output.
pub(super) struct UnavailableRenderer;

impl DocumentRenderer for UnavailableRenderer {
    fn render(&self, _form: &SelectionForm) -> Result<RenderedDocument, RenderError> {
        Err(RenderError::Format(std::fmt::Error))
    }
}

pub(super) fn build_unavailable_service() -> SchoolSelectionService<UnavailableRenderer> {
    SchoolSelectionService::with_guard(
        registry().into_shared(),
        SelectionGuard::default(),
        Arc::new(UnavailableRenderer),
        YEAR,
    )
}

pub(super) fn school(code: &str, category: &str, remarks: &str) -> SchoolRecord {
    SchoolRecord {
        code: code.to_string(),
        name: format!("School {code}"),
        region: Region::new("Volta"),
        gender_admitted: "Mixed".to_string(),
        category: SchoolCategory::parse(category),
        cutoff: None,
        school_type: "SHS".to_string(),
        programmes_offered: "General Arts".to_string(),
        remarks: remarks.to_string(),
        boarding: None,
    }
}

pub(super) fn bundle(main_categories: [&str; 5], alternate_remarks: [&str; 2]) -> SelectionBundle {
    let main = main_categories
        .iter()
        .enumerate()
        .map(|(index, category)| school(&format!("M{index}"), category, ""))
        .collect();
    let alternates = alternate_remarks
        .iter()
        .enumerate()
        .map(|(index, remarks)| school(&format!("X{index}"), "C", remarks))
        .collect();
    SelectionBundle::new(main, alternates).expect("five main and two alternates")
}

pub(super) fn guard() -> SelectionGuard {
    SelectionGuard::with_policy(GuidelinePolicy::default())
}

pub(super) fn codes(records: &[&SchoolRecord]) -> Vec<String> {
    records.iter().map(|record| record.code.clone()).collect()
}

pub(super) fn selection_router_with_service<D>(service: SchoolSelectionService<D>) -> axum::Router
where
    D: DocumentRenderer + 'static,
{
    selection_router(Arc::new(service))
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body collects")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = read_body(response).await;
    serde_json::from_slice(&body).expect("json body")
}

mod pdf;
mod renderer;

pub use pdf::PdfRenderer;
pub use renderer::{DocumentRenderer, PlainTextRenderer, RenderError, RenderedDocument};

use super::domain::{EligibilityCriteria, SelectionBundle};
use super::guidelines::GuidelinePolicy;
use crate::workflows::registry::SchoolRecord;
use serde::Serialize;

const CLOSING_NOTE: &str = "Double-check your choices with a teacher or guardian. Best of luck!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStyle {
    Title,
    Field,
    Heading,
    Choice,
    Note,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormBlock {
    pub style: BlockStyle,
    pub text: String,
}

impl FormBlock {
    fn new(style: BlockStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

/// Printable selection form as an ordered list of styled text blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionForm {
    year: i32,
    blocks: Vec<FormBlock>,
}

impl SelectionForm {
    pub fn build(
        student_name: &str,
        criteria: &EligibilityCriteria,
        bundle: &SelectionBundle,
        policy: &GuidelinePolicy,
        year: i32,
    ) -> Self {
        let mut blocks = vec![
            FormBlock::new(BlockStyle::Title, format!("{year} BECE School Selection Form")),
            FormBlock::new(BlockStyle::Field, format!("Name: {}", student_name.trim())),
            FormBlock::new(BlockStyle::Field, format!("Gender: {}", criteria.gender.trim())),
            FormBlock::new(
                BlockStyle::Field,
                format!("Predicted Aggregate: {}", criteria.aggregate_score),
            ),
            FormBlock::new(
                BlockStyle::Field,
                format!("Career Interest: {}", criteria.career().unwrap_or_default()),
            ),
        ];

        let mut rank = 0;
        for record in bundle.main() {
            rank += 1;
            blocks.push(FormBlock::new(BlockStyle::Choice, choice_line(rank, record)));
        }

        blocks.push(FormBlock::new(
            BlockStyle::Heading,
            format!("Alternative Schools ({}):", policy.appendix_marker()),
        ));
        for record in bundle.alternates() {
            rank += 1;
            blocks.push(FormBlock::new(BlockStyle::Choice, choice_line(rank, record)));
        }

        blocks.push(FormBlock::new(BlockStyle::Note, CLOSING_NOTE));

        Self { year, blocks }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Download name without extension, shared by every renderer.
    pub fn file_stem(&self) -> String {
        format!("BECE_School_Selection_{}", self.year)
    }

    pub fn blocks(&self) -> &[FormBlock] {
        &self.blocks
    }

    pub fn choices(&self) -> impl Iterator<Item = &FormBlock> {
        self.blocks
            .iter()
            .filter(|block| block.style == BlockStyle::Choice)
    }
}

fn choice_line(rank: usize, record: &SchoolRecord) -> String {
    format!(
        "{rank}. {} | Code: {} | Category: {} | Boarding: {} | Programs: {}",
        record.name,
        record.code,
        record.category,
        record.boarding.as_deref().unwrap_or("-"),
        record.programmes_offered,
    )
}

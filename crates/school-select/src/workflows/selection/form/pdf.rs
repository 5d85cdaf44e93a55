use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use super::renderer::wrap;
use super::{BlockStyle, DocumentRenderer, RenderError, RenderedDocument, SelectionForm};

const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;
const DEFAULT_MARGIN_MM: f32 = 20.0;
const PT_TO_MM: f32 = 0.3528;
/// Average Helvetica glyph advance as a fraction of the font size.
const AVERAGE_GLYPH_EM: f32 = 0.52;

/// Font face and size used for one block style.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Face {
    font: BuiltinFont,
    size_pt: f32,
    space_before_mm: f32,
}

fn face_for(style: BlockStyle) -> Face {
    match style {
        BlockStyle::Title => Face {
            font: BuiltinFont::HelveticaBold,
            size_pt: 16.0,
            space_before_mm: 0.0,
        },
        BlockStyle::Field => Face {
            font: BuiltinFont::Helvetica,
            size_pt: 11.0,
            space_before_mm: 0.0,
        },
        BlockStyle::Heading => Face {
            font: BuiltinFont::HelveticaBold,
            size_pt: 12.0,
            space_before_mm: 5.0,
        },
        BlockStyle::Choice => Face {
            font: BuiltinFont::Helvetica,
            size_pt: 10.0,
            space_before_mm: 0.0,
        },
        BlockStyle::Note => Face {
            font: BuiltinFont::HelveticaOblique,
            size_pt: 10.0,
            space_before_mm: 8.0,
        },
    }
}

/// A4 PDF layout of the form using the built-in Helvetica faces.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    margin_mm: f32,
}

impl PdfRenderer {
    pub fn with_margin(margin_mm: f32) -> Self {
        Self {
            margin_mm: margin_mm.clamp(5.0, 60.0),
        }
    }

    fn usable_width(&self) -> f32 {
        A4_WIDTH_MM - 2.0 * self.margin_mm
    }

    /// Characters that fit on one line at `size_pt`, estimated from the
    /// average glyph width.
    fn line_capacity(&self, size_pt: f32) -> usize {
        let glyph_mm = size_pt * AVERAGE_GLYPH_EM * PT_TO_MM;
        (self.usable_width() / glyph_mm).floor().max(20.0) as usize
    }

    fn centered_x(&self, text: &str, size_pt: f32) -> f32 {
        let width = text.chars().count() as f32 * size_pt * AVERAGE_GLYPH_EM * PT_TO_MM;
        ((A4_WIDTH_MM - width) / 2.0).max(self.margin_mm)
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::with_margin(DEFAULT_MARGIN_MM)
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self, RenderError> {
        Ok(Self {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(pdf_error)?,
            italic: doc
                .add_builtin_font(BuiltinFont::HelveticaOblique)
                .map_err(pdf_error)?,
        })
    }

    fn get(&self, font: BuiltinFont) -> &IndirectFontRef {
        match font {
            BuiltinFont::HelveticaBold => &self.bold,
            BuiltinFont::HelveticaOblique => &self.italic,
            _ => &self.regular,
        }
    }
}

/// Current layer and baseline, starting a fresh page when the margin is hit.
struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y_mm: f32,
    margin_mm: f32,
    pages: usize,
}

impl PageCursor<'_> {
    fn advance(&mut self, height_mm: f32) {
        if self.y_mm - height_mm < self.margin_mm {
            self.pages += 1;
            let (page, layer) = self.doc.add_page(
                Mm(A4_WIDTH_MM),
                Mm(A4_HEIGHT_MM),
                format!("Page {}", self.pages),
            );
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y_mm = A4_HEIGHT_MM - self.margin_mm;
        }
        self.y_mm -= height_mm;
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, form: &SelectionForm) -> Result<RenderedDocument, RenderError> {
        let title = match form.blocks().first() {
            Some(block) => block.text.clone(),
            None => return Err(RenderError::EmptyForm),
        };

        let (doc, page, layer) =
            PdfDocument::new(title.as_str(), Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), "Page 1");
        {
            let fonts = Fonts::load(&doc)?;
            let mut cursor = PageCursor {
                doc: &doc,
                layer: doc.get_page(page).get_layer(layer),
                y_mm: A4_HEIGHT_MM - self.margin_mm,
                margin_mm: self.margin_mm,
                pages: 1,
            };

            for block in form.blocks() {
                let face = face_for(block.style);
                let line_height = face.size_pt * PT_TO_MM * 1.5;
                cursor.y_mm -= face.space_before_mm;

                let lines = match block.style {
                    BlockStyle::Title | BlockStyle::Field => vec![block.text.clone()],
                    _ => wrap(&block.text, self.line_capacity(face.size_pt)),
                };
                for line in lines {
                    cursor.advance(line_height);
                    let x = if block.style == BlockStyle::Title {
                        self.centered_x(&line, face.size_pt)
                    } else {
                        self.margin_mm
                    };
                    cursor.layer.use_text(
                        line,
                        face.size_pt,
                        Mm(x),
                        Mm(cursor.y_mm),
                        fonts.get(face.font),
                    );
                }

                if block.style == BlockStyle::Title {
                    cursor.y_mm -= line_height;
                }
            }
        }

        let bytes = doc.save_to_bytes().map_err(pdf_error)?;

        Ok(RenderedDocument {
            file_name: format!("{}.pdf", form.file_stem()),
            content_type: mime::APPLICATION_PDF,
            bytes,
        })
    }
}

fn pdf_error(err: printpdf::Error) -> RenderError {
    RenderError::Pdf(format!("{err:?}"))
}

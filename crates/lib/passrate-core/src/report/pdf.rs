use std::{error::Error, fmt};

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use super::{REPORT_COLUMNS, ReportHeading, ReportRow, SIGNATURE_LINES};

// Layout is expressed in millimetres from the top-left corner and converted
// to PDF points when emitted.
const PT_PER_MM: f32 = 72.0 / 25.4;
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 14.0;
const TOP_MARGIN_MM: f32 = 15.0;
const BOTTOM_LIMIT_MM: f32 = PAGE_HEIGHT_MM - 15.0;
const TITLE_Y_MM: f32 = 22.0;
const SUBTITLE_Y_MM: f32 = 30.0;
const TABLE_START_MM: f32 = 40.0;
const ROW_HEIGHT_MM: f32 = 8.0;
const CELL_PADDING_MM: f32 = 1.8;
const BASELINE_OFFSET_MM: f32 = 5.4;
const SIGNATURE_GAP_MM: f32 = 10.0;
const COLUMN_WIDTHS_MM: [f32; 6] = [46.0, 24.0, 32.0, 28.0, 26.0, 26.0];

const TITLE_SIZE: f32 = 18.0;
const SUBTITLE_SIZE: f32 = 14.0;
const SIGNATURE_SIZE: f32 = 14.0;
const CELL_SIZE: f32 = 9.0;
// Average Helvetica advance width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.52;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";
const HEADER_FILL: [f32; 3] = [41.0 / 255.0, 128.0 / 255.0, 185.0 / 255.0];
const STRIPE_FILL: [f32; 3] = [0.96, 0.96, 0.96];

#[derive(Debug)]
pub enum ExportError {
    Pdf(lopdf::Error),
    Io(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf(err) => write!(f, "PDF rendering error: {err}"),
            Self::Io(err) => write!(f, "PDF write error: {err}"),
        }
    }
}

impl Error for ExportError {}

impl From<lopdf::Error> for ExportError {
    fn from(err: lopdf::Error) -> Self {
        Self::Pdf(err)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Result of an export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Rendered(Vec<u8>),
    /// The filtered list was empty; no document was produced.
    NothingToExport,
}

/// Renders the heading, the results table and the signature lines.
///
/// # Errors
/// Returns `ExportError` if the document cannot be encoded.
pub fn render_pdf(heading: &ReportHeading, rows: &[ReportRow]) -> Result<ExportOutcome, ExportError> {
    if rows.is_empty() {
        return Ok(ExportOutcome::NothingToExport);
    }
    let pages = lay_out(heading, rows);
    Ok(ExportOutcome::Rendered(write_document(pages)?))
}

fn lay_out(heading: &ReportHeading, rows: &[ReportRow]) -> Vec<Vec<Operation>> {
    let mut pages = Vec::new();
    let mut page = PageOps::default();
    page.text(FONT_REGULAR, TITLE_SIZE, MARGIN_MM, TITLE_Y_MM, &heading.institution);
    page.text(FONT_REGULAR, SUBTITLE_SIZE, MARGIN_MM, SUBTITLE_Y_MM, &heading.title);

    let mut y = TABLE_START_MM;
    page.header_row(y);
    y += ROW_HEIGHT_MM;

    for (index, row) in rows.iter().enumerate() {
        if y + ROW_HEIGHT_MM > BOTTOM_LIMIT_MM {
            pages.push(std::mem::take(&mut page).ops);
            y = TOP_MARGIN_MM;
            page.header_row(y);
            y += ROW_HEIGHT_MM;
        }
        page.body_row(y, index % 2 == 1, row);
        y += ROW_HEIGHT_MM;
    }

    let mut signature_y = y + SIGNATURE_GAP_MM;
    if signature_y + SIGNATURE_GAP_MM > BOTTOM_LIMIT_MM {
        pages.push(std::mem::take(&mut page).ops);
        signature_y = TOP_MARGIN_MM + SIGNATURE_GAP_MM;
    }
    for line in SIGNATURE_LINES {
        page.text(FONT_REGULAR, SIGNATURE_SIZE, MARGIN_MM, signature_y, line);
        signature_y += SIGNATURE_GAP_MM;
    }
    pages.push(page.ops);
    pages
}

#[derive(Default)]
struct PageOps {
    ops: Vec<Operation>,
}

impl PageOps {
    fn text(&mut self, font: &str, size: f32, x_mm: f32, baseline_mm: f32, text: &str) {
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.into(), size.into()]),
            Operation::new("Td", vec![to_x(x_mm).into(), to_y(baseline_mm).into()]),
            Operation::new("Tj", vec![Object::string_literal(encode_text(text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn fill_rect(&mut self, color: [f32; 3], x_mm: f32, top_mm: f32, width_mm: f32, height_mm: f32) {
        let [r, g, b] = color;
        self.ops.extend([
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new(
                "re",
                vec![
                    to_x(x_mm).into(),
                    to_y(top_mm + height_mm).into(),
                    (width_mm * PT_PER_MM).into(),
                    (height_mm * PT_PER_MM).into(),
                ],
            ),
            Operation::new("f", vec![]),
        ]);
    }

    fn set_text_color(&mut self, gray: f32) {
        self.ops.push(Operation::new("g", vec![gray.into()]));
    }

    fn header_row(&mut self, top_mm: f32) {
        self.fill_rect(HEADER_FILL, MARGIN_MM, top_mm, table_width(), ROW_HEIGHT_MM);
        self.set_text_color(1.0);
        self.cells(FONT_BOLD, top_mm, REPORT_COLUMNS);
        self.set_text_color(0.0);
    }

    fn body_row(&mut self, top_mm: f32, striped: bool, row: &ReportRow) {
        if striped {
            self.fill_rect(STRIPE_FILL, MARGIN_MM, top_mm, table_width(), ROW_HEIGHT_MM);
        }
        self.set_text_color(0.0);
        self.cells(FONT_REGULAR, top_mm, row.cells());
    }

    fn cells(&mut self, font: &str, top_mm: f32, cells: [&str; 6]) {
        let mut x = MARGIN_MM;
        for (cell, width) in cells.into_iter().zip(COLUMN_WIDTHS_MM) {
            let fitted = fit_text(cell, width - 2.0 * CELL_PADDING_MM, CELL_SIZE);
            self.text(font, CELL_SIZE, x + CELL_PADDING_MM, top_mm + BASELINE_OFFSET_MM, &fitted);
            x += width;
        }
    }
}

fn write_document(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(font_dictionary("Helvetica"));
    let bold_id = doc.add_object(font_dictionary("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_REGULAR => regular_id,
            FONT_BOLD => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
    let media_box: Vec<Object> = vec![
        Object::Integer(0),
        Object::Integer(0),
        (PAGE_WIDTH_MM * PT_PER_MM).into(),
        (PAGE_HEIGHT_MM * PT_PER_MM).into(),
    ];
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => media_box,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn font_dictionary(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn table_width() -> f32 {
    COLUMN_WIDTHS_MM.iter().sum()
}

fn to_x(x_mm: f32) -> f32 {
    x_mm * PT_PER_MM
}

fn to_y(y_mm: f32) -> f32 {
    (PAGE_HEIGHT_MM - y_mm) * PT_PER_MM
}

/// Truncates with an ellipsis so the text stays inside its cell.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn fit_text(text: &str, max_width_mm: f32, size: f32) -> String {
    let glyph_mm = size * AVG_GLYPH_WIDTH / PT_PER_MM;
    let capacity = (max_width_mm / glyph_mm).floor().max(1.0);
    if text.chars().count() as f32 <= capacity {
        return text.to_string();
    }
    let keep = capacity.max(4.0) as usize - 3;
    let mut fitted: String = text.chars().take(keep).collect();
    fitted.push_str("...");
    fitted
}

/// Built-in fonts only cover Latin-1; anything else prints as `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| u8::try_from(u32::from(ch)).unwrap_or(b'?'))
        .collect()
}

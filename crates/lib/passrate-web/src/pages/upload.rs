use axum::extract::multipart::MultipartError;
use axum::extract::{Form, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use passrate_core::control::ControlError;
use passrate_core::control::ingest::{INVALID_FORMAT_MESSAGE, records_from_json};
use passrate_core::report::ReportHeading;
use passrate_store::models::TeacherResult;
use serde::Deserialize;
use serde_json::Value;
use surrealdb::Connection;
use tracing::{error, info, warn};

use super::layout::{document, escape_html};
use super::search::APPENDED_NOTICE;
use super::Notice;
use crate::AppState;

pub const FILE_FIELD: &str = "file";
const DOWNLOAD_FILE_NAME: &str = "new_teacher_data.json";
const EMPTY_WORKBOOK_MESSAGE: &str = "Excel file is empty or invalid.";

/// Converted records ready for preview, download, or append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedSheet {
    /// Pretty-printed JSON array, posted back verbatim by the actions.
    pub json: String,
    pub records: usize,
}

impl ConvertedSheet {
    fn from_records(records: &[TeacherResult]) -> Result<Self, serde_json::Error> {
        Ok(Self {
            json: serde_json::to_string_pretty(records)?,
            records: records.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadView {
    Empty,
    Converted(ConvertedSheet),
}

/// Complete view state of the upload page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPage {
    pub heading: ReportHeading,
    pub notices: Vec<Notice>,
    pub view: UploadView,
}

impl UploadPage {
    fn new(heading: &ReportHeading) -> Self {
        Self {
            heading: heading.clone(),
            notices: Vec::new(),
            view: UploadView::Empty,
        }
    }

    fn with_notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }

    fn respond(&self, status: StatusCode) -> Response {
        (status, Html(render_upload(self))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct PayloadForm {
    #[serde(default)]
    pub payload: String,
}

pub async fn upload_form<C>(State(state): State<AppState<C>>) -> Html<String>
where
    C: Connection + Send + Sync + 'static,
{
    Html(render_upload(&UploadPage::new(state.control.heading())))
}

pub async fn convert_upload<C>(
    State(state): State<AppState<C>>,
    mut multipart: Multipart,
) -> Response
where
    C: Connection + Send + Sync + 'static,
{
    let page = UploadPage::new(state.control.heading());
    let bytes = match read_file_field(&mut multipart).await {
        Ok(Some(bytes)) if !bytes.is_empty() => bytes,
        Ok(_) => {
            return page
                .with_notice(Notice::warning("Please select an Excel file."))
                .respond(StatusCode::BAD_REQUEST);
        }
        Err(err) => {
            warn!(error = %err, "upload body could not be read");
            return page
                .with_notice(Notice::error(EMPTY_WORKBOOK_MESSAGE))
                .respond(StatusCode::BAD_REQUEST);
        }
    };

    let report = match state.control.convert_workbook(bytes).await {
        Ok(report) => report,
        Err(ControlError::Normalize(err)) => {
            return page
                .with_notice(Notice::error(err.to_string()))
                .respond(StatusCode::BAD_REQUEST);
        }
        Err(ControlError::Workbook(err)) => {
            warn!(error = %err, "uploaded workbook could not be read");
            return page
                .with_notice(Notice::error(EMPTY_WORKBOOK_MESSAGE))
                .respond(StatusCode::BAD_REQUEST);
        }
        Err(err) => {
            error!(error = %err, "error converting workbook");
            return page
                .with_notice(Notice::error("Failed to convert the Excel file."))
                .respond(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let sheet = match ConvertedSheet::from_records(&report.records) {
        Ok(sheet) => sheet,
        Err(err) => {
            error!(error = %err, "error serializing converted records");
            return page
                .with_notice(Notice::error("Failed to convert the Excel file."))
                .respond(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut page = page.with_notice(Notice::success("Excel file converted to JSON successfully!"));
    if report.dropped_rows > 0 {
        page.notices.push(Notice::warning(format!(
            "{} of {} row(s) list no teacher and were left out.",
            report.dropped_rows, report.source_rows
        )));
    }
    page.view = UploadView::Converted(sheet);
    page.respond(StatusCode::OK)
}

pub async fn download_json<C>(
    State(state): State<AppState<C>>,
    Form(form): Form<PayloadForm>,
) -> Response
where
    C: Connection + Send + Sync + 'static,
{
    let page = UploadPage::new(state.control.heading());
    let value = match parse_payload(&form.payload) {
        Ok(value) => value,
        Err(message) => {
            return page
                .with_notice(Notice::warning(message))
                .respond(StatusCode::BAD_REQUEST);
        }
    };
    match serde_json::to_string_pretty(&value) {
        Ok(json) => (
            [
                (header::CONTENT_TYPE, "application/json".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\""),
                ),
            ],
            json,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "error serializing download");
            page.with_notice(Notice::error("Failed to prepare the JSON download."))
                .respond(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn append_upload<C>(
    State(state): State<AppState<C>>,
    Form(form): Form<PayloadForm>,
) -> Response
where
    C: Connection + Send + Sync + 'static,
{
    let mut page = UploadPage::new(state.control.heading());
    let value = match parse_payload(&form.payload) {
        Ok(value) => value,
        Err(message) => {
            return page
                .with_notice(Notice::warning(message))
                .respond(StatusCode::BAD_REQUEST);
        }
    };
    page.view = preview_of(&form.payload, &value);

    match state.control.append_json(value).await {
        Ok(report) => {
            info!(appended = report.appended, "upload appended");
            Redirect::to(&format!("/?notice={APPENDED_NOTICE}")).into_response()
        }
        Err(ControlError::InvalidInput(message)) => page
            .with_notice(Notice::error(format!("Error: {message}")))
            .respond(StatusCode::BAD_REQUEST),
        Err(err) => {
            error!(error = %err, "error appending data");
            page.with_notice(Notice::error("Error: Failed to append teacher data"))
                .respond(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Option<Vec<u8>>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            return Ok(Some(field.bytes().await?.to_vec()));
        }
    }
    Ok(None)
}

fn parse_payload(payload: &str) -> Result<Value, String> {
    if payload.trim().is_empty() {
        return Err("No JSON data to submit.".to_string());
    }
    serde_json::from_str(payload).map_err(|_| INVALID_FORMAT_MESSAGE.to_string())
}

fn preview_of(payload: &str, value: &Value) -> UploadView {
    records_from_json(value.clone()).map_or(UploadView::Empty, |records| {
        UploadView::Converted(ConvertedSheet {
            json: payload.to_string(),
            records: records.len(),
        })
    })
}

/// Renders the upload page for a view state.
#[must_use]
pub fn render_upload(page: &UploadPage) -> String {
    let mut body = String::from(
        "<section class=\"panel\">\n<h2 class=\"centered\">Excel to JSON Converter</h2>\n\
         <form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\n",
    );
    body.push_str(&format!(
        "<input type=\"file\" name=\"{FILE_FIELD}\" accept=\".xls,.xlsx\">\n\
         <button type=\"submit\">Convert</button>\n</form>\n"
    ));
    match &page.view {
        UploadView::Empty => body.push_str(
            "<p class=\"centered\">Converted JSON data will be displayed here.</p>\n",
        ),
        UploadView::Converted(sheet) => body.push_str(&render_preview(sheet)),
    }
    body.push_str("</section>\n<p class=\"centered\"><a href=\"/\">Back to Home</a></p>\n");
    document(&page.heading, "Excel to JSON Converter", &page.notices, &body)
}

fn render_preview(sheet: &ConvertedSheet) -> String {
    let mut html = format!(
        "<form method=\"post\" action=\"/upload/append\">\n\
         <p>{} record(s) ready.</p>\n\
         <textarea id=\"payload\" name=\"payload\" readonly>{}</textarea>\n",
        sheet.records,
        escape_html(&sheet.json)
    );
    html.push_str(
        "<div class=\"centered\">\n\
         <button type=\"button\" onclick=\"navigator.clipboard.writeText(document.getElementById('payload').value)\">Copy JSON Data</button>\n\
         <button type=\"submit\" formaction=\"/upload/download\">Download JSON Data</button>\n\
         </div>\n\
         <div class=\"centered\"><button type=\"submit\" class=\"danger\">Append Data</button></div>\n\
         </form>\n",
    );
    html
}

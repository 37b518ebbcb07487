use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use passrate_core::control::ControlError;
use passrate_core::filter::SearchCriteria;
use passrate_core::report::{ExportOutcome, REPORT_COLUMNS, ReportHeading, ReportRow};
use passrate_store::models::{SubjectType, TeacherResult};
use serde::Deserialize;
use surrealdb::Connection;
use tracing::{error, info, warn};

use super::layout::{document, escape_html};
use super::Notice;
use crate::AppState;

pub const DEPARTMENTS: [&str; 11] = [
    "CE", "ME", "EEE", "ECE", "CSE", "IT", "AIML", "AI&DS", "CS", "DS", "IOT",
];
pub const DESIGNATIONS: [&str; 3] = ["Professor", "Associate Professor", "Assistant Professor"];

pub const APPENDED_NOTICE: &str = "appended";
const EXPORT_PATH: &str = "/export.pdf";
const EXPORT_FILE_NAME: &str = "teacher_details.pdf";

/// Query string accepted by the search page and the export link.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub emp_code: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub subject_type: Option<String>,
    #[serde(default)]
    pub notice: Option<String>,
}

impl SearchQuery {
    /// Splits the query into filter criteria plus any notice about values
    /// that could not be used.
    pub fn criteria(&self) -> (SearchCriteria, Option<Notice>) {
        let (subject_type, notice) = match self.subject_type.as_deref().map(str::trim) {
            None | Some("") => (None, None),
            Some(raw) => match raw.parse::<SubjectType>() {
                Ok(subject_type) => (Some(subject_type), None),
                Err(err) => (None, Some(Notice::warning(format!("{err}; showing all subject types.")))),
            },
        };
        let criteria = SearchCriteria {
            emp_code: self.emp_code.clone(),
            department: self.department.clone(),
            designation: self.designation.clone(),
            subject_type,
        };
        (criteria, notice)
    }

    fn form(&self) -> SearchForm {
        SearchForm {
            emp_code: self.emp_code.clone().unwrap_or_default(),
            department: self.department.clone().unwrap_or_default(),
            designation: self.designation.clone().unwrap_or_default(),
            subject_type: self
                .subject_type
                .as_deref()
                .and_then(|raw| raw.trim().parse::<SubjectType>().ok()),
        }
    }

    fn export_href(&self) -> String {
        let pairs: Vec<(&str, &str)> = [
            ("empCode", &self.emp_code),
            ("department", &self.department),
            ("designation", &self.designation),
            ("subjectType", &self.subject_type),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|value| !value.trim().is_empty())
                .map(|value| (key, value))
        })
        .collect();
        match serde_urlencoded::to_string(&pairs) {
            Ok(query) if !query.is_empty() => format!("{EXPORT_PATH}?{query}"),
            _ => EXPORT_PATH.to_string(),
        }
    }
}

/// Values echoed back into the search form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchForm {
    pub emp_code: String,
    pub department: String,
    pub designation: String,
    pub subject_type: Option<SubjectType>,
}

/// What the results area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Rows(Vec<ReportRow>),
    NoResults,
    Unavailable,
}

/// Complete view state of the search page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub heading: ReportHeading,
    pub form: SearchForm,
    pub export_href: String,
    pub notices: Vec<Notice>,
    pub listing: Listing,
}

impl SearchPage {
    fn for_query(heading: &ReportHeading, query: &SearchQuery) -> Self {
        Self {
            heading: heading.clone(),
            form: query.form(),
            export_href: query.export_href(),
            notices: Vec::new(),
            listing: Listing::NoResults,
        }
    }
}

pub async fn search_page<C>(
    State(state): State<AppState<C>>,
    Query(query): Query<SearchQuery>,
) -> Response
where
    C: Connection + Send + Sync + 'static,
{
    let (criteria, criteria_notice) = query.criteria();
    let mut page = SearchPage::for_query(state.control.heading(), &query);
    if query.notice.as_deref() == Some(APPENDED_NOTICE) {
        page.notices.push(Notice::success("Data appended successfully!"));
    }
    page.notices.extend(criteria_notice);

    match state.control.search(&criteria).await {
        Ok(results) => {
            if !criteria.is_empty() {
                page.notices.push(Notice::success("Search completed."));
            }
            page.listing = listing_for(&results.records);
            Html(render_search(&page)).into_response()
        }
        Err(err) => {
            error!(error = %err, "error fetching teachers");
            page.notices.push(Notice::error("Failed to fetch teacher data."));
            page.listing = Listing::Unavailable;
            (StatusCode::INTERNAL_SERVER_ERROR, Html(render_search(&page))).into_response()
        }
    }
}

pub async fn export_pdf<C>(
    State(state): State<AppState<C>>,
    Query(query): Query<SearchQuery>,
) -> Response
where
    C: Connection + Send + Sync + 'static,
{
    let (criteria, criteria_notice) = query.criteria();
    let mut page = SearchPage::for_query(state.control.heading(), &query);
    page.notices.extend(criteria_notice);

    match state.control.export_pdf(&criteria).await {
        Ok(ExportOutcome::Rendered(bytes)) => {
            info!(bytes = bytes.len(), "PDF generated");
            (
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Ok(ExportOutcome::NothingToExport) => {
            warn!("export requested for an empty selection");
            page.notices.push(Notice::warning("No data to generate PDF."));
            Html(render_search(&page)).into_response()
        }
        Err(ControlError::Export(err)) => {
            error!(error = %err, "error rendering PDF");
            page.notices.push(Notice::error("Failed to generate PDF."));
            page.listing = Listing::Unavailable;
            (StatusCode::INTERNAL_SERVER_ERROR, Html(render_search(&page))).into_response()
        }
        Err(err) => {
            error!(error = %err, "error fetching teachers for export");
            page.notices.push(Notice::error("Failed to fetch teacher data."));
            page.listing = Listing::Unavailable;
            (StatusCode::INTERNAL_SERVER_ERROR, Html(render_search(&page))).into_response()
        }
    }
}

fn listing_for(records: &[TeacherResult]) -> Listing {
    if records.is_empty() {
        Listing::NoResults
    } else {
        Listing::Rows(records.iter().map(ReportRow::from).collect())
    }
}

/// Renders the search page for a view state.
#[must_use]
pub fn render_search(page: &SearchPage) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        "<h2 class=\"centered\">{}</h2>\n",
        escape_html(&page.heading.title)
    ));
    body.push_str(&render_form(&page.form));
    body.push_str(
        "<section>\n<div class=\"actions\"><a class=\"button add\" href=\"/upload\">Add More</a></div>\n",
    );
    match &page.listing {
        Listing::Rows(rows) => body.push_str(&render_table(rows)),
        Listing::NoResults => body.push_str("<p class=\"centered\">No results found.</p>\n"),
        Listing::Unavailable => {
            body.push_str("<p class=\"centered\">Teacher data is unavailable.</p>\n");
        }
    }
    body.push_str(&format!(
        "<div class=\"actions\"><a class=\"button danger\" href=\"{}\">Print to PDF</a></div>\n</section>\n",
        escape_html(&page.export_href)
    ));
    document(&page.heading, &page.heading.title, &page.notices, &body)
}

fn render_form(form: &SearchForm) -> String {
    let mut html = String::from("<form class=\"panel\" method=\"get\" action=\"/\">\n");
    html.push_str(&format!(
        "<label for=\"empCode\">Enter Employee ID:</label>\n\
         <input type=\"text\" id=\"empCode\" name=\"empCode\" placeholder=\"Employee ID\" value=\"{}\">\n",
        escape_html(&form.emp_code)
    ));
    html.push_str(&select(
        "department",
        "Select your department:",
        "--Select Department--",
        &DEPARTMENTS.map(|value| (value, value)),
        &form.department,
    ));
    html.push_str(&select(
        "designation",
        "Select your designation:",
        "--Select Designation--",
        &DESIGNATIONS.map(|value| (value, value)),
        &form.designation,
    ));
    let subject_types = [SubjectType::Theory, SubjectType::Lab].map(|t| (t.as_str(), t.label()));
    html.push_str(&select(
        "subjectType",
        "Select Subject Type:",
        "--Any Subject Type--",
        &subject_types,
        form.subject_type.map_or("", SubjectType::as_str),
    ));
    html.push_str("<div class=\"centered\"><button type=\"submit\">Search</button></div>\n</form>\n");
    html
}

fn select(name: &str, label: &str, placeholder: &str, options: &[(&str, &str)], selected: &str) -> String {
    let mut html = format!(
        "<label for=\"{name}\">{}</label>\n<select id=\"{name}\" name=\"{name}\">\n<option value=\"\">{}</option>\n",
        escape_html(label),
        escape_html(placeholder)
    );
    for (value, text) in options {
        let marker = if *value == selected { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{}\"{marker}>{}</option>\n",
            escape_html(value),
            escape_html(text)
        ));
    }
    html.push_str("</select>\n");
    html
}

fn render_table(rows: &[ReportRow]) -> String {
    let mut html = String::from("<table>\n<thead><tr>");
    for column in REPORT_COLUMNS {
        html.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in rows {
        html.push_str("<tr>");
        for cell in row.cells() {
            html.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

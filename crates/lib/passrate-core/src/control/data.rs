use passrate_store::models::TeacherResult;
use serde::{Deserialize, Serialize};
use surrealdb::Connection;

use crate::filter::SearchCriteria;
use crate::report::{ExportOutcome, ReportRow, render_pdf};

use super::{ControlError, ResultsControlPlane};

/// Records matching a search, alongside the size of the full list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResults {
    pub total: usize,
    pub records: Vec<TeacherResult>,
}

impl<C: Connection> ResultsControlPlane<C> {
    /// Lists every stored record.
    ///
    /// # Errors
    /// Returns `ControlError` if the store query fails.
    pub async fn list_teachers(&self) -> Result<Vec<TeacherResult>, ControlError> {
        Ok(self.store.list_teachers().await?)
    }

    /// Fetches every record and narrows it by the supplied criteria.
    ///
    /// # Errors
    /// Returns `ControlError` if the store query fails.
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<SearchResults, ControlError> {
        let all = self.store.list_teachers().await?;
        let total = all.len();
        let records = if criteria.is_empty() {
            all
        } else {
            criteria.apply(&all)
        };
        Ok(SearchResults { total, records })
    }

    /// Renders the filtered records as a PDF report.
    ///
    /// # Errors
    /// Returns `ControlError` if the store query or rendering fails.
    pub async fn export_pdf(&self, criteria: &SearchCriteria) -> Result<ExportOutcome, ControlError> {
        let results = self.search(criteria).await?;
        Ok(self.export_records(&results.records)?)
    }

    /// Renders an already filtered list.
    ///
    /// # Errors
    /// Returns `ExportError` if the document cannot be encoded.
    pub fn export_records(
        &self,
        records: &[TeacherResult],
    ) -> Result<ExportOutcome, crate::report::ExportError> {
        let rows: Vec<ReportRow> = records.iter().map(ReportRow::from).collect();
        render_pdf(&self.heading, &rows)
    }
}

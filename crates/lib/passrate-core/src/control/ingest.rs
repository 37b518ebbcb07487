use passrate_store::models::TeacherResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use surrealdb::Connection;
use tracing::{info, warn};

use crate::parsers::{WorkbookParser, normalize_rows};

use super::{ControlError, ResultsControlPlane};

pub const INVALID_FORMAT_MESSAGE: &str = "Invalid data format. Expected an array.";

/// Outcome of converting an uploaded workbook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversionReport {
    pub records: Vec<TeacherResult>,
    pub source_rows: usize,
    pub dropped_rows: usize,
}

/// Summary of an append request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppendReport {
    pub appended: usize,
}

impl<C: Connection> ResultsControlPlane<C> {
    /// Reads the first sheet of a workbook and normalizes it into records.
    /// Nothing is stored.
    ///
    /// # Errors
    /// Returns `ControlError` if the workbook is unreadable or its first row
    /// lacks required fields.
    pub async fn convert_workbook(&self, bytes: Vec<u8>) -> Result<ConversionReport, ControlError> {
        let rows = WorkbookParser::parse_async(bytes).await?;
        let output = match normalize_rows(&rows) {
            Ok(output) => output,
            Err(err) => {
                warn!(error = %err, "workbook rejected");
                return Err(err.into());
            }
        };
        if output.dropped_rows > 0 {
            warn!(
                dropped_rows = output.dropped_rows,
                "rows without a teacher name produced no records"
            );
        }
        info!(
            source_rows = output.source_rows,
            records = output.records.len(),
            "workbook converted"
        );
        Ok(ConversionReport {
            records: output.records,
            source_rows: output.source_rows,
            dropped_rows: output.dropped_rows,
        })
    }

    /// Appends already-normalized records in one all-or-nothing batch.
    /// Duplicates of earlier uploads are written again.
    ///
    /// # Errors
    /// Returns `ControlError` if the batch fails; nothing is written then.
    pub async fn append_teachers(
        &self,
        records: Vec<TeacherResult>,
    ) -> Result<AppendReport, ControlError> {
        let appended = self.store.insert_teachers(records).await?;
        info!(appended, "teacher records appended");
        Ok(AppendReport { appended })
    }

    /// Appends a JSON payload that must be an array of records.
    ///
    /// # Errors
    /// Returns `ControlError::InvalidInput` if the payload is not an array of
    /// record objects, or a store error if the batch fails.
    pub async fn append_json(&self, payload: Value) -> Result<AppendReport, ControlError> {
        let records = records_from_json(payload)?;
        self.append_teachers(records).await
    }
}

/// Reads an array payload into records.
///
/// # Errors
/// Returns `ControlError::InvalidInput` if the payload is not an array or an
/// element is not a record object.
pub fn records_from_json(payload: Value) -> Result<Vec<TeacherResult>, ControlError> {
    let Value::Array(items) = payload else {
        return Err(ControlError::InvalidInput(INVALID_FORMAT_MESSAGE.to_string()));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(ControlError::InvalidInput(format!(
                    "Invalid record at index {index}. Expected an object."
                )));
            }
            serde_json::from_value(item).map_err(|err| {
                ControlError::InvalidInput(format!("Invalid record at index {index}: {err}"))
            })
        })
        .collect()
}

use std::collections::HashSet;

use passrate_core::control::{ControlError, ResultsControlPlane};
use passrate_core::filter::SearchCriteria;
use passrate_core::parsers::{CellValue, RawRow, normalize_rows};
use passrate_core::report::ExportOutcome;
use passrate_store::models::SubjectType;
use passrate_store::schema::{NOT_AVAILABLE, REQUIRED_COLUMNS};
use rust_xlsxwriter::Workbook;
use serde_json::json;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn control_plane(database: &str) -> ResultsControlPlane<Db> {
    let db = Surreal::new::<Mem>(())
        .await
        .expect("failed to create in-memory surrealdb instance");
    db.use_ns("passrate")
        .use_db(database)
        .await
        .expect("failed to select surrealdb namespace/db");
    ResultsControlPlane::new(db)
}

fn sheet_row(values: [&str; 11]) -> RawRow {
    REQUIRED_COLUMNS
        .iter()
        .zip(values)
        .filter(|(_, value)| !value.is_empty())
        .map(|(column, value)| ((*column).to_string(), CellValue::Text(value.to_string())))
        .collect()
}

fn sample_sheet() -> Vec<RawRow> {
    vec![
        sheet_row([
            "1", "2023-24", "II", "I", "CSE-A", "Data Structures", "Dr. Rao / Ms. Kaur",
            "GNI101/GNI102", "60", "54", "90",
        ]),
        sheet_row([
            "2", "2023-24", "II", "I", "CSE-A", "DBMS Lab", "Dr. Rao", "GNI 101", "60", "60",
            "100%",
        ]),
        sheet_row([
            "3", "2023-24", "III", "II", "ECE-B", "Signals", "Mr. Das/Ms. Iyer", "GNI301", "55",
            "40", "72.73",
        ]),
        sheet_row(["4", "2023-24", "III", "II", "ECE-B", "Circuits", "", "", "50", "20", "40"]),
    ]
}

fn workbook_bytes(rows: &[Vec<&str>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (row, values) in (0_u32..).zip(rows) {
        for (col, value) in (0_u16..).zip(values) {
            if value.is_empty() {
                continue;
            }
            match value.parse::<f64>() {
                Ok(number) => sheet.write_number(row, col, number),
                Err(_) => sheet.write_string(row, col, *value),
            }
            .expect("cell should be written");
        }
    }
    workbook.save_to_buffer().expect("workbook should serialize")
}

fn header_row() -> Vec<&'static str> {
    REQUIRED_COLUMNS.to_vec()
}

#[tokio::test]
async fn uploaded_workbook_converts_to_records() {
    let control = control_plane("convert").await;
    let bytes = workbook_bytes(&[
        header_row(),
        vec![
            "1", "2023-24", "II", "I", "CSE-A", "Data Structures", "Dr. Rao / Ms. Kaur",
            "GNI101", "60", "54", "90",
        ],
        vec!["2", "2023-24", "II", "I", "CSE-B", "DBMS Lab", "", "", "58", "50", "86.21"],
    ]);

    let report = control
        .convert_workbook(bytes)
        .await
        .expect("workbook should convert");

    assert_eq!(report.source_rows, 2);
    assert_eq!(report.dropped_rows, 1);
    let summary: Vec<_> = report
        .records
        .iter()
        .map(|r| {
            (
                r.teacher_name.as_str(),
                r.emp_code.as_str(),
                r.branch.as_str(),
                r.serial_no.as_str(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        [("Dr. Rao", "GNI101", "CSE", "1"), ("Ms. Kaur", NOT_AVAILABLE, "CSE", "1")]
    );
    assert_eq!(report.records[0].students_appeared, 60);
    assert!((report.records[0].pass_percentage - 90.0).abs() < f64::EPSILON);
    assert!(control.list_teachers().await.expect("list").is_empty());
}

#[tokio::test]
async fn workbook_missing_columns_is_rejected() {
    let control = control_plane("missing_columns").await;
    let header: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| *column != "Sem")
        .collect();
    let bytes = workbook_bytes(&[
        header,
        vec![
            "1", "2023-24", "II", "CSE-A", "Data Structures", "Dr. Rao", "GNI101", "60", "54",
            "90",
        ],
    ]);

    let err = control
        .convert_workbook(bytes)
        .await
        .expect_err("sheet without Sem should be rejected");

    assert!(matches!(err, ControlError::Normalize(_)));
    assert_eq!(err.to_string(), "Missing required fields: Sem");
}

#[tokio::test]
async fn normalized_sheet_round_trips_through_store_and_filters() {
    let control = control_plane("roundtrip").await;
    let output = normalize_rows(&sample_sheet()).expect("sheet should normalize");
    assert_eq!(output.records.len(), 5);
    assert_eq!(output.dropped_rows, 1);

    let report = control
        .append_teachers(output.records)
        .await
        .expect("append should succeed");
    assert_eq!(report.appended, 5);

    let listed = control.list_teachers().await.expect("list should succeed");
    assert_eq!(listed.len(), 5);
    let ids: HashSet<_> = listed.iter().filter_map(|record| record.id.clone()).collect();
    assert_eq!(ids.len(), 5);
    let iyer = listed
        .iter()
        .find(|record| record.teacher_name == "Ms. Iyer")
        .expect("Ms. Iyer should be stored");
    assert_eq!(iyer.emp_code, NOT_AVAILABLE);
    assert_eq!(iyer.branch, "ECE");

    let rao_labs = control
        .search(&SearchCriteria {
            emp_code: Some("GNI101".to_string()),
            department: Some("CSE".to_string()),
            subject_type: Some(SubjectType::Lab),
            ..SearchCriteria::default()
        })
        .await
        .expect("search should succeed");
    assert_eq!(rao_labs.total, 5);
    assert_eq!(rao_labs.records.len(), 1);
    assert_eq!(rao_labs.records[0].subject_name, "DBMS Lab");
    assert!((rao_labs.records[0].pass_percentage - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn appending_twice_duplicates_records() {
    let control = control_plane("duplicates").await;
    let payload = json!([
        {"Name of the teacher": "Dr. Rao", "EMP Code": "GNI101", "Section": "CSE-A",
         "Branch": "CSE", "Name of the subject": "Compilers", "% of Pass": "88.5"}
    ]);

    control.append_json(payload.clone()).await.expect("first append");
    control.append_json(payload).await.expect("second append");

    let listed = control.list_teachers().await.expect("list should succeed");
    assert_eq!(listed.len(), 2);
    assert_ne!(listed[0].id, listed[1].id);
}

#[tokio::test]
async fn invalid_payload_writes_nothing() {
    let control = control_plane("invalid").await;
    let err = control
        .append_json(json!({"Name of the teacher": "Dr. Rao"}))
        .await
        .expect_err("object payload should be rejected");
    assert_eq!(err.to_string(), "Invalid data format. Expected an array.");

    control
        .append_json(json!([{"Name of the teacher": "A"}, "not a record"]))
        .await
        .expect_err("mixed payload should be rejected");

    assert!(control.list_teachers().await.expect("list").is_empty());
}

#[tokio::test]
async fn failing_record_rolls_back_the_whole_batch() {
    let control = control_plane("rollback").await;
    control
        .store()
        .db()
        .query(
            "DEFINE TABLE teachers SCHEMALESS; \
             DEFINE FIELD Section ON TABLE teachers TYPE string ASSERT $value != 'BROKEN';",
        )
        .await
        .expect("schema should apply")
        .check()
        .expect("schema statements should succeed");

    let result = control
        .append_json(json!([
            {"Name of the teacher": "A", "Section": "CSE-A"},
            {"Name of the teacher": "B", "Section": "BROKEN"},
            {"Name of the teacher": "C", "Section": "ECE-A"}
        ]))
        .await;
    assert!(result.is_err());
    assert!(control.list_teachers().await.expect("list").is_empty());
}

#[tokio::test]
async fn export_of_empty_selection_is_not_an_error() {
    let control = control_plane("export").await;
    let outcome = control
        .export_pdf(&SearchCriteria::default())
        .await
        .expect("export should not fail");
    assert_eq!(outcome, ExportOutcome::NothingToExport);

    let output = normalize_rows(&sample_sheet()).expect("sheet should normalize");
    control.append_teachers(output.records).await.expect("append");
    let outcome = control
        .export_pdf(&SearchCriteria {
            department: Some("ECE".to_string()),
            ..SearchCriteria::default()
        })
        .await
        .expect("export should succeed");
    let ExportOutcome::Rendered(bytes) = outcome else {
        panic!("expected a rendered document");
    };
    assert!(bytes.starts_with(b"%PDF"));
}

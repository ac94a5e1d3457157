//! Spreadsheet exports.
//!
//! Exports are CSV files, UTF-8 with a byte-order mark so spreadsheet
//! applications detect the encoding, with a header row of Spanish column
//! titles. Column layouts live in [`sheets`].

pub mod sheets;

use axum::body::Body;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::Response;
use chrono::{NaiveDate, Utc};

use crate::error::{AppError, AppResult};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Serialize `headers` and `rows` as CSV, BOM first.
pub fn to_csv<I>(headers: &[&str], rows: I) -> Result<Vec<u8>, csv::Error>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut buffer = UTF8_BOM.to_vec();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer.write_record(headers)?;
        for row in rows {
            writer.write_record(&row)?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}

/// `{stem}-YYYY-MM-DD.csv`
pub fn dated_filename(stem: &str, date: NaiveDate) -> String {
    format!("{stem}-{}.csv", date.format("%Y-%m-%d"))
}

/// Build the download response for an export named `stem`.
pub fn csv_response<I>(stem: &str, headers: &[&str], rows: I) -> AppResult<Response>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let body = to_csv(headers, rows)
        .map_err(|e| AppError::InternalError(format!("CSV serialization error: {e}")))?;
    let filename = dated_filename(stem, Utc::now().date_naive());

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(body))
        .map_err(|e| AppError::InternalError(format!("Failed to build export response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_starts_with_bom_and_headers() {
        let bytes = to_csv(&["ID", "Título"], vec![vec!["1".into(), "Movilidad, FCT".into()]])
            .unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text, "ID,Título\n1,\"Movilidad, FCT\"\n");
    }

    #[test]
    fn filename_carries_the_date() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        assert_eq!(dated_filename("convocatorias", date), "convocatorias-2025-09-01.csv");
    }
}

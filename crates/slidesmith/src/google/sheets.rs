//! Google Sheets API v4 Client

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use super::client::GoogleClient;
use super::common::{extract_array, path_segment};
use super::SpreadsheetService;
use crate::common::RemoteApiError;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

pub struct SheetsApi {
    client: GoogleClient,
    base_url: String,
}

super::google_api_wrapper!(SheetsApi, SHEETS_API_BASE);

impl SheetsApi {
    /// Read an A1-notation range as rows of formatted cell values.
    ///
    /// Trailing empty rows and cells are omitted by the API, so rows may be
    /// ragged. An empty range yields an empty vec.
    pub async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>, RemoteApiError> {
        info!("Reading range {:?} from spreadsheet {}", range, spreadsheet_id);

        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.base_url,
            path_segment(spreadsheet_id),
            path_segment(range)
        );
        let response = self.client.get(&url, &[]).await?;

        let rows: Vec<Vec<String>> = extract_array(&response, "values")
            .iter()
            .map(row_to_strings)
            .collect();

        debug!("Retrieved {} rows", rows.len());
        Ok(rows)
    }
}

fn row_to_strings(row: &Value) -> Vec<String> {
    row.as_array()
        .map(|cells| {
            cells
                .iter()
                .map(|cell| match cell {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl SpreadsheetService for SheetsApi {
    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>, RemoteApiError> {
        SheetsApi::get_values(self, spreadsheet_id, range).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::test_support::serve_once;
    use serde_json::json;

    #[test]
    fn test_row_to_strings() {
        assert_eq!(
            row_to_strings(&json!(["a", 1, true, null])),
            vec!["a", "1", "true", ""]
        );
        assert!(row_to_strings(&json!("not a row")).is_empty());
    }

    #[tokio::test]
    async fn test_get_values_request() {
        let body = r#"{"range": "Sheet1!A1:B2", "majorDimension": "ROWS", "values": [["Name", "Age"], ["Ada"]]}"#;
        let (base, request) = serve_once("200 OK", body).await;
        let api = SheetsApi::with_base_url("tok".to_string(), base).unwrap();

        let rows = api.get_values("sheet1", "Sheet1!A1:B2").await.unwrap();
        assert_eq!(rows, vec![vec!["Name", "Age"], vec!["Ada"]]);

        let request = request.await.unwrap();
        assert!(request
            .request_line()
            .starts_with("GET /spreadsheets/sheet1/values/Sheet1%21A1%3AB2"));
    }

    #[tokio::test]
    async fn test_empty_range_is_empty_vec() {
        let (base, _request) = serve_once("200 OK", r#"{"range": "Sheet1!A1:B2", "majorDimension": "ROWS"}"#).await;
        let api = SheetsApi::with_base_url("tok".to_string(), base).unwrap();

        let rows = api.get_values("sheet1", "Sheet1!A1:B2").await.unwrap();
        assert!(rows.is_empty());
    }
}

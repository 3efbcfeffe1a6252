//! Google Drive API v3 Client
//!
//! Copy-with-metadata and delete, the two file operations the handler needs.
//! Every call sets `supportsAllDrives` so shared-drive folders work.

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use super::client::GoogleClient;
use super::common::path_segment;
use super::StorageService;
use crate::common::RemoteApiError;

const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

pub struct DriveApi {
    client: GoogleClient,
    base_url: String,
}

super::google_api_wrapper!(DriveApi, DRIVE_API_BASE);

fn all_drives() -> [(&'static str, String); 1] {
    [("supportsAllDrives", "true".to_string())]
}

impl DriveApi {
    /// Copy `file_id` under a new name into `parents`. Returns the new file id.
    pub async fn copy_file(
        &self,
        file_id: &str,
        name: &str,
        parents: &[String],
    ) -> Result<String, RemoteApiError> {
        info!("Copying Drive file {} as {:?}", file_id, name);

        let url = format!("{}/files/{}/copy", self.base_url, path_segment(file_id));
        let body = json!({
            "name": name,
            "parents": parents,
        });
        let response = self.client.post(&url, &all_drives(), &body).await?;

        response
            .get("id")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| RemoteApiError::transport("Copy response is missing the file id"))
    }

    /// Permanently delete a file.
    pub async fn delete_file(&self, file_id: &str) -> Result<(), RemoteApiError> {
        info!("Deleting Drive file: {}", file_id);

        let url = format!("{}/files/{}", self.base_url, path_segment(file_id));
        self.client.delete(&url, &all_drives()).await?;
        Ok(())
    }
}

#[async_trait]
impl StorageService for DriveApi {
    async fn copy_file(
        &self,
        file_id: &str,
        name: &str,
        parents: &[String],
    ) -> Result<String, RemoteApiError> {
        DriveApi::copy_file(self, file_id, name, parents).await
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), RemoteApiError> {
        DriveApi::delete_file(self, file_id).await
    }
}

//! Google Slides API v1 Client
//!
//! Provides methods for interacting with the Slides API:
//! - Fetch a whole presentation
//! - Apply an ordered batch of edits
//!
//! Also defines the typed views over presentations and the edit payloads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::client::GoogleClient;
use super::common::path_segment;
use super::PresentationService;
use crate::common::RemoteApiError;

const SLIDES_API_BASE: &str = "https://slides.googleapis.com/v1";

/// Download URL Slides fetches replacement images from.
const DRIVE_DOWNLOAD_URL: &str = "https://drive.google.com/uc?export=download&id=";

// ── Documents ───────────────────────────────────────────────────────────────

/// Snapshot of a presentation. Fields not modelled here are kept in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub presentation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Absent when the deck has no slides at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slides: Option<Vec<Slide>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub object_id: String,
    #[serde(default)]
    pub page_elements: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Slide {
    /// Object ids of the image elements on this slide.
    pub fn image_object_ids(&self) -> Vec<&str> {
        self.page_elements
            .iter()
            .filter(|el| el.get("image").is_some())
            .filter_map(|el| el.get("objectId").and_then(|v| v.as_str()))
            .collect()
    }
}

// ── Edits ───────────────────────────────────────────────────────────────────

/// One request inside a `presentations.batchUpdate` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum Edit {
    ReplaceAllText(ReplaceAllTextRequest),
    ReplaceImage(ReplaceImageRequest),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAllTextRequest {
    pub replace_text: String,
    pub contains_text: SubstringMatchCriteria,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubstringMatchCriteria {
    pub text: String,
    pub match_case: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceImageRequest {
    pub image_object_id: String,
    pub url: String,
}

impl Edit {
    /// Case-sensitive replacement of every occurrence of `search`.
    pub fn replace_all_text(search: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::ReplaceAllText(ReplaceAllTextRequest {
            replace_text: replacement.into(),
            contains_text: SubstringMatchCriteria {
                text: search.into(),
                match_case: true,
            },
        })
    }

    /// Swap the image `image_object_id` for the Drive file `drive_file_id`.
    pub fn replace_image(image_object_id: impl Into<String>, drive_file_id: &str) -> Self {
        Self::ReplaceImage(ReplaceImageRequest {
            image_object_id: image_object_id.into(),
            url: format!("{}{}", DRIVE_DOWNLOAD_URL, drive_file_id),
        })
    }
}

// ── Client ──────────────────────────────────────────────────────────────────

pub struct SlidesApi {
    client: GoogleClient,
    base_url: String,
}

super::google_api_wrapper!(SlidesApi, SLIDES_API_BASE);

impl SlidesApi {
    /// Fetch the full document structure.
    pub async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation, RemoteApiError> {
        info!("Fetching presentation: {}", presentation_id);

        let url = format!("{}/presentations/{}", self.base_url, path_segment(presentation_id));
        let response = self.client.get(&url, &[]).await?;

        serde_json::from_value(response)
            .map_err(|e| RemoteApiError::transport(format!("Unexpected presentation shape: {}", e)))
    }

    /// Apply `edits` in order as one atomic batch.
    pub async fn batch_update(&self, presentation_id: &str, edits: &[Edit]) -> Result<Value, RemoteApiError> {
        info!(
            "Applying {} edits to presentation: {}",
            edits.len(),
            presentation_id
        );

        let url = format!(
            "{}/presentations/{}:batchUpdate",
            self.base_url,
            path_segment(presentation_id)
        );
        let body = json!({ "requests": edits });
        let response = self.client.post(&url, &[], &body).await?;

        debug!(
            "batchUpdate returned {} replies",
            super::common::extract_array(&response, "replies").len()
        );
        Ok(response)
    }
}

#[async_trait]
impl PresentationService for SlidesApi {
    async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation, RemoteApiError> {
        SlidesApi::get_presentation(self, presentation_id).await
    }

    async fn batch_update(&self, presentation_id: &str, edits: &[Edit]) -> Result<Value, RemoteApiError> {
        SlidesApi::batch_update(self, presentation_id, edits).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::test_support::serve_once;

    #[test]
    fn test_replace_text_payload() {
        let edit = Edit::replace_all_text("{{name}}", "Ada");
        assert_eq!(
            serde_json::to_value(&edit).unwrap(),
            json!({
                "replaceAllText": {
                    "replaceText": "Ada",
                    "containsText": { "text": "{{name}}", "matchCase": true }
                }
            })
        );
    }

    #[test]
    fn test_replace_image_payload() {
        let edit = Edit::replace_image("obj1", "img42");
        assert_eq!(
            serde_json::to_value(&edit).unwrap(),
            json!({
                "replaceImage": {
                    "imageObjectId": "obj1",
                    "url": "https://drive.google.com/uc?export=download&id=img42"
                }
            })
        );
    }

    #[test]
    fn test_presentation_without_slides() {
        let p: Presentation = serde_json::from_value(json!({
            "presentationId": "p1",
            "title": "Blank",
            "pageSize": { "width": {} }
        }))
        .unwrap();
        assert!(p.slides.is_none());
        assert!(p.extra.contains_key("pageSize"));
    }

    #[test]
    fn test_image_object_ids() {
        let slide: Slide = serde_json::from_value(json!({
            "objectId": "s1",
            "pageElements": [
                { "objectId": "shape1", "shape": {} },
                { "objectId": "img1", "image": { "contentUrl": "x" } }
            ]
        }))
        .unwrap();
        assert_eq!(slide.image_object_ids(), vec!["img1"]);
    }

    #[tokio::test]
    async fn test_batch_update_request() {
        let (base, request) = serve_once("200 OK", r#"{"presentationId": "p1", "replies": [{}]}"#).await;
        let api = SlidesApi::with_base_url("tok".to_string(), base).unwrap();

        api.batch_update("p1", &[Edit::replace_all_text("a", "b")])
            .await
            .unwrap();

        let request = request.await.unwrap();
        assert!(request.request_line().starts_with("POST /presentations/p1:batchUpdate"));
        assert_eq!(request.json()["requests"][0]["replaceAllText"]["replaceText"], "b");
    }

    #[tokio::test]
    async fn test_get_presentation_parses_slides() {
        let body = r#"{"presentationId": "p1", "slides": [{"objectId": "s1"}, {"objectId": "s2"}]}"#;
        let (base, request) = serve_once("200 OK", body).await;
        let api = SlidesApi::with_base_url("tok".to_string(), base).unwrap();

        let presentation = api.get_presentation("p1").await.unwrap();
        assert_eq!(presentation.slides.map(|s| s.len()), Some(2));
        assert!(request.await.unwrap().request_line().starts_with("GET /presentations/p1 "));
    }
}

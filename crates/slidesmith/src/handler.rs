//! Operation Façade
//!
//! `GoogleApiHandler` is the single entry point callers use. Each operation
//! is one narrow, named call on the service handles; slide edits go through
//! the batch partition and the rate limiter.

use serde_json::Value;
use tracing::{debug, error, info};

use crate::auth::CredentialManager;
use crate::common::{AppResult, RemoteApiError};
use crate::config::HandlerConfig;
use crate::google::{Edit, Presentation, Services, Slide};
use crate::limiter::{partition, FixedWindowLimiter, RateLimiter};

/// Outcome of [`GoogleApiHandler::get_slides`].
#[derive(Debug, Clone, PartialEq)]
pub enum SlidesLookup {
    Slides(Vec<Slide>),
    /// The presentation was fetched but carries no slides.
    NoSlides,
    /// The fetch failed; the error has already been logged.
    Unavailable(RemoteApiError),
}

impl SlidesLookup {
    /// The slides, or `None` for both an empty deck and a failed fetch.
    pub fn slides(&self) -> Option<&[Slide]> {
        match self {
            Self::Slides(slides) => Some(slides),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

pub struct GoogleApiHandler {
    target_folder_id: String,
    max_batch_size: usize,
    services: Services,
    limiter: Box<dyn RateLimiter>,
}

impl GoogleApiHandler {
    /// Acquire credentials and build the service handles.
    pub async fn connect(config: &HandlerConfig) -> AppResult<Self> {
        config.validate()?;
        let credential = CredentialManager::from_config(config).acquire().await?;
        let services = Services::connect(&credential)?;
        let limiter = FixedWindowLimiter::new(
            config.requests_per_minute,
            FixedWindowLimiter::DEFAULT_WINDOW,
        );
        Ok(Self::with_services(config, services, Box::new(limiter)))
    }

    /// Build a handler over existing service handles.
    pub fn with_services(
        config: &HandlerConfig,
        services: Services,
        limiter: Box<dyn RateLimiter>,
    ) -> Self {
        Self {
            target_folder_id: config.target_folder_id.clone(),
            max_batch_size: config.max_batch_size,
            services,
            limiter,
        }
    }

    // ── Slides ──────────────────────────────────────────────────────────────

    /// Copy a template into the target folder under `name`. Returns the new id.
    pub async fn copy_template(&self, source_id: &str, name: &str) -> AppResult<String> {
        let parents = [self.target_folder_id.clone()];
        let new_id = self
            .services
            .drive
            .copy_file(source_id, name, &parents)
            .await?;
        info!("Created {:?} ({}) from template {}", name, new_id, source_id);
        Ok(new_id)
    }

    pub async fn get_presentation(&self, presentation_id: &str) -> AppResult<Presentation> {
        Ok(self.services.slides.get_presentation(presentation_id).await?)
    }

    /// Fetch the slides of a presentation. Never fails: a remote error is
    /// logged and reported as [`SlidesLookup::Unavailable`].
    pub async fn get_slides(&self, presentation_id: &str) -> SlidesLookup {
        match self.services.slides.get_presentation(presentation_id).await {
            Ok(presentation) => match presentation.slides {
                Some(slides) => SlidesLookup::Slides(slides),
                None => SlidesLookup::NoSlides,
            },
            Err(e) => {
                error!("Could not fetch slides of {}: {}", presentation_id, e);
                SlidesLookup::Unavailable(e)
            }
        }
    }

    /// Replace every case-sensitive occurrence of `search`.
    pub async fn replace_text(
        &self,
        search: &str,
        replacement: &str,
        presentation_id: &str,
    ) -> AppResult<Vec<Value>> {
        self.update_presentation(vec![Edit::replace_all_text(search, replacement)], presentation_id)
            .await
    }

    /// Apply several `(search, replacement)` pairs through one update.
    pub async fn replace_texts<S, R>(
        &self,
        pairs: impl IntoIterator<Item = (S, R)>,
        presentation_id: &str,
    ) -> AppResult<Vec<Value>>
    where
        S: Into<String>,
        R: Into<String>,
    {
        let edits = pairs
            .into_iter()
            .map(|(search, replacement)| Edit::replace_all_text(search, replacement))
            .collect();
        self.update_presentation(edits, presentation_id).await
    }

    /// Swap images: `(image object id, Drive file id)` pairs.
    pub async fn replace_images<'a>(
        &self,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
        presentation_id: &str,
    ) -> AppResult<Vec<Value>> {
        let edits = pairs
            .into_iter()
            .map(|(target, image)| Self::build_image_replace_edit(target, image))
            .collect();
        self.update_presentation(edits, presentation_id).await
    }

    /// Build a replace-image edit pointing at a Drive download URL. No I/O.
    pub fn build_image_replace_edit(target_image_id: &str, new_image_drive_id: &str) -> Edit {
        Edit::replace_image(target_image_id, new_image_drive_id)
    }

    /// Apply `edits` in order, split into batches no larger than the
    /// configured maximum, each admitted by the rate limiter first.
    ///
    /// Returns one `batchUpdate` response per batch sent. Stops at the first
    /// failing batch; earlier batches stay applied.
    pub async fn update_presentation(
        &self,
        edits: Vec<Edit>,
        presentation_id: &str,
    ) -> AppResult<Vec<Value>> {
        let total = edits.len();
        let batches = partition(edits, self.max_batch_size);
        if batches.len() > 1 {
            info!(
                "Splitting {} edits into {} batches for {}",
                total,
                batches.len(),
                presentation_id
            );
        }

        let mut responses = Vec::with_capacity(batches.len());
        for batch in batches {
            self.limiter.admit(batch.len()).await;
            debug!("Sending batch of {} edits", batch.len());
            let response = self
                .services
                .slides
                .batch_update(presentation_id, &batch)
                .await?;
            responses.push(response);
        }
        Ok(responses)
    }

    // ── Drive ───────────────────────────────────────────────────────────────

    pub async fn delete_file(&self, file_id: &str) -> AppResult<()> {
        self.services.drive.delete_file(file_id).await?;
        Ok(())
    }

    // ── Sheets ──────────────────────────────────────────────────────────────

    /// Read a range as rows of cell strings; an empty range is an empty vec.
    pub async fn read_range(&self, spreadsheet_id: &str, range: &str) -> AppResult<Vec<Vec<String>>> {
        Ok(self.services.sheets.get_values(spreadsheet_id, range).await?)
    }
}

use std::{sync::Arc, time::Duration};

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod telemetry;
pub mod graceful_shutdown;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{credential, genai, imaging, utils};

use credential::{resolve_api_key, CredentialStore};
use errors::AppError;
use genai::gemini::GeminiClient;
use imaging::crop::CropOptions;
use repositories::{blob_store::{BlobStore, SharedBlobStore}, hosted_blob::HostedBlobRepo, memory_blob::MemoryBlobRepo};
use settings::{AppConfig, BlobBackendKind};
use use_cases::{critique::CritiqueHandler, results::ResultsHandler};

pub struct AppState {
    pub results_handler: AppResultsHandler,
    pub critique_handler: AppCritiqueHandler,
    pub crop_options: CropOptions,
}

pub type AppResultsHandler = ResultsHandler<SharedBlobStore>;
pub type AppCritiqueHandler = CritiqueHandler<GeminiClient>;

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let blob_store: SharedBlobStore = match config.blob.backend {
            BlobBackendKind::Memory => Arc::new(MemoryBlobRepo::new(&config.blob.public_base_url)),
            BlobBackendKind::Hosted => Arc::new(
                HostedBlobRepo::new(&config.blob.api_url, &config.blob.token).map_err(AppError::from)?,
            ),
        };
        tracing::info!(backend = blob_store.backend_name(), "Blob store ready");

        let credential_store = config.gemini.credential_file.as_deref().map(CredentialStore::new);
        let api_key = resolve_api_key(&config.gemini.api_key, credential_store.as_ref());
        if api_key.is_none() {
            tracing::warn!("No AI credential configured; analysis requests will be rejected");
        }

        let client = GeminiClient::new(&config.gemini, api_key).map_err(AppError::from)?;

        Ok(AppState {
            results_handler: ResultsHandler::new(blob_store, &config.blob.namespace, config.blob.overwrite_policy),
            critique_handler: CritiqueHandler::new(
                client,
                config.gemini.video_models.clone(),
                Duration::from_secs(config.gemini.poll_interval_secs),
            ),
            crop_options: CropOptions::from(&config.imaging),
        })
    }
}

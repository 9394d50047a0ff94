use std::fmt;

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use derive_more::Display;
use serde::Serialize;
use validator::ValidationErrors;

use crate::infrastructure::{credential::CredentialError, imaging::ImagingError};

#[derive(Debug)]
pub enum AppError {
    ValidationError(Vec<FieldError>),
    InvalidInput(String),
    NotFound(String),
    Unauthorized(String),
    RateLimited(String),
    Unprocessable(String),
    BadGateway(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let messages = errors.iter()
                    .map(|e| format!("{}:{}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "validation error: {}", messages)
            }
            AppError::InvalidInput(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::RateLimited(msg)
            | AppError::Unprocessable(msg)
            | AppError::BadGateway(msg)
            | AppError::InternalError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::ValidationError(errors) => {
                serde_json::json!({
                    "error": "Validation failed",
                    "details": errors
                })
            }
            _ => {
                serde_json::json!({"error": self.to_string()})
            }
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(|e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string()),
                })
            })
            .collect();

        AppError::ValidationError(field_errors)
    }
}

impl From<GenAiError> for AppError {
    fn from(err: GenAiError) -> Self {
        let message = err.user_message();
        match err {
            GenAiError::MissingCredential | GenAiError::InvalidCredential(_) => AppError::Unauthorized(message),
            GenAiError::QuotaExhausted(_) => AppError::RateLimited(message),
            GenAiError::SafetyBlocked(_) => AppError::Unprocessable(message),
            GenAiError::Network(_) | GenAiError::Decode(_) => AppError::BadGateway(message),
            GenAiError::EmptyResult | GenAiError::Failed(_) => AppError::InternalError(message),
        }
    }
}

impl From<BlobError> for AppError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::NotFound(msg) => AppError::NotFound(msg),
            _ => AppError::InternalError(err.to_string()),
        }
    }
}

impl From<ImagingError> for AppError {
    fn from(err: ImagingError) -> Self {
        match err {
            ImagingError::Decode(_) => AppError::InvalidInput(err.to_string()),
            ImagingError::Encode(_) => AppError::InternalError(err.to_string()),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        AppError::InternalError(format!("Background task failed: {}", err))
    }
}

/// Failures of the generative-AI service, grouped by the message the user sees.
#[derive(Debug, Display)]
pub enum GenAiError {
    #[display("API key is not configured")]
    MissingCredential,

    #[display("Invalid API key or project: {_0}")]
    InvalidCredential(String),

    #[display("Quota exhausted: {_0}")]
    QuotaExhausted(String),

    #[display("Blocked by safety policy: {_0}")]
    SafetyBlocked(String),

    #[display("Network error: {_0}")]
    Network(String),

    #[display("Decode error: {_0}")]
    Decode(String),

    #[display("The model returned no result")]
    EmptyResult,

    #[display("{_0}")]
    Failed(String),
}

impl std::error::Error for GenAiError {}

const NOT_FOUND_MARKER: &str = "Requested entity was not found";

impl GenAiError {
    /// Categorizes a raw service failure by its status and message text.
    pub fn classify(status: Option<u16>, message: &str) -> Self {
        let lowered = message.to_lowercase();
        if message.contains(NOT_FOUND_MARKER) {
            GenAiError::InvalidCredential(message.to_string())
        } else if status == Some(429)
            || lowered.contains("quota")
            || lowered.contains("exhausted")
            || message.contains("429")
        {
            GenAiError::QuotaExhausted(message.to_string())
        } else if matches!(status, Some(401) | Some(403)) {
            GenAiError::InvalidCredential(message.to_string())
        } else {
            GenAiError::Failed(message.to_string())
        }
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, GenAiError::QuotaExhausted(_))
    }

    pub fn user_message(&self) -> String {
        match self {
            GenAiError::MissingCredential => {
                "API key is not configured. Check the server environment or the stored credential.".to_string()
            }
            GenAiError::InvalidCredential(_) => {
                "The API key or project is not valid (Requested entity not found).".to_string()
            }
            GenAiError::QuotaExhausted(_) => {
                "Quota exhausted for every available model. Please try again later.".to_string()
            }
            GenAiError::SafetyBlocked(reason) => format!("Blocked by safety policy: {}", reason),
            GenAiError::Network(msg) | GenAiError::Decode(msg) | GenAiError::Failed(msg) => msg.clone(),
            GenAiError::EmptyResult => "Could not produce an analysis result.".to_string(),
        }
    }
}

impl From<reqwest::Error> for GenAiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GenAiError::Decode(err.to_string())
        } else {
            GenAiError::Network(err.to_string())
        }
    }
}

#[derive(Debug, Display)]
pub enum BlobError {
    #[display("BLOB_READ_WRITE_TOKEN is not configured")]
    NotConfigured,

    #[display("{_0}")]
    NotFound(String),

    #[display("Object already exists: {_0}")]
    AlreadyExists(String),

    #[display("Blob store error: {_0}")]
    Backend(String),

    #[display("Blob store network error: {_0}")]
    Network(String),
}

impl std::error::Error for BlobError {}

impl From<reqwest::Error> for BlobError {
    fn from(err: reqwest::Error) -> Self {
        BlobError::Network(err.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;
use zeroize::Zeroizing;

use crate::{
    entities::{
        critique::{CritiqueRequest, CritiqueResult},
        video::{VideoOperation, VideoRequest},
    },
    errors::GenAiError,
    infrastructure::genai::prompts::{critique_schema, CRITIQUE_PROMPT},
    repositories::generative::GenerativeClient,
    settings::GeminiSettings,
};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// REST client for the Gemini / Veo endpoints.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    critique_model: String,
    api_key: Option<Zeroizing<String>>,
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings, api_key: Option<Zeroizing<String>>) -> Result<Self, GenAiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(GeminiClient {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            critique_model: settings.critique_model.clone(),
            api_key,
        })
    }

    fn key(&self) -> Result<&str, GenAiError> {
        self.api_key
            .as_ref()
            .map(|k| k.as_str())
            .filter(|k| !k.is_empty())
            .ok_or(GenAiError::MissingCredential)
    }

    async fn send_json(&self, request: RequestBuilder) -> Result<Value, GenAiError> {
        let response = request
            .header(API_KEY_HEADER, self.key()?)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(service_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| GenAiError::Decode(e.to_string()))
    }
}

#[derive(Deserialize)]
struct ServiceErrorBody {
    error: ServiceErrorDetail,
}

#[derive(Deserialize)]
struct ServiceErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

fn service_error(status: StatusCode, body: &str) -> GenAiError {
    let message = match serde_json::from_str::<ServiceErrorBody>(body) {
        Ok(parsed) if parsed.error.status.is_empty() => parsed.error.message,
        Ok(parsed) => format!("{} ({})", parsed.error.message, parsed.error.status),
        Err(_) => format!("HTTP {}: {}", status.as_u16(), body.trim()),
    };
    GenAiError::classify(Some(status.as_u16()), &message)
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// Extracts and validates the structured critique from a `generateContent` response.
pub fn parse_critique_response(body: &Value) -> Result<CritiqueResult, GenAiError> {
    let response: GenerateContentResponse =
        serde_json::from_value(body.clone()).map_err(|e| GenAiError::Decode(e.to_string()))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenAiError::EmptyResult);
    }

    let critique: CritiqueResult =
        serde_json::from_str(text.trim()).map_err(|e| GenAiError::Decode(e.to_string()))?;
    critique
        .validate()
        .map_err(|e| GenAiError::Decode(e.to_string()))?;

    Ok(critique)
}

/// Maps a long-running operation document onto [`VideoOperation`].
pub fn parse_video_operation(body: &Value) -> VideoOperation {
    let response = &body["response"];
    // Newer responses nest the payload one level deeper
    let payload = if response["generateVideoResponse"].is_object() {
        &response["generateVideoResponse"]
    } else {
        response
    };

    let samples = payload["generatedSamples"]
        .as_array()
        .or_else(|| payload["generatedVideos"].as_array());

    VideoOperation {
        name: body["name"].as_str().unwrap_or_default().to_string(),
        done: body["done"].as_bool().unwrap_or(false),
        error: body["error"]
            .as_object()
            .map(|e| {
                e.get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("The server failed while generating the video.")
                    .to_string()
            }),
        filtered_count: payload["raiMediaFilteredCount"].as_u64().unwrap_or(0) as u32,
        filtered_reasons: payload["raiMediaFilteredReasons"]
            .as_array()
            .map(|reasons| reasons.iter().filter_map(Value::as_str).map(String::from).collect())
            .unwrap_or_default(),
        video_uri: samples
            .and_then(|s| s.first())
            .and_then(|s| s["video"]["uri"].as_str())
            .map(String::from),
    }
}

/// Download links need the key as a query parameter.
pub fn with_key_param(uri: &str, key: &str) -> String {
    let separator = if uri.contains('?') { '&' } else { '?' };
    format!("{}{}key={}", uri, separator, urlencoding::encode(key))
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    fn has_credential(&self) -> bool {
        self.key().is_ok()
    }

    async fn generate_critique(&self, request: &CritiqueRequest) -> Result<CritiqueResult, GenAiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.critique_model);
        let body = json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": request.mime_type, "data": request.image_base64 } },
                    { "text": CRITIQUE_PROMPT }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": critique_schema()
            }
        });

        let response = self.send_json(self.http.post(&url).json(&body)).await?;
        parse_critique_response(&response)
    }

    async fn start_video_job(&self, model: &str, request: &VideoRequest) -> Result<VideoOperation, GenAiError> {
        let url = format!("{}/models/{}:predictLongRunning", self.base_url, model);
        let body = json!({
            "instances": [{
                "prompt": request.prompt,
                "image": {
                    "bytesBase64Encoded": request.image_base64,
                    "mimeType": request.mime_type
                }
            }],
            "parameters": {
                "aspectRatio": "9:16",
                "resolution": "720p",
                "sampleCount": 1
            }
        });

        let response = self.send_json(self.http.post(&url).json(&body)).await?;
        Ok(parse_video_operation(&response))
    }

    async fn poll_video_job(&self, operation_name: &str) -> Result<VideoOperation, GenAiError> {
        let url = format!("{}/{}", self.base_url, operation_name.trim_start_matches('/'));
        let response = self.send_json(self.http.get(&url)).await?;
        Ok(parse_video_operation(&response))
    }

    async fn download_video(&self, uri: &str) -> Result<Vec<u8>, GenAiError> {
        let response = self.http.get(with_key_param(uri, self.key()?)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenAiError::Network(format!("Video download failed: {}", status.as_u16())));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_response(text: &str) -> Value {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
    }

    #[test]
    fn parses_structured_critique() {
        let body = content_response(
            r#"{"totalScore": 72, "details": {"face": 80, "color": 65, "ratio": 70, "combination": 75, "item": 60},
                "gentleCritique": "Balanced palette.", "sincereCritique": "A museum of regret.", "oneLiner": "Nearly."}"#,
        );

        let critique = parse_critique_response(&body).unwrap();
        assert_eq!(critique.total_score, 72.0);
        assert_eq!(critique.details.item, 60.0);
        assert_eq!(critique.one_liner, "Nearly.");
    }

    #[test]
    fn empty_candidates_are_an_empty_result() {
        assert!(matches!(parse_critique_response(&json!({ "candidates": [] })), Err(GenAiError::EmptyResult)));
    }

    #[test]
    fn out_of_range_score_is_rejected() {
        let body = content_response(
            r#"{"totalScore": 140, "details": {"face": 1, "color": 1, "ratio": 1, "combination": 1, "item": 1},
                "gentleCritique": "a", "sincereCritique": "b", "oneLiner": "c"}"#,
        );
        assert!(matches!(parse_critique_response(&body), Err(GenAiError::Decode(_))));
    }

    #[test]
    fn reads_nested_video_operation() {
        let body = json!({
            "name": "models/veo/operations/abc",
            "done": true,
            "response": { "generateVideoResponse": {
                "raiMediaFilteredCount": 0,
                "generatedSamples": [{ "video": { "uri": "https://files/v1?alt=media" } }]
            }}
        });

        let op = parse_video_operation(&body);
        assert!(op.done);
        assert_eq!(op.name, "models/veo/operations/abc");
        assert_eq!(op.video_uri.as_deref(), Some("https://files/v1?alt=media"));
    }

    #[test]
    fn reads_safety_filter_fields() {
        let body = json!({
            "name": "op", "done": true,
            "response": { "raiMediaFilteredCount": 1, "raiMediaFilteredReasons": ["celebrity likeness"] }
        });

        let op = parse_video_operation(&body);
        assert_eq!(op.filtered_count, 1);
        assert_eq!(op.filtered_reasons, vec!["celebrity likeness".to_string()]);
        assert!(op.video_uri.is_none());
    }

    #[test]
    fn key_param_respects_existing_query() {
        assert_eq!(with_key_param("https://f/v?alt=media", "k1"), "https://f/v?alt=media&key=k1");
        assert_eq!(with_key_param("https://f/v", "k1"), "https://f/v?key=k1");
    }

    #[test]
    fn quota_errors_are_classified() {
        let err = service_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#,
        );
        assert!(err.is_quota());
    }

    #[test]
    fn entity_not_found_is_a_credential_error() {
        let err = service_error(
            StatusCode::NOT_FOUND,
            r#"{"error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}}"#,
        );
        assert!(matches!(err, GenAiError::InvalidCredential(_)));
    }
}

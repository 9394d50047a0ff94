use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::{entities::media::StoredObject, errors::BlobError, repositories::blob_store::BlobStore};

const API_VERSION: &str = "7";
const LIST_PAGE_SIZE: &str = "1000";

/// Client for a hosted blob service with a Vercel Blob compatible REST surface.
pub struct HostedBlobRepo {
    http: Client,
    api_url: String,
    token: Zeroizing<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PutResponse {
    url: String,
    pathname: String,
    #[serde(default)]
    content_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListedBlob {
    url: String,
    pathname: String,
    #[serde(default)]
    size: u64,
    uploaded_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    blobs: Vec<ListedBlob>,
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl From<ListedBlob> for StoredObject {
    fn from(blob: ListedBlob) -> Self {
        StoredObject {
            pathname: blob.pathname,
            url: blob.url,
            content_type: None,
            size: blob.size,
            uploaded_at: blob.uploaded_at,
        }
    }
}

impl HostedBlobRepo {
    pub fn new(api_url: &str, token: &str) -> Result<Self, BlobError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(HostedBlobRepo {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: Zeroizing::new(token.trim().to_string()),
        })
    }

    fn bearer(&self) -> Result<String, BlobError> {
        if self.token.is_empty() {
            return Err(BlobError::NotConfigured);
        }
        Ok(format!("Bearer {}", self.token.as_str()))
    }

    async fn list_page(&self, prefix: &str, cursor: Option<&str>, limit: &str) -> Result<ListResponse, BlobError> {
        let mut url = Url::parse(&self.api_url).map_err(|e| BlobError::Backend(e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("prefix", prefix).append_pair("limit", limit);
            if let Some(cursor) = cursor {
                query.append_pair("cursor", cursor);
            }
        }

        let response = self
            .http
            .get(url)
            .header("authorization", self.bearer()?)
            .header("x-api-version", API_VERSION)
            .send()
            .await?;

        Ok(ensure_success(response).await?.json::<ListResponse>().await?)
    }

    async fn upload(
        &self,
        pathname: &str,
        body: Vec<u8>,
        content_type: &str,
        allow_overwrite: bool,
    ) -> Result<StoredObject, BlobError> {
        let size = body.len() as u64;
        let response = self
            .http
            .put(format!("{}/{}", self.api_url, pathname))
            .header("authorization", self.bearer()?)
            .header("x-api-version", API_VERSION)
            .header("x-content-type", content_type)
            .header("x-add-random-suffix", "0")
            .header("x-allow-overwrite", if allow_overwrite { "1" } else { "0" })
            .body(body)
            .send()
            .await?;

        let stored: PutResponse = ensure_success(response).await?.json().await?;
        tracing::debug!(pathname = %stored.pathname, allow_overwrite, "Blob uploaded");

        Ok(StoredObject {
            pathname: stored.pathname,
            url: stored.url,
            content_type: stored.content_type.or_else(|| Some(content_type.to_string())),
            size,
            uploaded_at: Utc::now(),
        })
    }
}

async fn ensure_success(response: Response) -> Result<Response, BlobError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(failure_from(status, &body))
}

fn failure_from(status: StatusCode, body: &str) -> BlobError {
    let (code, message) = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(e) => (e.error.code, e.error.message),
        Err(_) => (String::new(), body.to_string()),
    };

    match status {
        StatusCode::NOT_FOUND => BlobError::NotFound(message),
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => BlobError::AlreadyExists(message),
        _ if code == "blob_already_exists" || message.contains("already exists") => BlobError::AlreadyExists(message),
        _ => BlobError::Backend(format!("HTTP {}: {}", status.as_u16(), message)),
    }
}

#[async_trait]
impl BlobStore for HostedBlobRepo {
    fn backend_name(&self) -> &'static str {
        "hosted"
    }

    async fn put(&self, pathname: &str, body: Vec<u8>, content_type: &str) -> Result<StoredObject, BlobError> {
        self.upload(pathname, body, content_type, true).await
    }

    async fn put_if_absent(
        &self,
        pathname: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<Option<StoredObject>, BlobError> {
        match self.upload(pathname, body, content_type, false).await {
            Ok(stored) => Ok(Some(stored)),
            Err(BlobError::AlreadyExists(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn head(&self, pathname: &str) -> Result<Option<StoredObject>, BlobError> {
        let objects = self.list(pathname).await?;
        Ok(objects.into_iter().find(|o| o.pathname == pathname))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, BlobError> {
        let mut objects = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.list_page(prefix, cursor.as_deref(), LIST_PAGE_SIZE).await?;
            objects.extend(page.blobs.into_iter().map(StoredObject::from));

            match page.cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }

        Ok(objects)
    }

    async fn fetch(&self, object: &StoredObject) -> Result<Vec<u8>, BlobError> {
        let response = self.http.get(&object.url).send().await?;
        Ok(ensure_success(response).await?.bytes().await?.to_vec())
    }

    async fn check_connection(&self) -> Result<(), BlobError> {
        self.list_page("", None, "1").await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn missing_token_is_not_configured() {
        let repo = HostedBlobRepo::new("http://127.0.0.1:9", " ").unwrap();
        let result = repo.put("a/b.json", vec![], "application/json").await;
        assert!(matches!(result, Err(BlobError::NotConfigured)));
        assert!(matches!(repo.check_connection().await, Err(BlobError::NotConfigured)));
    }

    #[test]
    fn list_response_reads_camel_case() {
        let body = r#"{"blobs":[{"url":"https://x/ns/1/score.json","pathname":"ns/1/score.json","size":42,
            "uploadedAt":"2024-05-01T10:00:00.000Z"}],"cursor":null,"hasMore":false}"#;
        let parsed: ListResponse = serde_json::from_str(body).unwrap();
        let object = StoredObject::from(parsed.blobs.into_iter().next().unwrap());
        assert_eq!(object.file_name(), "score.json");
        assert_eq!(object.size, 42);
        assert!(!parsed.has_more);
    }

    #[test]
    fn existing_blob_rejections_are_conflicts() {
        let body = r#"{"error":{"code":"blob_already_exists","message":"This blob already exists"}}"#;
        assert!(matches!(failure_from(StatusCode::BAD_REQUEST, body), BlobError::AlreadyExists(_)));
        assert!(matches!(failure_from(StatusCode::CONFLICT, ""), BlobError::AlreadyExists(_)));
        assert!(matches!(failure_from(StatusCode::NOT_FOUND, "gone"), BlobError::NotFound(_)));
        assert!(matches!(failure_from(StatusCode::BAD_GATEWAY, "oops"), BlobError::Backend(_)));
    }
}

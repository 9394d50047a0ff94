use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Media a user can have stored under their namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// 2:3 portrait cropped from the submitted photo
    UpperBody,
    /// Full result card capture
    Result,
    /// Generated video
    Video,
}

impl MediaKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "upper_body" => Some(MediaKind::UpperBody),
            "result" => Some(MediaKind::Result),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::UpperBody => "upper_body",
            MediaKind::Result => "result",
            MediaKind::Video => "video",
        }
    }

    fn file_stem(&self) -> &'static str {
        match self {
            MediaKind::UpperBody => "upper_image",
            MediaKind::Result => "fashion_image",
            MediaKind::Video => "video",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            MediaKind::Video => "mp4",
            _ => "jpg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            MediaKind::Video => "video/mp4",
            _ => "image/jpeg",
        }
    }

    /// File name of the given version. Version 1 carries no suffix.
    pub fn file_name(&self, version: u32) -> String {
        if version <= 1 {
            format!("{}.{}", self.file_stem(), self.extension())
        } else {
            format!("{}_v{}.{}", self.file_stem(), version, self.extension())
        }
    }

    /// Inverse of [`MediaKind::file_name`].
    pub fn version_of(&self, file_name: &str) -> Option<u32> {
        let rest = file_name.strip_prefix(self.file_stem())?;
        let rest = rest.strip_suffix(self.extension())?.strip_suffix('.')?;
        if rest.is_empty() {
            return Some(1);
        }
        rest.strip_prefix("_v")?
            .parse::<u32>()
            .ok()
            .filter(|v| *v >= 2)
    }
}

/// Object as reported by the blob store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub pathname: String,
    pub url: String,
    pub content_type: Option<String>,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

impl StoredObject {
    /// Last path segment.
    pub fn file_name(&self) -> &str {
        self.pathname.rsplit('/').next().unwrap_or(&self.pathname)
    }
}

/// Picks the highest version of `kind` among a user's objects.
pub fn latest_version<'a>(objects: &'a [StoredObject], kind: MediaKind) -> Option<(u32, &'a StoredObject)> {
    objects
        .iter()
        .filter_map(|o| kind.version_of(o.file_name()).map(|v| (v, o)))
        .max_by_key(|(v, _)| *v)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserIdValue {
    Text(String),
    Number(u64),
}

impl UserIdValue {
    pub fn normalized(&self) -> Option<String> {
        match self {
            UserIdValue::Text(s) if s.trim().is_empty() => None,
            UserIdValue::Text(s) => Some(s.trim().to_string()),
            UserIdValue::Number(n) => Some(n.to_string()),
        }
    }
}

/// Body of `POST /api/save-result`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResultRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserIdValue>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl SaveResultRequest {
    pub fn user_id(&self) -> Option<String> {
        self.user_id.as_ref().and_then(UserIdValue::normalized)
    }

    pub fn score(user_id: u32, user_name: &str, score: f64) -> Self {
        SaveResultRequest {
            user_id: Some(UserIdValue::Number(user_id as u64)),
            kind: Some("score".to_string()),
            score: Some(score),
            user_name: Some(user_name.to_string()),
            ..Default::default()
        }
    }

    pub fn image(user_id: u32, user_name: &str, kind: MediaKind, data_url: String) -> Self {
        SaveResultRequest {
            user_id: Some(UserIdValue::Number(user_id as u64)),
            kind: Some(kind.as_str().to_string()),
            image: Some(data_url),
            user_name: Some(user_name.to_string()),
            ..Default::default()
        }
    }

    pub fn video(user_id: u32, user_name: &str, data_url: String) -> Self {
        SaveResultRequest {
            user_id: Some(UserIdValue::Number(user_id as u64)),
            kind: Some(MediaKind::Video.as_str().to_string()),
            video: Some(data_url),
            user_name: Some(user_name.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResultResponse {
    pub success: bool,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetImageQuery {
    pub user_id: Option<String>,
    pub image_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageUrlResponse {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(pathname: &str) -> StoredObject {
        StoredObject {
            pathname: pathname.to_string(),
            url: format!("http://blob/{pathname}"),
            content_type: None,
            size: 0,
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn file_names_round_trip_through_versions() {
        assert_eq!(MediaKind::UpperBody.file_name(1), "upper_image.jpg");
        assert_eq!(MediaKind::Result.file_name(3), "fashion_image_v3.jpg");
        assert_eq!(MediaKind::Video.version_of("video_v2.mp4"), Some(2));
        assert_eq!(MediaKind::UpperBody.version_of("upper_image.jpg"), Some(1));
    }

    #[test]
    fn foreign_file_names_have_no_version() {
        assert_eq!(MediaKind::UpperBody.version_of("fashion_image.jpg"), None);
        assert_eq!(MediaKind::UpperBody.version_of("upper_image_vx.jpg"), None);
        assert_eq!(MediaKind::UpperBody.version_of("upper_image_v1.jpg"), None);
        assert_eq!(MediaKind::Result.version_of("score.json"), None);
    }

    #[test]
    fn latest_version_picks_highest_suffix() {
        let objects = vec![
            object("fashion-king/7/upper_image.jpg"),
            object("fashion-king/7/upper_image_v3.jpg"),
            object("fashion-king/7/upper_image_v2.jpg"),
            object("fashion-king/7/fashion_image_v9.jpg"),
        ];

        let (version, latest) = latest_version(&objects, MediaKind::UpperBody).unwrap();
        assert_eq!(version, 3);
        assert_eq!(latest.pathname, "fashion-king/7/upper_image_v3.jpg");
    }

    #[test]
    fn numeric_and_text_user_ids_normalize_alike() {
        let numeric: SaveResultRequest = serde_json::from_str(r#"{"userId": 12, "type": "score", "score": 80}"#).unwrap();
        let text: SaveResultRequest = serde_json::from_str(r#"{"userId": " 12 ", "type": "score", "score": 80}"#).unwrap();
        let blank: SaveResultRequest = serde_json::from_str(r#"{"userId": "", "type": "score"}"#).unwrap();

        assert_eq!(numeric.user_id().as_deref(), Some("12"));
        assert_eq!(text.user_id().as_deref(), Some("12"));
        assert_eq!(blank.user_id(), None);
    }
}

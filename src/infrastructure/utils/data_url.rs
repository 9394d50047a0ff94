use base64::{engine::general_purpose::STANDARD, Engine as _};
use derive_more::Display;

const BASE64_MARKER: &str = ";base64,";

#[derive(Debug, Display)]
pub enum DataUrlError {
    #[display("Payload is empty")]
    Empty,

    #[display("Invalid base64 payload: {_0}")]
    InvalidBase64(String),
}

/// Everything after `;base64,`, or the whole string when there is no prefix.
pub fn strip_data_url_prefix(value: &str) -> &str {
    value
        .rsplit_once(BASE64_MARKER)
        .map(|(_, data)| data)
        .unwrap_or(value)
}

/// MIME type declared by a `data:` URL, if any.
pub fn mime_from_data_url(value: &str) -> Option<&str> {
    let header = value.strip_prefix("data:")?;
    let (mime, _) = header.split_once(BASE64_MARKER)?;
    Some(mime).filter(|m| !m.is_empty())
}

pub fn decode_base64_payload(value: &str) -> Result<Vec<u8>, DataUrlError> {
    let payload = strip_data_url_prefix(value.trim());
    if payload.is_empty() {
        return Err(DataUrlError::Empty);
    }
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| DataUrlError::InvalidBase64(e.to_string()))
}

pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{}{}{}", mime_type, BASE64_MARKER, STANDARD.encode(bytes))
}

use serde::{Deserialize, Serialize};

/// One entry from `POST /api/v0/add`.
///
/// The node emits one JSON object per line; a single-file add produces
/// exactly one. `Size` is the on-wire block size as a decimal string —
/// kubo serializes it that way, and it includes framing overhead, so it
/// is not the logical file size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddResponse {
    pub name: String,
    /// The content identifier assigned by the node.
    pub hash: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub size: String,
}

impl AddResponse {
    /// Parses the string-encoded block size, if present and well-formed.
    pub fn size_bytes(&self) -> Option<u64> {
        self.size.parse().ok()
    }
}

/// Response from `POST /api/v0/version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionResponse {
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub commit: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repo: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub system: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub golang: String,
}

/// Error payload the node returns with non-2xx RPC responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiError {
    pub message: String,
    #[serde(default)]
    pub code: i32,
    #[serde(default, skip_serializing_if = "String::is_empty", rename = "Type")]
    pub kind: String,
}

impl ApiError {
    /// Extracts the node's error message from a raw response body.
    ///
    /// Falls back to the body itself when it is not the JSON error shape.
    pub fn message_from_body(body: &str) -> String {
        match serde_json::from_str::<ApiError>(body) {
            Ok(err) if !err.message.is_empty() => err.message,
            _ => body.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_response_parses_kubo_line() {
        let line = r#"{"Name":"a.txt","Hash":"bafy123","Size":"11"}"#;
        let resp: AddResponse = serde_json::from_str(line).unwrap();
        assert_eq!(resp.name, "a.txt");
        assert_eq!(resp.hash, "bafy123");
        assert_eq!(resp.size_bytes(), Some(11));
    }

    #[test]
    fn add_response_tolerates_missing_size() {
        let line = r#"{"Name":"a.txt","Hash":"bafy123"}"#;
        let resp: AddResponse = serde_json::from_str(line).unwrap();
        assert_eq!(resp.size_bytes(), None);
    }

    #[test]
    fn version_response_ignores_extras() {
        let body = r#"{"Version":"0.26.0","Commit":"abc123","Unknown":true}"#;
        let resp: VersionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.version, "0.26.0");
        assert_eq!(resp.commit, "abc123");
    }

    #[test]
    fn api_error_message_extraction() {
        let body = r#"{"Message":"invalid cid","Code":0,"Type":"error"}"#;
        assert_eq!(ApiError::message_from_body(body), "invalid cid");
    }

    #[test]
    fn api_error_falls_back_to_raw_body() {
        assert_eq!(ApiError::message_from_body("  boom \n"), "boom");
    }
}

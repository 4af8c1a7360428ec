//! The `{ "header": ..., "body": ... }` wrapper around every server response.

use serde::{Deserialize, Serialize};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// Response metadata the server attaches to every reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiHeader {
    pub id: String,
    pub status: String,
    pub servertime: i64,
    pub action: String,
    pub message: String,
    pub url: String,
    pub code: u16,
}

/// A decoded response envelope. `body` is left as raw JSON until the
/// resource operation decodes it into its typed result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiResponse {
    pub header: ApiHeader,
    pub body: serde_json::Value,
}

impl ApiResponse {
    /// Envelope standing in for a status-only reply with no body.
    pub fn empty(code: u16) -> Self {
        Self {
            header: ApiHeader {
                status: STATUS_SUCCESS.to_string(),
                code,
                ..ApiHeader::default()
            },
            body: serde_json::Value::Null,
        }
    }

    pub fn is_error(&self) -> bool {
        self.header.status == STATUS_ERROR
    }
}

//! Response records for the dispatcher protocol

use serde::{Deserialize, Serialize};

/// One response line. `response` carries the string rendering of the result,
/// or the error text when `status` is "failed".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireResponse {
    pub id: String,
    pub status: String,
    pub response: String,
}

impl WireResponse {
    /// Builds a succeeded response.
    pub fn succeeded(id: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: "succeeded".to_string(),
            response: response.into(),
        }
    }

    /// Builds a failed response carrying the error text.
    pub fn failed(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: "failed".to_string(),
            response: error.into(),
        }
    }

    /// Serializes to one protocol line (without the trailing newline).
    pub fn to_line(&self) -> String {
        serde_json::json!({
            "id": self.id,
            "status": self.status,
            "response": self.response,
        })
        .to_string()
    }
}

/// Renders a title list as its JSON array string for the `response` field.
pub fn render_list(titles: &[String]) -> String {
    serde_json::Value::from(titles.to_vec()).to_string()
}

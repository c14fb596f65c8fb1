use serde::{Deserialize, Serialize};
use shared_types::Properties;

/// Request body for storing a config. Id and group come from the path and
/// the modification time is set by the server.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PutConfigRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub properties: Properties,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

// ABOUTME: JSON request and response shapes exchanged with a CPI executable.
// ABOUTME: One request on stdin, one response on stdout, per call.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize)]
pub struct CpiRequest<'a> {
    pub method: &'a str,
    pub arguments: Vec<Value>,
    pub context: &'a Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CpiResponse {
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<CmdError>,
    #[serde(default)]
    pub log: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CmdError {
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub ok_to_retry: bool,
}

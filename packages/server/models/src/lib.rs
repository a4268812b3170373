#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the gradesheet server.
//!
//! These types are serialized to JSON for the REST API. Field names are
//! part of the wire contract and must not be renamed.

use serde::{Deserialize, Serialize};

/// Body of `POST /get_result`.
///
/// Both fields are required by the contract; they are optional here so
/// the handler can answer a missing field with the contract's 400
/// message instead of a generic deserialization error.
#[derive(Debug, Clone, Deserialize)]
pub struct GetResultRequest {
    /// Student roll number to look up.
    pub roll_no: Option<String>,
    /// Semester label selecting the gradesheet.
    pub semester: Option<String>,
}

/// Response of `GET /get_semesters`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemestersResponse {
    /// Semester labels in registry order.
    pub semesters: Vec<String>,
}

/// Error payload for 4xx/5xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Client-facing error message.
    pub error: String,
}

/// Payload for a roll number that is not present in the gradesheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiNotFound {
    /// Human-readable message naming the roll number and semester.
    pub message: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

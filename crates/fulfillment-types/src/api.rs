//! API types for HTTP endpoints and error envelopes.
//!
//! The HTTP layer stays thin: it deserializes these request shapes, calls
//! the workflow orchestrator, and maps `WorkflowError` onto `ApiError`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::WorkflowError;

/// Standard error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
	/// Additional error context
	pub details: Option<serde_json::Value>,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Bad request with validation errors (400)
	BadRequest { error_type: String, message: String },
	/// Access denied to an existing entity (403)
	Forbidden { message: String },
	/// Entity does not exist (404)
	NotFound { message: String },
	/// Structural invariant violation (409)
	Conflict { message: String },
	/// Business rule failure (422)
	UnprocessableEntity {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Internal server error (500)
	InternalServerError { message: String },
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::BadRequest { .. } => 400,
			ApiError::Forbidden { .. } => 403,
			ApiError::NotFound { .. } => 404,
			ApiError::Conflict { .. } => 409,
			ApiError::UnprocessableEntity { .. } => 422,
			ApiError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		match self {
			ApiError::BadRequest {
				error_type,
				message,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: None,
			},
			ApiError::Forbidden { message } => ErrorResponse {
				error: "FORBIDDEN".to_string(),
				message: message.clone(),
				details: None,
			},
			ApiError::NotFound { message } => ErrorResponse {
				error: "NOT_FOUND".to_string(),
				message: message.clone(),
				details: None,
			},
			ApiError::Conflict { message } => ErrorResponse {
				error: "CONFLICT".to_string(),
				message: message.clone(),
				details: None,
			},
			ApiError::UnprocessableEntity {
				error_type,
				message,
				details,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: details.clone(),
			},
			ApiError::InternalServerError { message } => ErrorResponse {
				error: "INTERNAL_ERROR".to_string(),
				message: message.clone(),
				details: None,
			},
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			ApiError::Forbidden { message } => write!(f, "Forbidden: {}", message),
			ApiError::NotFound { message } => write!(f, "Not Found: {}", message),
			ApiError::Conflict { message } => write!(f, "Conflict: {}", message),
			ApiError::UnprocessableEntity { message, .. } => {
				write!(f, "Unprocessable Entity: {}", message)
			}
			ApiError::InternalServerError { message } => {
				write!(f, "Internal Server Error: {}", message)
			}
		}
	}
}

impl std::error::Error for ApiError {}

impl From<WorkflowError> for ApiError {
	fn from(err: WorkflowError) -> Self {
		match err {
			WorkflowError::NotFound { .. } => ApiError::NotFound {
				message: err.to_string(),
			},
			WorkflowError::Forbidden(message) => ApiError::Forbidden { message },
			WorkflowError::InvalidTransition {
				ref from, ref to, ..
			} => ApiError::UnprocessableEntity {
				error_type: "INVALID_TRANSITION".to_string(),
				message: err.to_string(),
				details: Some(serde_json::json!({ "from": from, "to": to })),
			},
			WorkflowError::PreconditionFailed(message) => ApiError::UnprocessableEntity {
				error_type: "PRECONDITION_FAILED".to_string(),
				message,
				details: None,
			},
			WorkflowError::Conflict(message) => ApiError::Conflict { message },
			WorkflowError::Store(message) => ApiError::InternalServerError { message },
		}
	}
}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		let error_response = self.to_error_response();
		(status, Json(error_response)).into_response()
	}
}

/// Request body for status-change endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
	/// The status the caller wants the entity moved to, in wire form.
	pub status: String,
}

/// Request body for recording a manufacturing update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturingUpdateRequest {
	/// Status snapshot for this update, in wire form.
	pub status: String,
	/// Free-text notes.
	#[serde(default)]
	pub notes: String,
	/// Manufacturer the update is recorded on behalf of.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub manufacturer_id: Option<uuid::Uuid>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::EntityType;
	use uuid::Uuid;

	#[test]
	fn workflow_errors_map_to_distinct_status_codes() {
		let not_found: ApiError = WorkflowError::NotFound {
			entity: EntityType::Order,
			id: Uuid::nil(),
		}
		.into();
		let forbidden: ApiError = WorkflowError::Forbidden("denied".into()).into();
		let conflict: ApiError = WorkflowError::Conflict("last admin".into()).into();
		assert_eq!(not_found.status_code(), 404);
		assert_eq!(forbidden.status_code(), 403);
		assert_eq!(conflict.status_code(), 409);
	}

	#[test]
	fn invalid_transition_carries_endpoints_in_details() {
		let err: ApiError = WorkflowError::InvalidTransition {
			entity: EntityType::Order,
			from: "completed".into(),
			to: "draft".into(),
		}
		.into();
		match err {
			ApiError::UnprocessableEntity { details, .. } => {
				let details = details.unwrap();
				assert_eq!(details["from"], "completed");
				assert_eq!(details["to"], "draft");
			}
			other => panic!("unexpected mapping: {:?}", other),
		}
	}
}

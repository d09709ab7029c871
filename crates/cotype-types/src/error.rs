//! Error type shared by every Cotype crate.
//!
//! Handlers return `CtResult<T>`; the `IntoResponse` impl turns an `Error`
//! into a JSON body of the form `{ "code": "E-...", "message": "..." }`.

use axum::{Json, http::StatusCode, response::IntoResponse};

pub type CtResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	/// No principal could be resolved for the request
	Unauthorized,
	/// The access control policy rejected the operation
	PermissionDenied,
	/// A transition policy rejected the operation
	Forbidden(String),
	/// Business rule or storage conflict, the message is shown to the user
	Conflict(String),
	ValidationError(String),
	ConfigError(String),
	DbError,
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl Error {
	fn status_and_code(&self) -> (StatusCode, &'static str) {
		match self {
			Error::NotFound => (StatusCode::NOT_FOUND, "E-NOT-FOUND"),
			Error::Unauthorized => (StatusCode::UNAUTHORIZED, "E-UNAUTHORIZED"),
			Error::PermissionDenied => (StatusCode::FORBIDDEN, "E-PERMISSION-DENIED"),
			Error::Forbidden(_) => (StatusCode::FORBIDDEN, "E-FORBIDDEN"),
			Error::Conflict(_) => (StatusCode::CONFLICT, "E-CONFLICT"),
			Error::ValidationError(_) => (StatusCode::BAD_REQUEST, "E-VALIDATION"),
			Error::ConfigError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "E-CONFIG"),
			Error::DbError => (StatusCode::INTERNAL_SERVER_ERROR, "E-DB"),
			Error::Internal(_) | Error::Io(_) => {
				(StatusCode::INTERNAL_SERVER_ERROR, "E-INTERNAL")
			}
		}
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "Not found"),
			Error::Unauthorized => write!(f, "Authentication required"),
			Error::PermissionDenied => write!(f, "Permission denied"),
			Error::Forbidden(msg)
			| Error::Conflict(msg)
			| Error::ValidationError(msg)
			| Error::Internal(msg) => write!(f, "{}", msg),
			Error::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
			Error::DbError => write!(f, "Database error"),
			Error::Io(err) => write!(f, "I/O error: {}", err),
		}
	}
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::ValidationError(format!("Invalid JSON: {}", err))
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		let (status, code) = self.status_and_code();
		if status.is_server_error() {
			tracing::error!(code, "Request failed: {}", self);
		}
		// Internal details stay in the log
		let message = match &self {
			Error::DbError | Error::Internal(_) | Error::Io(_) => "Internal server error".to_string(),
			err => err.to_string(),
		};
		let body = serde_json::json!({
			"code": code,
			"message": message,
		});
		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_conflict_maps_to_409() {
		let res = Error::Conflict("role in use".into()).into_response();
		assert_eq!(res.status(), StatusCode::CONFLICT);
	}

	#[test]
	fn test_forbidden_and_permission_denied_map_to_403() {
		assert_eq!(Error::PermissionDenied.into_response().status(), StatusCode::FORBIDDEN);
		assert_eq!(
			Error::Forbidden("nope".into()).into_response().status(),
			StatusCode::FORBIDDEN
		);
	}

	#[test]
	fn test_display_keeps_user_message() {
		let err = Error::Conflict("You cannot delete your own account! Sorry.".into());
		assert_eq!(err.to_string(), "You cannot delete your own account! Sorry.");
	}
}

// vim: ts=4

//! Error type shared by every forumgate crate.

use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};

use crate::types::ErrorResponse;

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Token, topic, or record does not resolve
	NotFound,
	/// Referrer/host or credential authorization failure
	PermissionDenied,
	/// Neither of the identifying request parameters was supplied
	MissingParameter(&'static str),
	ValidationError(String),
	DbError,
	Parse,
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl Error {
	/// Machine-readable error code used in JSON error payloads
	pub fn code(&self) -> &'static str {
		match self {
			Error::NotFound => "not_found",
			Error::PermissionDenied => "invalid_access",
			Error::MissingParameter(_) => "invalid_parameters",
			Error::ValidationError(_) => "invalid_parameters",
			Error::Parse => "invalid_parameters",
			Error::DbError | Error::Internal(_) | Error::Io(_) => "server_error",
		}
	}

	pub fn status(&self) -> StatusCode {
		match self {
			Error::NotFound => StatusCode::NOT_FOUND,
			Error::PermissionDenied => StatusCode::FORBIDDEN,
			Error::MissingParameter(_) | Error::ValidationError(_) | Error::Parse => {
				StatusCode::BAD_REQUEST
			}
			Error::DbError | Error::Internal(_) | Error::Io(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::MissingParameter(name) => write!(f, "missing parameter: {}", name),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::DbError => write!(f, "database error"),
			Error::Parse => write!(f, "parse error"),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "I/O error: {}", err),
		}
	}
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status();
		// Internal details stay in the log, the client only gets the code
		let message = if status.is_server_error() {
			tracing::warn!(error = %self, "Request failed");
			"Internal server error".to_string()
		} else {
			self.to_string()
		};
		(status, Json(ErrorResponse::new(self.code().to_string(), message))).into_response()
	}
}


// vim: ts=4

use std::borrow::Cow;

use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::store::StoreError;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error message sent to the client.
///
/// `content` is a stable snake_case code, `field` is set when the error
/// relates to a single input field.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Message<'a> {
	pub content: Cow<'a, str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	#[must_use]
	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	#[must_use]
	pub fn detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(|| Cow::Owned(Map::new()))
			.to_mut()
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// The body of every error response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse<'a> {
	pub success: bool,
	pub errors: Vec<Message<'a>>,
}

/// Describes how a route-specific error is presented to the client.
pub trait ErrorShape: std::fmt::Debug {
	fn status(&self) -> StatusCode;
	fn errors(&self) -> Vec<Message<'_>>;
}

fn respond(status: StatusCode, errors: Vec<Message<'_>>) -> Response<Body> {
	(
		status,
		axum::Json(ErrorResponse {
			success: false,
			errors,
		}),
	)
		.into_response()
}

/// Errors shared by every route.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0}")]
	Json(#[from] rejection::JsonRejection),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("store error: {0}")]
	Store(#[from] StoreError),
}

impl AppError {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Json(..) => StatusCode::UNPROCESSABLE_ENTITY,
			Self::Query(..) | Self::Path(..) => StatusCode::BAD_REQUEST,
			Self::Store(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	pub fn errors(&self) -> Vec<Message<'_>> {
		match self {
			Self::Validation(errors) => validation_messages(errors),
			Self::Json(error) => Message::new("invalid_body")
				.detail("reason", error.body_text())
				.into_vec(),
			Self::Query(error) => Message::new("invalid_query")
				.detail("reason", error.body_text())
				.into_vec(),
			Self::Path(error) => Message::new("invalid_path")
				.detail("reason", error.body_text())
				.into_vec(),
			Self::Store(..) => Vec::new(),
		}
	}
}

/// Flattens validation errors into one message per failed rule, ordered by field.
fn validation_messages(errors: &validator::ValidationErrors) -> Vec<Message<'static>> {
	let mut fields = errors
		.field_errors()
		.into_iter()
		.map(|(field, errors)| (field.to_string(), errors))
		.collect::<Vec<_>>();

	fields.sort_by(|a, b| a.0.cmp(&b.0));

	fields
		.into_iter()
		.flat_map(|(field, errors)| {
			errors.iter().map(move |error| {
				let mut message = Message::new(error.code.clone()).field(field.clone());

				for (key, value) in &error.params {
					if key != "value" {
						message = message.detail(key.to_string(), value.clone());
					}
				}

				message
			})
		})
		.collect()
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response<Body> {
		if let Self::Store(ref error) = self {
			tracing::error!(%error, "store failure");
		}

		respond(self.status(), self.errors())
	}
}

/// An error returned from a route: either a shared [`AppError`] or
/// the route group's own error type.
#[derive(Debug)]
pub enum RouteError<T> {
	App(AppError),
	Route(T),
}

impl<T: ErrorShape> From<T> for RouteError<T> {
	fn from(error: T) -> Self {
		Self::Route(error)
	}
}

impl<T> From<AppError> for RouteError<T> {
	fn from(error: AppError) -> Self {
		Self::App(error)
	}
}

impl<T> From<StoreError> for RouteError<T> {
	fn from(error: StoreError) -> Self {
		Self::App(AppError::Store(error))
	}
}

impl<T: ErrorShape> IntoResponse for RouteError<T> {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::App(error) => error.into_response(),
			Self::Route(error) => {
				let status = error.status();

				if status.is_server_error() {
					tracing::error!(?error, "route failure");
				}

				respond(status, error.errors())
			}
		}
	}
}

impl<T> aide::OperationOutput for RouteError<T> {
	type Inner = ErrorResponse<'static>;
}

#[cfg(test)]
mod test {
	use validator::Validate;

	use super::*;

	#[derive(Validate)]
	struct Input {
		#[validate(length(max = 3))]
		name: String,
		#[validate(required)]
		count: Option<i32>,
	}

	#[test]
	fn test_validation_messages_are_sorted_by_field() {
		let input = Input {
			name: "abcd".into(),
			count: None,
		};

		let error = AppError::from(input.validate().unwrap_err());
		let errors = error.errors();

		assert_eq!(error.status(), StatusCode::UNPROCESSABLE_ENTITY);
		assert_eq!(errors.len(), 2);
		assert_eq!(errors[0].field.as_deref(), Some("count"));
		assert_eq!(errors[0].content, "required");
		assert_eq!(errors[1].field.as_deref(), Some("name"));
		assert_eq!(errors[1].content, "length");
		assert_eq!(
			errors[1].details.as_ref().and_then(|d| d.get("max")),
			Some(&serde_json::json!(3))
		);
	}

	#[test]
	fn test_message_builder() {
		let message = Message::new("unknown_post")
			.detail("post", "abc")
			.into_vec();

		assert_eq!(message.len(), 1);
		assert!(message[0].field.is_none());
		assert_eq!(
			serde_json::to_value(&message[0]).unwrap(),
			serde_json::json!({ "content": "unknown_post", "details": { "post": "abc" } })
		);
	}
}

pub use crate::route::model::{IdInput, Page, Paginate};

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::route::auth::model::User;

/// A single post, created by a user.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Post {
	/// The unique identifier of the post.
	pub id: Uuid,
	/// The user that created the post.
	pub user_id: Uuid,
	/// The title of the post.
	pub title: String,
	/// The content of the post.
	pub content: String,
	/// Drafts are never shown to the public.
	pub is_draft: bool,
	/// When the post becomes public. Posts without one are public immediately.
	pub published_at: Option<DateTime<Utc>>,
	/// The creation time of the post.
	pub created_at: DateTime<Utc>,
	/// The last time the post was changed.
	pub updated_at: DateTime<Utc>,
}

impl Post {
	/// Whether the post can be listed and read by anyone at `now`.
	///
	/// Mirrored in SQL by the Postgres store's listing filter.
	pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
		!self.is_draft && self.published_at.map_or(true, |at| at <= now)
	}
}

/// The public representation of a post's owner.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Author {
	pub id: Uuid,
	pub username: String,
	pub created_at: DateTime<Utc>,
}

impl From<User> for Author {
	fn from(user: User) -> Self {
		Self {
			id: user.id,
			username: user.username,
			created_at: user.created_at,
		}
	}
}

/// A post along with the user that owns it.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PostWithUser {
	#[serde(flatten)]
	pub post: Post,
	pub user: Author,
}

/// The longest title a post may have, in characters.
pub const TITLE_MAX_LENGTH: usize = 255;

/// Reads a text field, trimmed. Numbers, booleans and other values are
/// rejected with `string`.
fn text(value: &Value) -> Result<&str, ValidationError> {
	value
		.as_str()
		.map(str::trim)
		.ok_or_else(|| ValidationError::new("string"))
}

fn validate_title(value: &Value) -> Result<(), ValidationError> {
	let title = text(value)?;

	if title.is_empty() {
		return Err(ValidationError::new("blank"));
	}

	if title.chars().count() > TITLE_MAX_LENGTH {
		let mut error = ValidationError::new("length");
		error.add_param("max".into(), &TITLE_MAX_LENGTH);

		return Err(error);
	}

	Ok(())
}

fn validate_content(value: &Value) -> Result<(), ValidationError> {
	if text(value)?.is_empty() {
		return Err(ValidationError::new("blank"));
	}

	Ok(())
}

/// Reads a draft flag. Besides JSON booleans, `1`, `0`, `"1"` and `"0"`
/// are accepted.
pub fn parse_flag(value: &Value) -> Result<bool, ValidationError> {
	match value {
		Value::Bool(flag) => Ok(*flag),
		Value::Number(number) if number.as_u64() == Some(1) => Ok(true),
		Value::Number(number) if number.as_u64() == Some(0) => Ok(false),
		Value::String(flag) if flag == "1" => Ok(true),
		Value::String(flag) if flag == "0" => Ok(false),
		_ => Err(ValidationError::new("boolean")),
	}
}

fn validate_flag(value: &Value) -> Result<(), ValidationError> {
	parse_flag(value).map(|_| ())
}

fn validate_timestamp(value: &Value) -> Result<(), ValidationError> {
	match value {
		Value::String(value) => parse_timestamp(value).map(|_| ()),
		_ => Err(ValidationError::new("timestamp")),
	}
}

/// Parses a publication time. Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM-DD HH:MM:SS` (both with optional fractional seconds) and
/// `YYYY-MM-DD`, the last three in UTC.
/// A blank value means "no time".
pub fn parse_timestamp(value: &str) -> Result<Option<DateTime<Utc>>, ValidationError> {
	let value = value.trim();

	if value.is_empty() {
		return Ok(None);
	}

	if let Ok(at) = DateTime::parse_from_rfc3339(value) {
		return Ok(Some(at.with_timezone(&Utc)));
	}

	for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
		if let Ok(at) = NaiveDateTime::parse_from_str(value, format) {
			return Ok(Some(at.and_utc()));
		}
	}

	NaiveDate::parse_from_str(value, "%Y-%m-%d")
		.ok()
		.and_then(|date| date.and_hms_opt(0, 0, 0))
		.map(|at| Some(at.and_utc()))
		.ok_or_else(|| ValidationError::new("timestamp"))
}

/// The body of a create or update request.
///
/// Fields are kept as raw JSON so that missing and mistyped fields are
/// both reported by validation alongside the other field errors.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct PostInput {
	/// The title of the post, at most 255 characters.
	#[validate(required, custom(function = "validate_title"))]
	#[schemars(with = "Option<String>")]
	pub title: Option<Value>,
	/// The content of the post.
	#[validate(required, custom(function = "validate_content"))]
	#[schemars(with = "Option<String>")]
	pub content: Option<Value>,
	/// Whether the post is a draft.
	#[validate(required, custom(function = "validate_flag"))]
	#[schemars(with = "Option<bool>")]
	pub is_draft: Option<Value>,
	/// When the post becomes public, or null to publish immediately.
	#[validate(custom(function = "validate_timestamp"))]
	#[schemars(with = "Option<String>")]
	pub published_at: Option<Value>,
}

impl PostInput {
	/// Converts validated input into the fields stored on a post.
	///
	/// Publication times are stored to the second.
	pub fn into_fields(self) -> PostFields {
		let trimmed = |value: Option<Value>| {
			value
				.as_ref()
				.and_then(Value::as_str)
				.map(|value| value.trim().to_owned())
				.unwrap_or_default()
		};

		PostFields {
			title: trimmed(self.title),
			content: trimmed(self.content),
			is_draft: self
				.is_draft
				.as_ref()
				.and_then(|value| parse_flag(value).ok())
				.unwrap_or_default(),
			published_at: self
				.published_at
				.as_ref()
				.and_then(Value::as_str)
				.and_then(|value| parse_timestamp(value).ok().flatten())
				.map(|at| at.trunc_subsecs(0)),
		}
	}
}

/// The mutable fields of a post.
#[derive(Debug, Clone)]
pub struct PostFields {
	pub title: String,
	pub content: String,
	pub is_draft: bool,
	pub published_at: Option<DateTime<Utc>>,
}

use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid email or password")]
	InvalidEmailOrPassword,
	#[error("password hashing error")]
	Argon(#[from] argon2::Error),
	#[error("no session cookie or bearer token")]
	NoSessionCookieOrToken,
	#[error("invalid session")]
	InvalidSession,
	#[error("invalid bearer token")]
	InvalidToken,
	#[error("username already taken")]
	UsernameTaken,
	#[error("email already taken")]
	EmailTaken,
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/login", post_with(login, login_docs))
		.api_route("/logout", get_with(logout, logout_docs))
		.api_route("/register", post_with(register, register_docs))
		.api_route("/me", get_with(get_me, get_me_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidEmailOrPassword
			| Self::NoSessionCookieOrToken
			| Self::InvalidSession
			| Self::InvalidToken => StatusCode::UNAUTHORIZED,
			Self::Argon(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::UsernameTaken | Self::EmailTaken => StatusCode::CONFLICT,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		let message = match self {
			Self::InvalidEmailOrPassword => "invalid_email_or_password",
			Self::Argon(..) => "internal",
			Self::NoSessionCookieOrToken => "unauthenticated",
			Self::InvalidSession | Self::InvalidToken => "invalid_session",
			Self::UsernameTaken => "username_taken",
			Self::EmailTaken => "email_taken",
		};

		let message = error::Message::new(message);

		match self {
			Self::UsernameTaken => message.field("username").into_vec(),
			Self::EmailTaken => message.field("email").into_vec(),
			_ => message.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_signup_flow() {
		let (server, _) = server();

		let response = server
			.post("/auth/register")
			.json(&json!({
				"email": "john@smith.com",
				"username": "john",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert!(response
			.header("set-cookie")
			.to_str()
			.unwrap()
			.contains("session="));

		let response = server
			.post("/auth/login")
			.json(&json!({
				"email": "john@smith.com",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let token = response.json::<Value>()["session_id"]
			.as_str()
			.unwrap()
			.to_owned();

		let response = server
			.get("/auth/me")
			.add_header(header::AUTHORIZATION, bearer(&token))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert_eq!(response.json::<Value>()["username"], "john");
		assert!(response.json::<Value>().get("email").is_none());

		let response = server
			.get("/auth/logout")
			.add_header(header::AUTHORIZATION, bearer(&token))
			.await;

		assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

		let response = server
			.get("/auth/me")
			.add_header(header::AUTHORIZATION, bearer(&token))
			.await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
	}

	#[tokio::test]
	async fn test_wrong_password() {
		let (server, _) = server();

		server
			.post("/auth/register")
			.json(&json!({
				"email": "john@smith.com",
				"username": "john",
				"password": "hunter2hunter",
			}))
			.await;

		let response = server
			.post("/auth/login")
			.json(&json!({
				"email": "john@smith.com",
				"password": "hunter3hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"invalid_email_or_password"
		);
	}

	#[tokio::test]
	async fn test_duplicate_username() {
		let (server, store) = server();
		user(&store, "john").await;

		let response = server
			.post("/auth/register")
			.json(&json!({
				"email": "other@smith.com",
				"username": "john",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::CONFLICT);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "username");
	}

	#[tokio::test]
	async fn test_register_reports_invalid_fields() {
		let (server, store) = server();

		let response = server
			.post("/auth/register")
			.json(&json!({
				"email": "not an email",
				"username": "j!",
				"password": "short",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
		assert_eq!(
			error_fields(&response.json::<Value>()),
			["email", "password", "username"]
		);
		assert!(store.find_user_by_email("not an email").await.unwrap().is_none());

		let response = server
			.post("/auth/login")
			.text("{ not json")
			.content_type("application/json")
			.await;

		assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"invalid_body"
		);
	}

	#[tokio::test]
	async fn test_me_requires_session() {
		let (server, _) = server();

		let response = server.get("/auth/me").await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
		assert_eq!(
			response.json::<Value>()["errors"][0]["content"],
			"unauthenticated"
		);
	}
}

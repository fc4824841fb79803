use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};

use uuid::Uuid;

use crate::{
	error::RouteError,
	openapi::{SECURITY_SCHEME_BEARER, SECURITY_SCHEME_SESSION},
	route::auth,
	session,
	store::DynStore,
};

pub const AUTHORIZATION_PREFIX: &str = "Bearer ";

/// Extracts the session and related user from the request.
///
/// A bearer token in the `Authorization` header takes precedence over the
/// session cookie. Both carry a session id.
///
/// If neither exists, a [`auth::Error::NoSessionCookieOrToken`] is returned.
/// If the session is unknown, a [`auth::Error::InvalidSession`] is returned.
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{:?}", session.user);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub id: Uuid,
	pub user: auth::model::User,
}

/// Finds the session id sent with the request, if any.
fn session_id(parts: &request::Parts) -> Result<Uuid, auth::Error> {
	if let Some(value) = parts.headers.get(header::AUTHORIZATION) {
		let token = value
			.to_str()
			.ok()
			.and_then(|value| value.strip_prefix(AUTHORIZATION_PREFIX))
			.ok_or(auth::Error::InvalidToken)?;

		return Uuid::parse_str(token.trim()).map_err(|_| auth::Error::InvalidToken);
	}

	let cookie = parts
		.headers
		.get_all(header::COOKIE)
		.into_iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(cookie::Cookie::split_parse)
		.filter_map(Result::ok)
		.find(|cookie| cookie.name() == session::COOKIE_NAME)
		.ok_or(auth::Error::NoSessionCookieOrToken)?;

	Uuid::parse_str(cookie.value()).map_err(|_| auth::Error::InvalidSession)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	DynStore: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let id = session_id(parts)?;
		let store = DynStore::from_ref(state);
		let user = store
			.find_session_user(id)
			.await?
			.ok_or(auth::Error::InvalidSession)?;

		Ok(Session { id, user })
	}
}

impl OperationInput for Session {
	/// Operation input for the session extractor.
	///
	/// This adds a session cookie or bearer token requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.extend([
			[(SECURITY_SCHEME_SESSION.to_string(), Vec::new())]
				.into_iter()
				.collect(),
			[(SECURITY_SCHEME_BEARER.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		]);
	}
}

#[cfg(test)]
mod test {
	use axum::http::Request;

	use super::*;

	fn parts(name: header::HeaderName, value: &str) -> request::Parts {
		Request::builder()
			.header(name, value)
			.body(())
			.unwrap()
			.into_parts()
			.0
	}

	#[test]
	fn test_bearer_token_takes_precedence() {
		let id = Uuid::new_v4();
		let mut parts = parts(header::AUTHORIZATION, &format!("Bearer {id}"));
		parts.headers.insert(
			header::COOKIE,
			format!("session={}", Uuid::new_v4()).parse().unwrap(),
		);

		assert_eq!(session_id(&parts).unwrap(), id);
	}

	#[test]
	fn test_session_cookie() {
		let id = Uuid::new_v4();
		let parts = parts(header::COOKIE, &format!("theme=dark; session={id}"));

		assert_eq!(session_id(&parts).unwrap(), id);
	}

	#[test]
	fn test_malformed_credentials() {
		let no_prefix = parts(header::AUTHORIZATION, "Token abc");
		let bad_cookie = parts(header::COOKIE, "session=abc");
		let other_cookie = parts(header::COOKIE, "theme=dark");

		assert!(matches!(session_id(&no_prefix), Err(auth::Error::InvalidToken)));
		assert!(matches!(
			session_id(&bad_cookie),
			Err(auth::Error::InvalidSession)
		));
		assert!(matches!(
			session_id(&other_cookie),
			Err(auth::Error::NoSessionCookieOrToken)
		));
	}
}

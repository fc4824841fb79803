use aide::axum::IntoApiResponse;
use argon2::Argon2;
use axum::{
	extract::State,
	http::{header, StatusCode},
};
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Json, Session},
	openapi::tag,
	session,
	store::{DynStore, StoreError},
	AppState,
};

use super::{model, Error, RouteError};

pub const KEY_LENGTH: usize = 32;

/// Hashes a password with Argon2, using the user's id as a salt.
/// Since this is only used for logging in and creating a new password,
/// the scope of this function can remain in here with no issues.
fn hash_password(
	hasher: &Argon2,
	password: &str,
	id: &Uuid,
) -> Result<[u8; KEY_LENGTH], argon2::Error> {
	let mut hash = [0; KEY_LENGTH];

	hasher.hash_password_into(password.as_bytes(), id.as_bytes(), &mut hash)?;
	Ok(hash)
}

/// Log in
/// Logs in to an account, returning an associated session cookie.
/// The session id can also be sent as a bearer token.
#[route(
	tag = tag::AUTH,
	response(status = 200, description = "Logged in successfully.", shape = "Json<model::Session>"),
	error(status = 401, description = "The email or password is wrong."),
	error(status = 422, description = "The body failed validation.")
)]
pub async fn login(
	State(state): State<AppState>,
	Json(auth): Json<model::LoginInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let Some(user) = state.store.find_user_by_email(&auth.email).await? else {
		return Err(Error::InvalidEmailOrPassword.into());
	};

	let hashed = hash_password(&state.hasher, &auth.password, &user.id).map_err(Error::Argon)?;

	if user.password != hashed {
		return Err(Error::InvalidEmailOrPassword.into());
	}

	let session = state.store.create_session(user.id).await?;
	let cookie = session::create_cookie(session.id);

	tracing::info!(user = %user.id, "user logged in");

	Ok(([(header::SET_COOKIE, cookie.to_string())], Json(session)))
}

/// Log out
/// Logs out of the authenticated account, invalidating the session.
#[route(
	tag = tag::AUTH,
	response(status = 204, description = "Logged out successfully."),
	error(status = 401, description = "No valid session was provided.")
)]
pub async fn logout(
	State(store): State<DynStore>,
	session: Session,
) -> Result<impl IntoApiResponse, RouteError> {
	store.delete_session(session.id).await?;

	// Clear the session cookie
	Ok((
		[(header::SET_COOKIE, session::clear_cookie().to_string())],
		StatusCode::NO_CONTENT,
	))
}

/// Register account
/// Registers a new account, returning an associated session cookie.
#[route(
	tag = tag::AUTH,
	response(status = 200, description = "Registered successfully.", shape = "Json<model::Session>"),
	error(status = 409, description = "The email or username is already taken."),
	error(status = 422, description = "The body failed validation.")
)]
pub async fn register(
	State(state): State<AppState>,
	Json(auth): Json<model::RegisterInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user_id = Uuid::new_v4();
	let hashed = hash_password(&state.hasher, &auth.password, &user_id).map_err(Error::Argon)?;

	let user = state
		.store
		.create_user(user_id, &auth.email, &auth.username, &hashed)
		.await
		.map_err(|e| match e {
			StoreError::Conflict("email") => Error::EmailTaken.into(),
			StoreError::Conflict("username") => Error::UsernameTaken.into(),
			e => RouteError::from(e),
		})?;

	let session = state.store.create_session(user.id).await?;
	let cookie = session::create_cookie(session.id);

	tracing::info!(user = %user.id, "user registered");

	Ok(([(header::SET_COOKIE, cookie.to_string())], Json(session)))
}

/// Get user
/// Returns the authenticated user.
#[route(
	tag = tag::AUTH,
	error(status = 401, description = "No valid session was provided.")
)]
pub async fn get_me(session: Session) -> Json<model::User> {
	Json(session.user)
}

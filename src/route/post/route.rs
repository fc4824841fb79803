use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Created, Deferred, Json, Path, Query, Session},
	openapi::tag,
	store::DynStore,
};

use super::{model, policy, Error, RouteError};

/// Malformed ids are answered like unknown ones.
fn parse_id(path: &model::IdInput) -> Result<Uuid, Error> {
	Uuid::parse_str(&path.id).map_err(|_| Error::UnknownPost(path.id.clone()))
}

/// Loads a post for a change by the session's user, checking ownership.
async fn find_owned(
	store: &DynStore,
	session: &Session,
	path: &model::IdInput,
) -> Result<model::Post, RouteError> {
	let id = parse_id(path)?;
	let post = store
		.find_post(id)
		.await?
		.ok_or_else(|| Error::UnknownPost(path.id.clone()))?;

	if !policy::can_modify(session.user.id, &post) {
		tracing::warn!(post = %post.id, user = %session.user.id, "denied change to post");

		return Err(Error::NotOwner(post.id).into());
	}

	Ok(post)
}

/// Get all posts
/// Returns a page of publicly visible posts, twenty per page.
/// Drafts and posts scheduled for the future are left out.
#[route(tag = tag::POST)]
pub async fn list_posts(
	State(store): State<DynStore>,
	Query(paginate): Query<model::Paginate>,
) -> Result<Json<model::Page<model::PostWithUser>>, RouteError> {
	let (posts, total) = store
		.list_visible_posts(Utc::now(), paginate.limit(), paginate.offset())
		.await?;

	Ok(Json(model::Page::new(posts, total, &paginate)))
}

/// Get single post
/// Returns a single visible post and its author by the post's unique id.
#[route(
	tag = tag::POST,
	error(status = 404, description = "The post does not exist or is not visible.")
)]
pub async fn get_post(
	State(store): State<DynStore>,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::PostWithUser>, RouteError> {
	let id = parse_id(&path)?;
	let post = store
		.find_post_with_user(id)
		.await?
		.filter(|post| post.post.is_visible_at(Utc::now()))
		.ok_or(Error::UnknownPost(path.id))?;

	Ok(Json(post))
}

/// Create post
/// Creates a new post owned by the authenticated user.
#[route(
	tag = tag::POST,
	response(status = 201, description = "The created post.", shape = "Created<model::Post>"),
	error(status = 401, description = "No valid session was provided."),
	error(status = 422, description = "The body failed validation.")
)]
pub async fn create_post(
	State(store): State<DynStore>,
	session: Session,
	Json(input): Json<model::PostInput>,
) -> Result<Created<model::Post>, RouteError> {
	let post = store
		.create_post(session.user.id, input.into_fields())
		.await?;

	tracing::info!(post = %post.id, user = %session.user.id, "created post");

	Ok(Created(post))
}

/// Update post
/// Replaces the title, content, draft flag and publication time of a post.
/// Only the author may update a post.
#[route(
	tag = tag::POST,
	error(status = 401, description = "No valid session was provided."),
	error(status = 403, description = "The post belongs to another user."),
	error(status = 404, description = "The post does not exist."),
	error(status = 422, description = "The body failed validation.")
)]
pub async fn update_post(
	State(store): State<DynStore>,
	session: Session,
	Path(path): Path<model::IdInput>,
	body: Deferred<model::PostInput>,
) -> Result<Json<model::PostWithUser>, RouteError> {
	let post = find_owned(&store, &session, &path).await?;
	let fields = body.validated()?.into_fields();

	let post = store
		.update_post(post.id, fields)
		.await?
		.ok_or(Error::UnknownPost(path.id))?;

	tracing::info!(post = %post.id, "updated post");

	Ok(Json(model::PostWithUser {
		post,
		user: session.user.into(),
	}))
}

/// Delete post
/// Permanently deletes a post. Only the author may delete a post.
#[route(
	tag = tag::POST,
	response(status = 204, description = "The post was deleted."),
	error(status = 401, description = "No valid session was provided."),
	error(status = 403, description = "The post belongs to another user."),
	error(status = 404, description = "The post does not exist.")
)]
pub async fn delete_post(
	State(store): State<DynStore>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<StatusCode, RouteError> {
	let post = find_owned(&store, &session, &path).await?;

	if !store.delete_post(post.id).await? {
		return Err(Error::UnknownPost(path.id).into());
	}

	tracing::info!(post = %post.id, "deleted post");

	Ok(StatusCode::NO_CONTENT)
}

use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::{error, AppState};

pub mod model;
pub mod policy;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Also used for posts that exist but are not visible, so that
	/// hidden posts cannot be told apart from missing ones.
	#[error("unknown post {0}")]
	UnknownPost(String),
	#[error("post {0} is not owned by the actor")]
	NotOwner(Uuid),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/",
			get_with(list_posts, list_posts_docs).post_with(create_post, create_post_docs),
		)
		.api_route(
			"/:id",
			get_with(get_post, get_post_docs)
				.put_with(update_post, update_post_docs)
				.patch_with(update_post, |op| update_post_docs(op).id("patch_post"))
				.delete_with(delete_post, delete_post_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
			Self::NotOwner(..) => StatusCode::FORBIDDEN,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownPost(post) => error::Message::new("unknown_post")
				.detail("post", post.as_str())
				.into_vec(),
			Self::NotOwner(post) => error::Message::new("not_post_owner")
				.detail("post", post.to_string())
				.into_vec(),
		}
	}
}

//! Persistence for users, sessions and posts.
//!
//! [`PgStore`] is used when a database is configured, [`MemoryStore`]
//! otherwise (and by the test suite).

mod memory;
mod postgres;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::{
	config::Config,
	route::{auth::model as auth, post::model as post},
};

pub type DynStore = Arc<dyn Store>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("migration error: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
	/// A unique column already holds the value.
	#[error("{0} already taken")]
	Conflict(&'static str),
}

#[axum::async_trait]
pub trait Store: Send + Sync {
	/// Inserts a user, failing with [`StoreError::Conflict`] when the
	/// email or username is taken.
	async fn create_user(
		&self,
		id: Uuid,
		email: &str,
		username: &str,
		password: &[u8],
	) -> Result<auth::User, StoreError>;

	async fn find_user_by_email(&self, email: &str) -> Result<Option<auth::User>, StoreError>;

	async fn create_session(&self, user_id: Uuid) -> Result<auth::Session, StoreError>;

	/// Returns the user owning the session, if the session exists.
	async fn find_session_user(&self, session_id: Uuid) -> Result<Option<auth::User>, StoreError>;

	async fn delete_session(&self, session_id: Uuid) -> Result<(), StoreError>;

	/// Returns one page of posts visible at `now`, in insertion order,
	/// along with the total number of visible posts.
	async fn list_visible_posts(
		&self,
		now: DateTime<Utc>,
		limit: i64,
		offset: i64,
	) -> Result<(Vec<post::PostWithUser>, i64), StoreError>;

	async fn create_post(&self, user_id: Uuid, fields: post::PostFields)
		-> Result<post::Post, StoreError>;

	async fn find_post(&self, id: Uuid) -> Result<Option<post::Post>, StoreError>;

	async fn find_post_with_user(&self, id: Uuid)
		-> Result<Option<post::PostWithUser>, StoreError>;

	/// Replaces the mutable fields of a post. Returns `None` if it does not exist.
	async fn update_post(
		&self,
		id: Uuid,
		fields: post::PostFields,
	) -> Result<Option<post::Post>, StoreError>;

	/// Returns `false` if there was no post to delete.
	async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Connects to the configured database and applies pending migrations,
/// falling back to an in-memory store when no database is configured.
pub async fn connect(config: &Config) -> Result<DynStore, StoreError> {
	let Some(url) = config.database_url.as_deref() else {
		tracing::warn!("DATABASE_URL is not set, data will be kept in memory");

		return Ok(Arc::new(MemoryStore::new()));
	};

	let pool = sqlx::postgres::PgPoolOptions::new()
		.max_connections(config.database_max_connections)
		.connect(url)
		.await?;

	sqlx::migrate!().run(&pool).await?;
	tracing::info!("connected to database and applied migrations");

	Ok(Arc::new(PgStore::new(pool)))
}

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Store, StoreError};
use crate::{
	route::{
		auth::model::{Session, User},
		post::model::{Author, Post, PostFields, PostWithUser},
	},
	Database,
};

/// Joins a post with the public fields of its owner.
const SELECT_POST_WITH_USER: &str = r#"
	SELECT
		posts.id, posts.user_id, posts.title, posts.content, posts.is_draft,
		posts.published_at, posts.created_at, posts.updated_at,
		users.username AS user_username, users.created_at AS user_created_at
	FROM posts
	JOIN users ON users.id = posts.user_id
"#;

/// Must agree with [`Post::is_visible_at`].
const VISIBLE: &str = "NOT posts.is_draft AND (posts.published_at IS NULL OR posts.published_at <= $1)";

#[derive(sqlx::FromRow)]
struct PostWithUserRow {
	#[sqlx(flatten)]
	post: Post,
	user_username: String,
	user_created_at: DateTime<Utc>,
}

impl From<PostWithUserRow> for PostWithUser {
	fn from(row: PostWithUserRow) -> Self {
		Self {
			user: Author {
				id: row.post.user_id,
				username: row.user_username,
				created_at: row.user_created_at,
			},
			post: row.post,
		}
	}
}

pub struct PgStore {
	database: Database,
}

impl PgStore {
	pub fn new(database: Database) -> Self {
		Self { database }
	}
}

#[axum::async_trait]
impl Store for PgStore {
	async fn create_user(
		&self,
		id: Uuid,
		email: &str,
		username: &str,
		password: &[u8],
	) -> Result<User, StoreError> {
		sqlx::query_as::<_, User>(
			r#"
				INSERT INTO users (id, email, username, password) VALUES ($1, $2, $3, $4)
				RETURNING *
			"#,
		)
		.bind(id)
		.bind(email)
		.bind(username)
		.bind(password)
		.fetch_one(&self.database)
		.await
		.map_err(|e| match e {
			sqlx::Error::Database(ref d) => match d.constraint() {
				Some("users_email_key") => StoreError::Conflict("email"),
				Some("users_username_key") => StoreError::Conflict("username"),
				_ => StoreError::Database(e),
			},
			e => StoreError::Database(e),
		})
	}

	async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
		let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
			.bind(email)
			.fetch_optional(&self.database)
			.await?;

		Ok(user)
	}

	async fn create_session(&self, user_id: Uuid) -> Result<Session, StoreError> {
		let session =
			sqlx::query_as::<_, Session>("INSERT INTO sessions (user_id) VALUES ($1) RETURNING *")
				.bind(user_id)
				.fetch_one(&self.database)
				.await?;

		Ok(session)
	}

	async fn find_session_user(&self, session_id: Uuid) -> Result<Option<User>, StoreError> {
		let user = sqlx::query_as::<_, User>(
			r#"
				SELECT * FROM users WHERE id = (
					SELECT user_id FROM sessions WHERE id = $1
				)
			"#,
		)
		.bind(session_id)
		.fetch_optional(&self.database)
		.await?;

		Ok(user)
	}

	async fn delete_session(&self, session_id: Uuid) -> Result<(), StoreError> {
		sqlx::query("DELETE FROM sessions WHERE id = $1")
			.bind(session_id)
			.execute(&self.database)
			.await?;

		Ok(())
	}

	async fn list_visible_posts(
		&self,
		now: DateTime<Utc>,
		limit: i64,
		offset: i64,
	) -> Result<(Vec<PostWithUser>, i64), StoreError> {
		let total = sqlx::query_scalar::<_, i64>(&format!(
			"SELECT COUNT(*) FROM posts WHERE {VISIBLE}"
		))
		.bind(now)
		.fetch_one(&self.database)
		.await?;

		let rows = sqlx::query_as::<_, PostWithUserRow>(&format!(
			"{SELECT_POST_WITH_USER} WHERE {VISIBLE} ORDER BY posts.created_at, posts.id LIMIT $2 OFFSET $3"
		))
		.bind(now)
		.bind(limit)
		.bind(offset)
		.fetch_all(&self.database)
		.await?;

		Ok((rows.into_iter().map(Into::into).collect(), total))
	}

	async fn create_post(&self, user_id: Uuid, fields: PostFields) -> Result<Post, StoreError> {
		let post = sqlx::query_as::<_, Post>(
			r#"
				INSERT INTO posts (id, user_id, title, content, is_draft, published_at)
				VALUES ($1, $2, $3, $4, $5, $6)
				RETURNING *
			"#,
		)
		.bind(Uuid::new_v4())
		.bind(user_id)
		.bind(fields.title)
		.bind(fields.content)
		.bind(fields.is_draft)
		.bind(fields.published_at)
		.fetch_one(&self.database)
		.await?;

		Ok(post)
	}

	async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
		let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
			.bind(id)
			.fetch_optional(&self.database)
			.await?;

		Ok(post)
	}

	async fn find_post_with_user(&self, id: Uuid) -> Result<Option<PostWithUser>, StoreError> {
		let row = sqlx::query_as::<_, PostWithUserRow>(&format!(
			"{SELECT_POST_WITH_USER} WHERE posts.id = $1"
		))
		.bind(id)
		.fetch_optional(&self.database)
		.await?;

		Ok(row.map(Into::into))
	}

	async fn update_post(&self, id: Uuid, fields: PostFields) -> Result<Option<Post>, StoreError> {
		let post = sqlx::query_as::<_, Post>(
			r#"
				UPDATE posts
				SET title = $1, content = $2, is_draft = $3, published_at = $4, updated_at = NOW()
				WHERE id = $5
				RETURNING *
			"#,
		)
		.bind(fields.title)
		.bind(fields.content)
		.bind(fields.is_draft)
		.bind(fields.published_at)
		.bind(id)
		.fetch_optional(&self.database)
		.await?;

		Ok(post)
	}

	async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError> {
		let result = sqlx::query("DELETE FROM posts WHERE id = $1")
			.bind(id)
			.execute(&self.database)
			.await?;

		Ok(result.rows_affected() > 0)
	}
}

#[cfg(test)]
mod test {
	use chrono::Duration;

	use super::*;

	fn fields(title: &str, is_draft: bool, published_at: Option<DateTime<Utc>>) -> PostFields {
		PostFields {
			title: title.into(),
			content: "content".into(),
			is_draft,
			published_at,
		}
	}

	#[sqlx::test]
	#[ignore = "requires a postgres DATABASE_URL"]
	async fn test_visibility_filter_matches_predicate(pool: Database) {
		let store = PgStore::new(pool);
		let now = Utc::now();
		let user = store
			.create_user(Uuid::new_v4(), "a@b.com", "alice", b"hash")
			.await
			.unwrap();

		let active = store
			.create_post(
				user.id,
				fields("active", false, Some(now - Duration::minutes(1))),
			)
			.await
			.unwrap();
		store
			.create_post(user.id, fields("draft", true, None))
			.await
			.unwrap();
		store
			.create_post(
				user.id,
				fields("scheduled", false, Some(now + Duration::days(1))),
			)
			.await
			.unwrap();

		let (posts, total) = store.list_visible_posts(now, 20, 0).await.unwrap();

		assert_eq!(total, 1);
		assert_eq!(posts.len(), 1);
		assert_eq!(posts[0].post.id, active.id);
		assert_eq!(posts[0].user.username, "alice");
	}

	#[sqlx::test]
	#[ignore = "requires a postgres DATABASE_URL"]
	async fn test_duplicate_email_is_a_conflict(pool: Database) {
		let store = PgStore::new(pool);

		store
			.create_user(Uuid::new_v4(), "a@b.com", "alice", b"hash")
			.await
			.unwrap();

		let result = store
			.create_user(Uuid::new_v4(), "a@b.com", "bob", b"hash")
			.await;

		assert!(matches!(result, Err(StoreError::Conflict("email"))));
	}
}

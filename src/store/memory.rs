use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::route::{
	auth::model::{Session, User},
	post::model::{Post, PostFields, PostWithUser},
};

#[derive(Default)]
struct Tables {
	users: HashMap<Uuid, User>,
	sessions: HashMap<Uuid, Session>,
	/// Kept in insertion order.
	posts: Vec<Post>,
}

impl Tables {
	fn with_user(&self, post: &Post) -> Option<PostWithUser> {
		let user = self.users.get(&post.user_id)?;

		Some(PostWithUser {
			post: post.clone(),
			user: user.clone().into(),
		})
	}
}

/// A store that keeps everything in process memory.
///
/// Data is lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
	tables: RwLock<Tables>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Counts every post, visible or not.
	#[cfg(test)]
	pub async fn post_count(&self) -> usize {
		self.tables.read().await.posts.len()
	}
}

#[axum::async_trait]
impl Store for MemoryStore {
	async fn create_user(
		&self,
		id: Uuid,
		email: &str,
		username: &str,
		password: &[u8],
	) -> Result<User, StoreError> {
		let mut tables = self.tables.write().await;

		if tables.users.values().any(|user| user.email == email) {
			return Err(StoreError::Conflict("email"));
		}

		if tables.users.values().any(|user| user.username == username) {
			return Err(StoreError::Conflict("username"));
		}

		let user = User {
			id,
			email: email.to_owned(),
			password: password.to_vec(),
			username: username.to_owned(),
			created_at: Utc::now(),
		};

		tables.users.insert(id, user.clone());

		Ok(user)
	}

	async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
		let tables = self.tables.read().await;

		Ok(tables
			.users
			.values()
			.find(|user| user.email == email)
			.cloned())
	}

	async fn create_session(&self, user_id: Uuid) -> Result<Session, StoreError> {
		let session = Session {
			id: Uuid::new_v4(),
			user_id,
			created_at: Utc::now(),
		};

		self.tables
			.write()
			.await
			.sessions
			.insert(session.id, session.clone());

		Ok(session)
	}

	async fn find_session_user(&self, session_id: Uuid) -> Result<Option<User>, StoreError> {
		let tables = self.tables.read().await;

		Ok(tables
			.sessions
			.get(&session_id)
			.and_then(|session| tables.users.get(&session.user_id))
			.cloned())
	}

	async fn delete_session(&self, session_id: Uuid) -> Result<(), StoreError> {
		self.tables.write().await.sessions.remove(&session_id);

		Ok(())
	}

	async fn list_visible_posts(
		&self,
		now: DateTime<Utc>,
		limit: i64,
		offset: i64,
	) -> Result<(Vec<PostWithUser>, i64), StoreError> {
		let tables = self.tables.read().await;
		let visible = tables
			.posts
			.iter()
			.filter(|post| post.is_visible_at(now))
			.collect::<Vec<_>>();

		let total = i64::try_from(visible.len()).unwrap_or(i64::MAX);
		let page = visible
			.into_iter()
			.skip(usize::try_from(offset).unwrap_or(usize::MAX))
			.take(usize::try_from(limit).unwrap_or(0))
			.filter_map(|post| tables.with_user(post))
			.collect();

		Ok((page, total))
	}

	async fn create_post(&self, user_id: Uuid, fields: PostFields) -> Result<Post, StoreError> {
		let now = Utc::now();
		let post = Post {
			id: Uuid::new_v4(),
			user_id,
			title: fields.title,
			content: fields.content,
			is_draft: fields.is_draft,
			published_at: fields.published_at,
			created_at: now,
			updated_at: now,
		};

		self.tables.write().await.posts.push(post.clone());

		Ok(post)
	}

	async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
		let tables = self.tables.read().await;

		Ok(tables.posts.iter().find(|post| post.id == id).cloned())
	}

	async fn find_post_with_user(&self, id: Uuid) -> Result<Option<PostWithUser>, StoreError> {
		let tables = self.tables.read().await;

		Ok(tables
			.posts
			.iter()
			.find(|post| post.id == id)
			.and_then(|post| tables.with_user(post)))
	}

	async fn update_post(&self, id: Uuid, fields: PostFields) -> Result<Option<Post>, StoreError> {
		let mut tables = self.tables.write().await;

		let Some(post) = tables.posts.iter_mut().find(|post| post.id == id) else {
			return Ok(None);
		};

		post.title = fields.title;
		post.content = fields.content;
		post.is_draft = fields.is_draft;
		post.published_at = fields.published_at;
		post.updated_at = Utc::now();

		Ok(Some(post.clone()))
	}

	async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError> {
		let mut tables = self.tables.write().await;
		let before = tables.posts.len();

		tables.posts.retain(|post| post.id != id);

		Ok(tables.posts.len() != before)
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

	#[tokio::test]
	async fn test_unique_email_and_username() {
		let store = MemoryStore::new();

		store
			.create_user(Uuid::new_v4(), "a@b.com", "alice", b"hash")
			.await
			.unwrap();

		let email = store
			.create_user(Uuid::new_v4(), "a@b.com", "bob", b"hash")
			.await;
		let username = store
			.create_user(Uuid::new_v4(), "c@d.com", "alice", b"hash")
			.await;

		assert!(matches!(email, Err(StoreError::Conflict("email"))));
		assert!(matches!(username, Err(StoreError::Conflict("username"))));
	}

	#[tokio::test]
	async fn test_session_resolves_user() {
		let store = MemoryStore::new();
		let user = store
			.create_user(Uuid::new_v4(), "a@b.com", "alice", b"hash")
			.await
			.unwrap();
		let session = store.create_session(user.id).await.unwrap();

		let found = store.find_session_user(session.id).await.unwrap();
		assert_eq!(found.map(|u| u.id), Some(user.id));

		store.delete_session(session.id).await.unwrap();
		assert!(store.find_session_user(session.id).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_list_filters_and_paginates_in_insertion_order() {
		let store = MemoryStore::new();
		let now = Utc::now();
		let user = store
			.create_user(Uuid::new_v4(), "a@b.com", "alice", b"hash")
			.await
			.unwrap();

		for i in 0..25 {
			store
				.create_post(user.id, fields(&format!("active {i}"), false, None))
				.await
				.unwrap();
		}

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

		let (first, total) = store.list_visible_posts(now, 20, 0).await.unwrap();
		let (second, _) = store.list_visible_posts(now, 20, 20).await.unwrap();

		assert_eq!(total, 25);
		assert_eq!(first.len(), 20);
		assert_eq!(first[0].post.title, "active 0");
		assert_eq!(first[0].user.username, "alice");
		assert_eq!(second.len(), 5);
		assert_eq!(second[4].post.title, "active 24");
	}

	#[tokio::test]
	async fn test_update_and_delete() {
		let store = MemoryStore::new();
		let user = store
			.create_user(Uuid::new_v4(), "a@b.com", "alice", b"hash")
			.await
			.unwrap();
		let post = store
			.create_post(user.id, fields("before", false, None))
			.await
			.unwrap();

		let updated = store
			.update_post(post.id, fields("after", true, None))
			.await
			.unwrap()
			.unwrap();

		assert_eq!(updated.title, "after");
		assert!(updated.is_draft);
		assert_eq!(updated.user_id, user.id);
		assert!(updated.updated_at >= post.updated_at);

		assert!(store.delete_post(post.id).await.unwrap());
		assert!(!store.delete_post(post.id).await.unwrap());
		assert!(store.find_post(post.id).await.unwrap().is_none());
		assert!(store
			.update_post(post.id, fields("gone", false, None))
			.await
			.unwrap()
			.is_none());
	}
}

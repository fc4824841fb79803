//! Ownership rules for posts.

use uuid::Uuid;

use super::model::Post;

/// Only the author of a post may change or delete it.
pub fn can_modify(actor: Uuid, post: &Post) -> bool {
	post.user_id == actor
}

#[cfg(test)]
mod test {
	use chrono::Utc;
	use uuid::Uuid;

	use super::{can_modify, Post};

	#[test]
	fn test_only_author_can_modify() {
		let author = Uuid::new_v4();
		let now = Utc::now();
		let post = Post {
			id: Uuid::new_v4(),
			user_id: author,
			title: "title".into(),
			content: "content".into(),
			is_draft: false,
			published_at: None,
			created_at: now,
			updated_at: now,
		};

		assert!(can_modify(author, &post));
		assert!(!can_modify(Uuid::new_v4(), &post));
	}
}

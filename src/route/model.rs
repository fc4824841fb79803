use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct Paginate {
	/// The page number to return (1-indexed). Values that are not
	/// a positive number return the first page.
	#[serde(default)]
	pub page: Option<String>,
}

impl Paginate {
	pub const PER_PAGE: i64 = 20;

	pub fn page(&self) -> i64 {
		self.page
			.as_deref()
			.and_then(|page| page.trim().parse::<i64>().ok())
			.filter(|page| *page >= 1)
			.unwrap_or(1)
	}

	pub fn offset(&self) -> i64 {
		(self.page() - 1).saturating_mul(Self::PER_PAGE)
	}

	pub fn limit(&self) -> i64 {
		Self::PER_PAGE
	}
}

/// A resource identifier taken from the path.
///
/// Kept as a string so that malformed ids can be answered the same
/// way as unknown ones.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	pub id: String,
}

/// A single page of results.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Page<T> {
	pub data: Vec<T>,
	/// The total number of items across all pages.
	pub total: i64,
	pub current_page: i64,
	pub per_page: i64,
	pub last_page: i64,
}

impl<T> Page<T> {
	pub fn new(data: Vec<T>, total: i64, paginate: &Paginate) -> Self {
		let per_page = paginate.limit();

		Self {
			data,
			total,
			current_page: paginate.page(),
			per_page,
			last_page: ((total + per_page - 1) / per_page).max(1),
		}
	}
}

#[cfg(test)]
mod test {
	use super::{Page, Paginate};

	fn paginate(page: &str) -> Paginate {
		Paginate {
			page: Some(page.into()),
		}
	}

	#[test]
	fn test_paginate_offset() {
		assert_eq!(Paginate { page: None }.offset(), 0);
		assert_eq!(paginate("1").offset(), 0);
		assert_eq!(paginate("2").offset(), 20);
		assert_eq!(paginate("3").offset(), 40);
	}

	#[test]
	fn test_paginate_falls_back_to_first_page() {
		assert_eq!(paginate("0").page(), 1);
		assert_eq!(paginate("-4").page(), 1);
		assert_eq!(paginate("abc").page(), 1);
		assert_eq!(paginate("").page(), 1);
	}

	#[test]
	fn test_paginate_limit() {
		assert_eq!(paginate("7").limit(), 20);
	}

	#[test]
	fn test_page_last_page() {
		assert_eq!(Page::<()>::new(Vec::new(), 0, &paginate("1")).last_page, 1);
		assert_eq!(Page::<()>::new(Vec::new(), 20, &paginate("1")).last_page, 1);
		assert_eq!(Page::<()>::new(Vec::new(), 21, &paginate("2")).last_page, 2);
	}
}

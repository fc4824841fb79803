use std::sync::Arc;

use aide::{
	axum::{
		routing::{get, get_with},
		ApiRouter, IntoApiResponse,
	},
	openapi::OpenApi,
	scalar::Scalar,
};
use axum::{response::IntoResponse, Extension};

use crate::extract::Json;

pub const SPEC_PATH: &str = "/docs/private/api.json";

pub fn routes() -> ApiRouter {
	ApiRouter::new()
		.api_route(
			"/",
			get_with(
				Scalar::new(SPEC_PATH).with_title("Posts API").axum_handler(),
				|op| op.description("This documentation page."),
			),
		)
		.route("/private/api.json", get(serve_docs))
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
	Json(api).into_response()
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_openapi_document_lists_post_routes() {
		let (server, _) = server();

		let response = server.get(super::SPEC_PATH).await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let api = response.json::<Value>();
		let posts = &api["paths"]["/posts/{id}"];

		assert_eq!(posts["get"]["operationId"], "get_post");
		assert_eq!(posts["put"]["operationId"], "update_post");
		assert_eq!(posts["patch"]["operationId"], "patch_post");
		assert!(posts["delete"]["responses"].get("403").is_some());
	}
}

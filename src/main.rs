#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod openapi;
mod route;
mod session;
mod store;
mod trace;

use std::sync::Arc;

use aide::{axum::ApiRouter, openapi::OpenApi};
use argon2::Argon2;
use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

use store::DynStore;

pub type Database = sqlx::Pool<sqlx::Postgres>;
pub type AppState = State;

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as the store and a hash configuration (since it's expensive to create).
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub store: DynStore,
	pub hasher: Argon2<'static>,
}

/// Builds the router with every route group, the generated `OpenAPI`
/// document and the HTTP middleware.
pub fn app(state: AppState) -> Router {
	aide::gen::extract_schemas(true);

	let mut api = OpenApi::default();
	let router = ApiRouter::new()
		.nest_api_service("/auth", route::auth::routes().with_state(state.clone()))
		.nest_api_service("/posts", route::post::routes().with_state(state))
		.nest_api_service("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs);

	router.layer(Extension(Arc::new(api))).layer(
		ServiceBuilder::new()
			.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
			.layer(TraceLayer::new_for_http())
			.layer(PropagateRequestIdLayer::x_request_id())
			.layer(CompressionLayer::new()),
	)
}

async fn shutdown_signal() {
	if let Err(error) = tokio::signal::ctrl_c().await {
		tracing::error!(%error, "failed to listen for shutdown signal");
	}

	tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	dotenvy::dotenv().ok();

	let config = config::Config::from_env()?;
	let _guard = trace::init_tracing_subscriber(&config)?;

	let state = State {
		store: store::connect(&config).await?,
		hasher: Argon2::default(),
	};

	let listener = tokio::net::TcpListener::bind((config.host, config.port)).await?;

	tracing::info!("listening on {}", listener.local_addr()?);

	axum::serve(listener, app(state))
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	Ok(())
}

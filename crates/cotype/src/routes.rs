//! API routes

use axum::{
	Json, Router, middleware,
	extract::State,
	routing::get,
};
use tower_http::trace::TraceLayer;

use crate::prelude::*;
use cotype_content::handler as content;
use cotype_core::{Auth, middleware::require_auth};
use cotype_settings::handler as settings;

/// GET /admin/rest/models
async fn list_models(
	State(app): State<App>,
	Auth(_auth): Auth,
) -> CtResult<Json<serde_json::Value>> {
	Ok(Json(serde_json::to_value(app.models.by_type())?))
}

fn init_settings() -> Router<App> {
	Router::new()
		.route("/{model}", get(settings::list).post(settings::create))
		.route(
			"/{model}/{id}",
			get(settings::load).put(settings::update).delete(settings::delete),
		)
		.route("/{model}/{id}/item", get(settings::load_item))
}

fn init_content() -> Router<App> {
	Router::new()
		.route("/{model}", get(content::list).post(content::create))
		.route("/{model}/{id}", get(content::load).put(content::update).delete(content::delete))
		.route("/{model}/{id}/item", get(content::load_item))
		.route("/{model}/{id}/versions", get(content::list_versions))
		.route(
			"/{model}/{id}/publish",
			get(content::get_publish_state).post(content::publish).delete(content::unpublish),
		)
}

pub fn init(app: App) -> Router {
	let rest = Router::new()
		.nest("/settings", init_settings())
		.nest("/content", init_content())
		.route("/search", get(content::search))
		.route("/models", get(list_models))
		.route_layer(middleware::from_fn_with_state(app.clone(), require_auth));

	Router::new()
		.nest("/admin/rest", rest)
		.layer(TraceLayer::new_for_http())
		.with_state(app)
}

// vim: ts=4

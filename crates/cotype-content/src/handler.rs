//! REST handlers for `/admin/rest/content/{model}` and content search

use axum::{
	Json,
	extract::{Path, Query, State},
	http::StatusCode,
};
use serde::Deserialize;

use cotype_core::Auth;
use cotype_types::model::ModelType;
use cotype_types::types::{ContentRecord, Item, ListChunk, ListQuery};

use crate::prelude::*;
use crate::publish::{self, PublishState};
use crate::search::{self, SearchResults};
use crate::service;
use crate::versions::VersionList;

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
	#[serde(default)]
	pub data: Data,
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
	pub rev: Rev,
}

/// GET /admin/rest/content/{model}
pub async fn list(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(model): Path<String>,
	Query(query): Query<ListQuery>,
) -> CtResult<Json<ListChunk<ContentRecord>>> {
	let model = app.model(ModelType::Content, &model)?;
	let chunk = service::list(&app, &auth, model, &query.to_opts(model)).await?;
	Ok(Json(chunk))
}

/// POST /admin/rest/content/{model}
pub async fn create(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(model): Path<String>,
	Json(req): Json<CreateRequest>,
) -> CtResult<Json<ContentRecord>> {
	let model = app.model(ModelType::Content, &model)?;
	let record = service::create(&app, &auth, model, req.data).await?;
	Ok(Json(record))
}

/// GET /admin/rest/content/{model}/{id}
pub async fn load(
	State(app): State<App>,
	Auth(auth): Auth,
	Path((model, id)): Path<(String, String)>,
) -> CtResult<Json<ContentRecord>> {
	let model = app.model(ModelType::Content, &model)?;
	let record = service::load(&app, &auth, model, &id).await?.ok_or(Error::NotFound)?;
	Ok(Json(record))
}

/// GET /admin/rest/content/{model}/{id}/item
pub async fn load_item(
	State(app): State<App>,
	Auth(auth): Auth,
	Path((model, id)): Path<(String, String)>,
) -> CtResult<Json<Item>> {
	let model = app.model(ModelType::Content, &model)?;
	let item = service::load_item(&app, &auth, model, &id).await?.ok_or(Error::NotFound)?;
	Ok(Json(item))
}

/// PUT /admin/rest/content/{model}/{id}
pub async fn update(
	State(app): State<App>,
	Auth(auth): Auth,
	Path((model, id)): Path<(String, String)>,
	Json(data): Json<Data>,
) -> CtResult<Json<ContentRecord>> {
	let model = app.model(ModelType::Content, &model)?;
	let record = service::update(&app, &auth, model, &id, data).await?;
	Ok(Json(record))
}

/// DELETE /admin/rest/content/{model}/{id}
pub async fn delete(
	State(app): State<App>,
	Auth(auth): Auth,
	Path((model, id)): Path<(String, String)>,
) -> CtResult<StatusCode> {
	let model = app.model(ModelType::Content, &model)?;
	service::delete(&app, &auth, model, &id).await?;
	Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/rest/content/{model}/{id}/versions
pub async fn list_versions(
	State(app): State<App>,
	Auth(auth): Auth,
	Path((model, id)): Path<(String, String)>,
) -> CtResult<Json<VersionList>> {
	let model = app.model(ModelType::Content, &model)?;
	let versions = publish::list_versions(&app, &auth, model, &id).await?;
	Ok(Json(versions))
}

/// GET /admin/rest/content/{model}/{id}/publish
pub async fn get_publish_state(
	State(app): State<App>,
	Auth(auth): Auth,
	Path((model, id)): Path<(String, String)>,
) -> CtResult<Json<PublishState>> {
	let model = app.model(ModelType::Content, &model)?;
	let state = publish::state(&app, &auth, model, &id).await?;
	Ok(Json(state))
}

/// POST /admin/rest/content/{model}/{id}/publish
pub async fn publish(
	State(app): State<App>,
	Auth(auth): Auth,
	Path((model, id)): Path<(String, String)>,
	Json(req): Json<PublishRequest>,
) -> CtResult<Json<PublishState>> {
	let model = app.model(ModelType::Content, &model)?;
	let state = publish::publish(&app, &auth, model, &id, req.rev).await?;
	Ok(Json(state))
}

/// DELETE /admin/rest/content/{model}/{id}/publish
pub async fn unpublish(
	State(app): State<App>,
	Auth(auth): Auth,
	Path((model, id)): Path<(String, String)>,
) -> CtResult<Json<PublishState>> {
	let model = app.model(ModelType::Content, &model)?;
	let state = publish::unpublish(&app, &auth, model, &id).await?;
	Ok(Json(state))
}

/// GET /admin/rest/search
pub async fn search(
	State(app): State<App>,
	Auth(auth): Auth,
	Query(query): Query<ListQuery>,
) -> CtResult<Json<SearchResults>> {
	let term = query.q.as_deref().unwrap_or_default().trim();
	if term.is_empty() {
		return Err(Error::ValidationError("Missing search term".into()));
	}
	let results = search::search(
		&app,
		&auth,
		term,
		query.limit.unwrap_or(50),
		query.offset.unwrap_or(0),
	)
	.await?;
	Ok(Json(results))
}

// vim: ts=4

//! REST handlers for `/admin/rest/settings/{model}`

use axum::{
	Json,
	extract::{Path, Query, State},
	http::StatusCode,
};
use serde::{Deserialize, Serialize};

use cotype_core::Auth;
use cotype_types::model::ModelType;
use cotype_types::types::{Item, ListChunk, ListQuery, Record};

use crate::prelude::*;
use crate::service;

/// Body of create requests
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
	#[serde(default)]
	pub data: Data,
}

/// `{ id, data }` as returned by create, load and update
#[derive(Debug, Serialize)]
pub struct RecordResponse {
	pub id: RecordId,
	pub data: Data,
}

impl From<Record> for RecordResponse {
	fn from(record: Record) -> Self {
		Self { id: record.id, data: record.data }
	}
}

/// GET /admin/rest/settings/{model}
pub async fn list(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(model): Path<String>,
	Query(query): Query<ListQuery>,
) -> CtResult<Json<ListChunk<Record>>> {
	let model = app.model(ModelType::Settings, &model)?;
	let chunk = service::list(&app, &auth, model, &query.to_opts(model)).await?;
	Ok(Json(chunk))
}

/// POST /admin/rest/settings/{model}
pub async fn create(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(model): Path<String>,
	Json(req): Json<CreateRequest>,
) -> CtResult<Json<RecordResponse>> {
	let model = app.model(ModelType::Settings, &model)?;
	let record = service::create(&app, &auth, model, req.data).await?;
	Ok(Json(record.into()))
}

/// GET /admin/rest/settings/{model}/{id}
pub async fn load(
	State(app): State<App>,
	Auth(auth): Auth,
	Path((model, id)): Path<(String, String)>,
) -> CtResult<Json<RecordResponse>> {
	let model = app.model(ModelType::Settings, &model)?;
	let record = service::load(&app, &auth, model, &id).await?.ok_or(Error::NotFound)?;
	Ok(Json(record.into()))
}

/// GET /admin/rest/settings/{model}/{id}/item
pub async fn load_item(
	State(app): State<App>,
	Auth(auth): Auth,
	Path((model, id)): Path<(String, String)>,
) -> CtResult<Json<Item>> {
	let model = app.model(ModelType::Settings, &model)?;
	let item = service::load_item(&app, &auth, model, &id).await?.ok_or(Error::NotFound)?;
	Ok(Json(item))
}

/// PUT /admin/rest/settings/{model}/{id}
pub async fn update(
	State(app): State<App>,
	Auth(auth): Auth,
	Path((model, id)): Path<(String, String)>,
	Json(data): Json<Data>,
) -> CtResult<Json<RecordResponse>> {
	let model = app.model(ModelType::Settings, &model)?;
	let record = service::update(&app, &auth, model, &id, data).await?;
	Ok(Json(record.into()))
}

/// DELETE /admin/rest/settings/{model}/{id}
pub async fn delete(
	State(app): State<App>,
	Auth(auth): Auth,
	Path((model, id)): Path<(String, String)>,
) -> CtResult<StatusCode> {
	let model = app.model(ModelType::Settings, &model)?;
	service::delete(&app, &auth, model, &id).await?;
	Ok(StatusCode::NO_CONTENT)
}

// vim: ts=4

//! Content CRUD orchestration.
//!
//! Records of unversioned models have no publishing workflow: every new
//! revision is published as soon as it is written.

use cotype_types::acl::{Permission, Principal};
use cotype_types::model::Model;
use cotype_types::types::{ContentRecord, Item, ListChunk, ListOpts, pick_fields};

use crate::prelude::*;

fn picked(model: &Model, mut record: ContentRecord) -> ContentRecord {
	record.data = pick_fields(&record.data, model);
	record
}

async fn auto_publish(app: &App, model: &Model, record: &mut ContentRecord) -> CtResult<()> {
	if model.is_versioned() {
		return Ok(());
	}
	if app.content_adapter.set_published_revision(model, &record.id, Some(record.rev)).await? {
		record.published_rev = Some(record.rev);
	}
	Ok(())
}

pub async fn list(
	app: &App,
	principal: &Principal,
	model: &Model,
	opts: &ListOpts,
) -> CtResult<ListChunk<ContentRecord>> {
	app.acl.check(principal, model, Permission::View)?;
	let chunk = app.content_adapter.list(model, opts).await?;
	Ok(chunk.map(|record| picked(model, record)))
}

/// Creates a record with its first revision, authored by `principal`
pub async fn create(
	app: &App,
	principal: &Principal,
	model: &Model,
	mut data: Data,
) -> CtResult<ContentRecord> {
	app.acl.check(principal, model, Permission::Edit)?;
	app.hooks.before_create(model, principal, &mut data).await?;

	// A second record of a singleton model is rejected by the adapter
	let mut record = app.content_adapter.create(model, principal, &data).await?;
	auto_publish(app, model, &mut record).await?;
	info!(model = %model.name, id = %record.id, principal = %principal.id, "Created content record");
	Ok(picked(model, record))
}

pub async fn load(
	app: &App,
	principal: &Principal,
	model: &Model,
	id: &str,
) -> CtResult<Option<ContentRecord>> {
	app.acl.check(principal, model, Permission::View)?;
	let record = app.content_adapter.load(model, id).await?;
	Ok(record.map(|record| picked(model, record)))
}

pub async fn load_item(
	app: &App,
	principal: &Principal,
	model: &Model,
	id: &str,
) -> CtResult<Option<Item>> {
	app.acl.check(principal, model, Permission::View)?;
	app.content_adapter.load_item(model, id).await
}

/// Stores `data` as a new revision of the record
pub async fn update(
	app: &App,
	principal: &Principal,
	model: &Model,
	id: &str,
	mut data: Data,
) -> CtResult<ContentRecord> {
	app.acl.check(principal, model, Permission::Edit)?;
	app.hooks.before_update(model, principal, &mut data).await?;

	let mut record = app.content_adapter.update(model, principal, id, &data).await?;
	auto_publish(app, model, &mut record).await?;
	info!(
		model = %model.name,
		id = %id,
		rev = %record.rev,
		principal = %principal.id,
		"Updated content record"
	);
	Ok(picked(model, record))
}

/// Deletes a record with its revisions. Adapter failures are reported as
/// `Error::Conflict`, the same way settings deletes are.
pub async fn delete(app: &App, principal: &Principal, model: &Model, id: &str) -> CtResult<()> {
	app.acl.check(principal, model, Permission::Edit)?;
	if model.is_singleton() {
		return Err(Error::Forbidden(format!(
			"The record of the singleton model '{}' cannot be deleted",
			model.name
		)));
	}
	app.hooks.before_delete(model, principal, id).await?;

	app.content_adapter.delete(model, id).await.map_err(|err| match err {
		Error::Conflict(_) => err,
		err => {
			warn!(model = %model.name, id = %id, error = %err, "Delete failed");
			Error::Conflict(err.to_string())
		}
	})?;
	info!(model = %model.name, id = %id, principal = %principal.id, "Deleted content record");
	Ok(())
}

// vim: ts=4

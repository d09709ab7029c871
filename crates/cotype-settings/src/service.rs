//! Settings CRUD orchestration: access checks, model hooks and field
//! filtering around the settings adapter.

use cotype_types::acl::{Permission, Principal};
use cotype_types::model::Model;
use cotype_types::types::{Item, ListChunk, ListOpts, Record};

use crate::prelude::*;

fn picked(model: &Model, record: Record) -> Record {
	let data = record.pick_fields(model);
	Record { id: record.id, data }
}

pub async fn list(
	app: &App,
	principal: &Principal,
	model: &Model,
	opts: &ListOpts,
) -> CtResult<ListChunk<Record>> {
	app.acl.check(principal, model, Permission::View)?;
	let chunk = app.settings_adapter.list(model, opts).await?;
	Ok(chunk.map(|record| picked(model, record)))
}

/// Creates a record and returns its id together with the stored data
pub async fn create(
	app: &App,
	principal: &Principal,
	model: &Model,
	mut data: Data,
) -> CtResult<Record> {
	app.acl.check(principal, model, Permission::Edit)?;
	app.hooks.before_create(model, principal, &mut data).await?;

	let id = app.settings_adapter.create(model, &data).await?;
	info!(model = %model.name, id = %id, principal = %principal.id, "Created settings record");
	Ok(picked(model, Record { id, data }))
}

pub async fn load(
	app: &App,
	principal: &Principal,
	model: &Model,
	id: &str,
) -> CtResult<Option<Record>> {
	app.acl.check(principal, model, Permission::View)?;
	let record = app.settings_adapter.load(model, id).await?;
	Ok(record.map(|record| picked(model, record)))
}

pub async fn load_item(
	app: &App,
	principal: &Principal,
	model: &Model,
	id: &str,
) -> CtResult<Option<Item>> {
	app.acl.check(principal, model, Permission::View)?;
	app.settings_adapter.load_item(model, id).await
}

pub async fn update(
	app: &App,
	principal: &Principal,
	model: &Model,
	id: &str,
	mut data: Data,
) -> CtResult<Record> {
	app.acl.check(principal, model, Permission::Edit)?;
	app.hooks.before_update(model, principal, &mut data).await?;

	let record = app.settings_adapter.update(model, id, &data).await?;
	info!(model = %model.name, id = %id, principal = %principal.id, "Updated settings record");
	Ok(picked(model, record))
}

/// Deletes a record.
///
/// Guards registered for the model run first. Any failure of the adapter is
/// reported as `Error::Conflict` carrying the failure's message.
pub async fn delete(app: &App, principal: &Principal, model: &Model, id: &str) -> CtResult<()> {
	app.acl.check(principal, model, Permission::Edit)?;
	app.hooks.before_delete(model, principal, id).await?;

	app.settings_adapter.delete(model, id).await.map_err(|err| match err {
		Error::Conflict(_) => err,
		err => {
			warn!(model = %model.name, id = %id, error = %err, "Delete failed");
			Error::Conflict(err.to_string())
		}
	})?;
	info!(model = %model.name, id = %id, principal = %principal.id, "Deleted settings record");
	Ok(())
}

// vim: ts=4

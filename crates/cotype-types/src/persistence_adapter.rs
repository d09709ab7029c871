//! Adapter contracts for record storage and principal resolution.
//!
//! The settings contract is plain CRUD. The content contract adds revision
//! history and the published pointer; `set_published_revision` must be
//! applied atomically against the stored state, the publish state machine
//! does no locking of its own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::acl::Principal;
use crate::model::Model;
use crate::prelude::*;
use crate::types::{ContentRecord, Item, ListChunk, ListOpts, Record};

/// One stored revision of a content record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionItem {
	pub rev: Rev,
	pub date: Timestamp,
	pub author_name: Box<str>,
}

#[async_trait]
pub trait SettingsAdapter: Debug + Send + Sync {
	/// Lists records of a model, newest first
	async fn list(&self, model: &Model, opts: &ListOpts) -> CtResult<ListChunk<Record>>;

	/// Creates a record, returns its id.
	///
	/// Fails with `Error::Conflict` if a value of one of the model's unique
	/// fields is already taken.
	async fn create(&self, model: &Model, data: &Data) -> CtResult<RecordId>;

	async fn load(&self, model: &Model, id: &str) -> CtResult<Option<Record>>;

	async fn load_item(&self, model: &Model, id: &str) -> CtResult<Option<Item>> {
		Ok(self.load(model, id).await?.map(|record| Item::from_record(model, &record)))
	}

	/// Merges `data` into the stored record and returns the result
	async fn update(&self, model: &Model, id: &str, data: &Data) -> CtResult<Record>;

	/// Deletes a record.
	///
	/// Fails with `Error::Conflict` if other records still depend on it.
	async fn delete(&self, model: &Model, id: &str) -> CtResult<()>;
}

#[async_trait]
pub trait ContentAdapter: Debug + Send + Sync {
	/// Lists records of a model with their latest revision
	async fn list(&self, model: &Model, opts: &ListOpts) -> CtResult<ListChunk<ContentRecord>>;

	/// Creates a record with its first revision.
	///
	/// Fails with `Error::Conflict` if the model is a singleton that already
	/// has a record. The check and the insert are atomic.
	async fn create(
		&self,
		model: &Model,
		author: &Principal,
		data: &Data,
	) -> CtResult<ContentRecord>;

	/// Latest revision of a record together with its published pointer
	async fn load(&self, model: &Model, id: &str) -> CtResult<Option<ContentRecord>>;

	async fn load_item(&self, model: &Model, id: &str) -> CtResult<Option<Item>> {
		Ok(self.load(model, id).await?.map(|content| {
			let record = Record { id: content.id, data: content.data };
			Item::from_record(model, &record)
		}))
	}

	/// Appends a new revision to an existing record
	async fn update(
		&self,
		model: &Model,
		author: &Principal,
		id: &str,
		data: &Data,
	) -> CtResult<ContentRecord>;

	/// Deletes a record with all its revisions
	async fn delete(&self, model: &Model, id: &str) -> CtResult<()>;

	/// Revisions of a record in creation order, `None` if the record does not exist
	async fn list_versions(&self, model: &Model, id: &str) -> CtResult<Option<Vec<VersionItem>>>;

	/// Published pointer of a record, `Error::NotFound` if the record does not exist
	async fn get_published_revision(&self, model: &Model, id: &str) -> CtResult<Option<Rev>>;

	/// Sets or clears the published pointer in a single atomic step.
	///
	/// Setting only succeeds if `rev` is one of the record's revisions.
	/// Returns `false` if nothing was changed because the record or the
	/// revision does not exist.
	async fn set_published_revision(
		&self,
		model: &Model,
		id: &str,
		rev: Option<Rev>,
	) -> CtResult<bool>;
}

/// Resolves a bearer token to the principal it was issued for
#[async_trait]
pub trait PrincipalResolver: Debug + Send + Sync {
	/// Returns `Error::Unauthorized` for unknown tokens
	async fn resolve(&self, token: &str) -> CtResult<Principal>;
}

// vim: ts=4

//! Publish state machine of content records.
//!
//! A record is either unpublished or has exactly one published revision. The
//! pointer is changed through the adapter's atomic set, nothing here locks.
//! Every transition checks, in order: the model keeps revisions, the
//! principal may publish, the collection policy allows the transition.

use serde::Serialize;

use cotype_types::acl::{Permission, Principal};
use cotype_types::model::{Collection, Model};

use crate::prelude::*;
use crate::versions::VersionList;

/// Outcome of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PublishState {
	/// The record has no revisions yet, nothing was changed
	Empty,
	Unpublished,
	Published { rev: Rev },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
	Publish(Rev),
	Unpublish,
}

/// Collection policy. Singleton records always stay published once published.
pub fn check_transition(model: &Model, transition: Transition) -> CtResult<()> {
	match (model.collection, transition) {
		(Collection::Singleton, Transition::Unpublish) => Err(Error::Forbidden(format!(
			"Records of the singleton model '{}' cannot be unpublished",
			model.name
		))),
		_ => Ok(()),
	}
}

fn ensure_versioned(model: &Model) -> CtResult<()> {
	if model.is_versioned() {
		Ok(())
	} else {
		Err(Error::ValidationError(format!("Model '{}' is not versioned", model.name)))
	}
}

/// Revisions of a record annotated with the published flag
pub async fn list_versions(
	app: &App,
	principal: &Principal,
	model: &Model,
	id: &str,
) -> CtResult<VersionList> {
	ensure_versioned(model)?;
	app.acl.check(principal, model, Permission::View)?;

	let items = app.content_adapter.list_versions(model, id).await?.ok_or(Error::NotFound)?;
	let published = app.content_adapter.get_published_revision(model, id).await?;
	Ok(VersionList::new(items, published))
}

/// Current state of a record's published pointer
pub async fn state(app: &App, principal: &Principal, model: &Model, id: &str) -> CtResult<PublishState> {
	let versions = list_versions(app, principal, model, id).await?;
	Ok(match versions.published() {
		_ if versions.is_empty() => PublishState::Empty,
		Some(rev) => PublishState::Published { rev },
		None => PublishState::Unpublished,
	})
}

/// Makes `rev` the published revision. Publishing the revision that is
/// already published changes nothing and succeeds.
pub async fn publish(
	app: &App,
	principal: &Principal,
	model: &Model,
	id: &str,
	rev: Rev,
) -> CtResult<PublishState> {
	ensure_versioned(model)?;
	app.acl.check(principal, model, Permission::Publish)?;
	check_transition(model, Transition::Publish(rev))?;

	let items = app.content_adapter.list_versions(model, id).await?.ok_or(Error::NotFound)?;
	if items.is_empty() {
		return Ok(PublishState::Empty);
	}
	if !items.iter().any(|item| item.rev == rev) {
		return Err(Error::NotFound);
	}

	// The record or revision may have vanished since it was read
	if !app.content_adapter.set_published_revision(model, id, Some(rev)).await? {
		return Err(Error::NotFound);
	}
	info!(model = %model.name, id = %id, rev = %rev, principal = %principal.id, "Published");
	Ok(PublishState::Published { rev })
}

/// Clears the published pointer. Unpublishing an unpublished record succeeds.
pub async fn unpublish(
	app: &App,
	principal: &Principal,
	model: &Model,
	id: &str,
) -> CtResult<PublishState> {
	ensure_versioned(model)?;
	app.acl.check(principal, model, Permission::Publish)?;
	check_transition(model, Transition::Unpublish)?;

	let items = app.content_adapter.list_versions(model, id).await?.ok_or(Error::NotFound)?;
	if items.is_empty() {
		return Ok(PublishState::Empty);
	}

	if !app.content_adapter.set_published_revision(model, id, None).await? {
		return Err(Error::NotFound);
	}
	info!(model = %model.name, id = %id, principal = %principal.id, "Unpublished");
	Ok(PublishState::Unpublished)
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use cotype_core::{AppOpts, AppState, HookRegistry, ModelRegistry, RolePolicy};
	use cotype_types::acl::Permissions;
	use cotype_types::model::ModelType;
	use cotype_types::persistence_adapter::{
		ContentAdapter, PrincipalResolver, SettingsAdapter, VersionItem,
	};
	use cotype_types::types::{ContentRecord, ListChunk, ListOpts, Record};
	use serde_json::json;
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};

	/// Storage holding one record that has no revisions at all
	#[derive(Debug, Default)]
	struct RevisionlessStore {
		pointer_writes: AtomicUsize,
	}

	#[async_trait]
	impl ContentAdapter for RevisionlessStore {
		async fn list(&self, _: &Model, _: &ListOpts) -> CtResult<ListChunk<ContentRecord>> {
			Ok(ListChunk { total: 0, items: Vec::new() })
		}
		async fn create(&self, _: &Model, _: &Principal, _: &Data) -> CtResult<ContentRecord> {
			Err(Error::Internal("read only".into()))
		}
		async fn load(&self, _: &Model, _: &str) -> CtResult<Option<ContentRecord>> {
			Ok(None)
		}
		async fn update(
			&self,
			_: &Model,
			_: &Principal,
			_: &str,
			_: &Data,
		) -> CtResult<ContentRecord> {
			Err(Error::Internal("read only".into()))
		}
		async fn delete(&self, _: &Model, _: &str) -> CtResult<()> {
			Err(Error::Internal("read only".into()))
		}
		async fn list_versions(&self, _: &Model, _: &str) -> CtResult<Option<Vec<VersionItem>>> {
			Ok(Some(Vec::new()))
		}
		async fn get_published_revision(&self, _: &Model, _: &str) -> CtResult<Option<Rev>> {
			Ok(None)
		}
		async fn set_published_revision(
			&self,
			_: &Model,
			_: &str,
			_: Option<Rev>,
		) -> CtResult<bool> {
			self.pointer_writes.fetch_add(1, Ordering::SeqCst);
			Ok(true)
		}
	}

	#[async_trait]
	impl SettingsAdapter for RevisionlessStore {
		async fn list(&self, _: &Model, _: &ListOpts) -> CtResult<ListChunk<Record>> {
			Ok(ListChunk { total: 0, items: Vec::new() })
		}
		async fn create(&self, _: &Model, _: &Data) -> CtResult<RecordId> {
			Err(Error::Internal("read only".into()))
		}
		async fn load(&self, _: &Model, _: &str) -> CtResult<Option<Record>> {
			Ok(None)
		}
		async fn update(&self, _: &Model, _: &str, _: &Data) -> CtResult<Record> {
			Err(Error::Internal("read only".into()))
		}
		async fn delete(&self, _: &Model, _: &str) -> CtResult<()> {
			Err(Error::Internal("read only".into()))
		}
	}

	#[async_trait]
	impl PrincipalResolver for RevisionlessStore {
		async fn resolve(&self, _: &str) -> CtResult<Principal> {
			Err(Error::Unauthorized)
		}
	}

	fn revisionless_app() -> (App, Arc<RevisionlessStore>) {
		let store = Arc::new(RevisionlessStore::default());
		let app = Arc::new(AppState {
			opts: AppOpts::default(),
			models: Arc::new(ModelRegistry::new().freeze()),
			hooks: Arc::new(HookRegistry::new().freeze()),
			acl: Arc::new(RolePolicy),
			settings_adapter: store.clone(),
			content_adapter: store.clone(),
			principal_resolver: store.clone(),
		});
		(app, store)
	}

	fn publisher() -> Principal {
		Principal {
			id: "1".into(),
			name: "Ann".into(),
			role: "1".into(),
			permissions: Permissions::from_value(&json!({ "content": { "news": "publish" } })),
		}
	}

	#[tokio::test]
	async fn test_record_without_revisions_stays_empty() {
		let (app, store) = revisionless_app();
		let news = Model::new("news", ModelType::Content);

		let published = publish(&app, &publisher(), &news, "1", Rev(1)).await.unwrap();
		assert_eq!(published, PublishState::Empty);
		let unpublished = unpublish(&app, &publisher(), &news, "1").await.unwrap();
		assert_eq!(unpublished, PublishState::Empty);
		assert_eq!(state(&app, &publisher(), &news, "1").await.unwrap(), PublishState::Empty);

		assert_eq!(store.pointer_writes.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn test_singleton_cannot_be_unpublished() {
		let model =
			Model::new("startpage", ModelType::Content).collection(Collection::Singleton);
		assert!(matches!(
			check_transition(&model, Transition::Unpublish),
			Err(Error::Forbidden(_))
		));
		assert!(check_transition(&model, Transition::Publish(Rev(1))).is_ok());
	}

	#[test]
	fn test_list_models_allow_both_transitions() {
		let model = Model::new("news", ModelType::Content);
		assert!(check_transition(&model, Transition::Unpublish).is_ok());
		assert!(check_transition(&model, Transition::Publish(Rev(4))).is_ok());
	}

	#[test]
	fn test_unversioned_model_is_rejected() {
		let model = Model::new("site", ModelType::Content).versioned(false);
		assert!(matches!(ensure_versioned(&model), Err(Error::ValidationError(_))));
	}

	#[test]
	fn test_state_serialization() {
		assert_eq!(
			serde_json::to_value(PublishState::Published { rev: Rev(3) }).unwrap(),
			json!({ "state": "published", "rev": 3 })
		);
		assert_eq!(
			serde_json::to_value(PublishState::Empty).unwrap(),
			json!({ "state": "empty" })
		);
	}
}

// vim: ts=4

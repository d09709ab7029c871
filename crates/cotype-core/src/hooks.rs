//! Per-model hook table.
//!
//! Business rules that belong to a single model (required fields, password
//! hashing, self-deletion guards) are registered here by name at startup
//! instead of being special-cased in the CRUD services. Hooks run before the
//! persistence call; an error aborts the operation.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

use cotype_types::acl::Principal;
use cotype_types::model::{Model, ModelType};

use crate::prelude::*;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Runs before create or update and may rewrite the incoming data
pub type WriteHookFn = Arc<
	dyn for<'a> Fn(&'a Principal, &'a mut Data) -> BoxFuture<'a, CtResult<()>> + Send + Sync,
>;

/// Runs before delete with the id of the record
pub type DeleteHookFn =
	Arc<dyn for<'a> Fn(&'a Principal, &'a str) -> BoxFuture<'a, CtResult<()>> + Send + Sync>;

#[derive(Clone, Default)]
struct ModelHooks {
	before_create: Vec<WriteHookFn>,
	before_update: Vec<WriteHookFn>,
	before_delete: Vec<DeleteHookFn>,
}

impl std::fmt::Debug for ModelHooks {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ModelHooks")
			.field("before_create", &self.before_create.len())
			.field("before_update", &self.before_update.len())
			.field("before_delete", &self.before_delete.len())
			.finish()
	}
}

type HookKey = (ModelType, Box<str>);

/// Mutable registry used during app initialization
#[derive(Debug, Default)]
pub struct HookRegistry {
	hooks: HashMap<HookKey, ModelHooks>,
}

impl HookRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	fn entry(&mut self, typ: ModelType, model: &str) -> &mut ModelHooks {
		self.hooks.entry((typ, model.into())).or_default()
	}

	pub fn before_create<F>(&mut self, typ: ModelType, model: &str, hook: F) -> &mut Self
	where
		F: for<'a> Fn(&'a Principal, &'a mut Data) -> BoxFuture<'a, CtResult<()>>
			+ Send
			+ Sync
			+ 'static,
	{
		debug!("Registering before_create hook for {}", model);
		self.entry(typ, model).before_create.push(Arc::new(hook));
		self
	}

	pub fn before_update<F>(&mut self, typ: ModelType, model: &str, hook: F) -> &mut Self
	where
		F: for<'a> Fn(&'a Principal, &'a mut Data) -> BoxFuture<'a, CtResult<()>>
			+ Send
			+ Sync
			+ 'static,
	{
		debug!("Registering before_update hook for {}", model);
		self.entry(typ, model).before_update.push(Arc::new(hook));
		self
	}

	pub fn before_delete<F>(&mut self, typ: ModelType, model: &str, hook: F) -> &mut Self
	where
		F: for<'a> Fn(&'a Principal, &'a str) -> BoxFuture<'a, CtResult<()>>
			+ Send
			+ Sync
			+ 'static,
	{
		debug!("Registering before_delete hook for {}", model);
		self.entry(typ, model).before_delete.push(Arc::new(hook));
		self
	}

	/// Freeze the registry (make it immutable)
	pub fn freeze(self) -> FrozenHookRegistry {
		info!("Freezing hook registry with hooks for {} models", self.hooks.len());
		FrozenHookRegistry { hooks: self.hooks }
	}
}

/// Immutable registry stored in AppState
#[derive(Debug, Default)]
pub struct FrozenHookRegistry {
	hooks: HashMap<HookKey, ModelHooks>,
}

impl FrozenHookRegistry {
	fn get(&self, model: &Model) -> Option<&ModelHooks> {
		self.hooks.get(&(model.typ, model.name.clone()))
	}

	pub async fn before_create(
		&self,
		model: &Model,
		principal: &Principal,
		data: &mut Data,
	) -> CtResult<()> {
		if let Some(hooks) = self.get(model) {
			for hook in &hooks.before_create {
				hook(principal, &mut *data).await?;
			}
		}
		Ok(())
	}

	pub async fn before_update(
		&self,
		model: &Model,
		principal: &Principal,
		data: &mut Data,
	) -> CtResult<()> {
		if let Some(hooks) = self.get(model) {
			for hook in &hooks.before_update {
				hook(principal, &mut *data).await?;
			}
		}
		Ok(())
	}

	pub async fn before_delete(&self, model: &Model, principal: &Principal, id: &str) -> CtResult<()> {
		if let Some(hooks) = self.get(model) {
			for hook in &hooks.before_delete {
				hook(principal, id).await?;
			}
		}
		Ok(())
	}
}


// vim: ts=4

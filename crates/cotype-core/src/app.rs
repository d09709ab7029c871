//! App state type

use std::sync::Arc;

use cotype_types::acl::AccessControl;
use cotype_types::model::{Model, ModelType};
use cotype_types::persistence_adapter::{ContentAdapter, PrincipalResolver, SettingsAdapter};

use crate::hooks::FrozenHookRegistry;
use crate::models::FrozenModelRegistry;
use crate::prelude::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone)]
pub struct AppOpts {
	pub listen: Box<str>,
	/// Base URL media ids are joined to
	pub media_url: Box<str>,
}

impl Default for AppOpts {
	fn default() -> Self {
		Self { listen: "127.0.0.1:4000".into(), media_url: "/media".into() }
	}
}

#[derive(Debug)]
pub struct AppState {
	pub opts: AppOpts,
	pub models: Arc<FrozenModelRegistry>,
	pub hooks: Arc<FrozenHookRegistry>,
	pub acl: Arc<dyn AccessControl>,

	pub settings_adapter: Arc<dyn SettingsAdapter>,
	pub content_adapter: Arc<dyn ContentAdapter>,
	pub principal_resolver: Arc<dyn PrincipalResolver>,
}

impl AppState {
	/// Looks up a model, `Error::NotFound` if it is not registered
	pub fn model(&self, typ: ModelType, name: &str) -> CtResult<&Arc<Model>> {
		self.models.get(typ, name).ok_or(Error::NotFound)
	}
}

pub type App = Arc<AppState>;

// vim: ts=4

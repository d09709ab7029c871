//! App builder - constructs and runs the Cotype application

use axum::Router;
use std::{path::PathBuf, pin::Pin, sync::Arc};

use crate::prelude::*;
use crate::routes;
use cotype_core::{HookRegistry, ModelRegistry, RolePolicy};
use cotype_types::acl::AccessControl;
use cotype_types::model::Model;
use cotype_types::persistence_adapter::{ContentAdapter, PrincipalResolver, SettingsAdapter};

pub use cotype_core::app::{App, AppOpts, AppState, VERSION};

/// Type alias for async initialization callbacks
type InitCallback =
	Box<dyn FnOnce(App) -> Pin<Box<dyn Future<Output = CtResult<()>> + Send>> + Send>;

/// Type alias for hook registration callbacks
type HookRegistrar = Box<dyn FnOnce(&mut HookRegistry) + Send>;

#[derive(Default)]
struct Adapters {
	settings_adapter: Option<Arc<dyn SettingsAdapter>>,
	content_adapter: Option<Arc<dyn ContentAdapter>>,
	principal_resolver: Option<Arc<dyn PrincipalResolver>>,
}

pub struct AppBuilder {
	opts: AppOpts,
	models_files: Vec<PathBuf>,
	models: Vec<Model>,
	hooks: Vec<HookRegistrar>,
	acl: Option<Arc<dyn AccessControl>>,
	adapters: Adapters,
	on_init: Vec<InitCallback>,
}

impl AppBuilder {
	pub fn new() -> Self {
		// A subscriber may already be installed (tests build several apps)
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder {
			opts: AppOpts::default(),
			models_files: Vec::new(),
			models: Vec::new(),
			hooks: Vec::new(),
			acl: None,
			adapters: Adapters::default(),
			on_init: Vec::new(),
		}
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn media_url(&mut self, media_url: impl Into<Box<str>>) -> &mut Self {
		self.opts.media_url = media_url.into();
		self
	}

	// Models
	/// Adds a JSON models file (`{ "models": [...] }`) to load at startup
	pub fn models_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
		self.models_files.push(path.into());
		self
	}
	pub fn model(&mut self, model: Model) -> &mut Self {
		self.models.push(model);
		self
	}
	pub fn models(&mut self, models: impl IntoIterator<Item = Model>) -> &mut Self {
		self.models.extend(models);
		self
	}

	/// Registers additional per-model hooks next to the built-in ones
	pub fn hooks<F>(&mut self, f: F) -> &mut Self
	where
		F: FnOnce(&mut HookRegistry) + Send + 'static,
	{
		self.hooks.push(Box::new(f));
		self
	}

	/// Replaces the default role based access control policy
	pub fn access_control(&mut self, acl: Arc<dyn AccessControl>) -> &mut Self {
		self.acl = Some(acl);
		self
	}

	// Adapters
	pub fn settings_adapter(&mut self, settings_adapter: Arc<dyn SettingsAdapter>) -> &mut Self {
		self.adapters.settings_adapter = Some(settings_adapter);
		self
	}
	pub fn content_adapter(&mut self, content_adapter: Arc<dyn ContentAdapter>) -> &mut Self {
		self.adapters.content_adapter = Some(content_adapter);
		self
	}
	pub fn principal_resolver(
		&mut self,
		principal_resolver: Arc<dyn PrincipalResolver>,
	) -> &mut Self {
		self.adapters.principal_resolver = Some(principal_resolver);
		self
	}

	/// Register an async initialization callback that runs after the App is
	/// created but before the server starts listening.
	pub fn on_init<F, Fut>(&mut self, f: F) -> &mut Self
	where
		F: FnOnce(App) -> Fut + Send + 'static,
		Fut: Future<Output = CtResult<()>> + Send + 'static,
	{
		self.on_init.push(Box::new(move |app| Box::pin(f(app))));
		self
	}

	/// Assembles the app state and the router without starting a server
	pub async fn build(self) -> CtResult<(App, Router)> {
		let Some(settings_adapter) = self.adapters.settings_adapter else {
			error!("FATAL: No settings adapter configured");
			return Err(Error::Internal("No settings adapter configured".to_string()));
		};
		let Some(content_adapter) = self.adapters.content_adapter else {
			error!("FATAL: No content adapter configured");
			return Err(Error::Internal("No content adapter configured".to_string()));
		};
		let Some(principal_resolver) = self.adapters.principal_resolver else {
			error!("FATAL: No principal resolver configured");
			return Err(Error::Internal("No principal resolver configured".to_string()));
		};

		// Models
		let mut models = ModelRegistry::with_builtins()?;
		for path in &self.models_files {
			models.load_file(path).await.inspect_err(|err| {
				error!("FATAL: Cannot load models from {}: {}", path.display(), err);
			})?;
		}
		for model in self.models {
			models.register(model)?;
		}
		let models = models.freeze();

		// Hooks
		let mut hooks = HookRegistry::new();
		cotype_settings::register_hooks(&mut hooks);
		for registrar in self.hooks {
			registrar(&mut hooks);
		}
		let hooks = hooks.freeze();

		let app: App = Arc::new(AppState {
			opts: self.opts,
			models: Arc::new(models),
			hooks: Arc::new(hooks),
			acl: self.acl.unwrap_or_else(|| Arc::new(RolePolicy)),
			settings_adapter,
			content_adapter,
			principal_resolver,
		});

		for callback in self.on_init {
			callback(app.clone()).await.inspect_err(|err| {
				error!("FATAL: Initialization failed: {}", err);
			})?;
		}

		let router = routes::init(app.clone());
		Ok((app, router))
	}

	pub async fn run(self) -> CtResult<()> {
		info!("Cotype V{}", VERSION);

		let (app, router) = self.build().await?;

		let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await.map_err(|err| {
			error!("FATAL: Cannot listen on {}: {}", app.opts.listen, err);
			Error::from(err)
		})?;
		info!("Listening on HTTP {}", app.opts.listen);

		axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

		info!("Server stopped");
		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		warn!("Cannot listen for shutdown signal: {}", err);
		std::future::pending::<()>().await;
	}
	info!("Shutting down");
}

// vim: ts=4

use serde_json::{Value, json};
use std::{env, path::PathBuf, sync::Arc};

use cotype::acl::{Permissions, Principal};
use cotype::model::{ModelType, ROLES_MODEL, USERS_MODEL};
use cotype::prelude::*;
use cotype::types::{ListOpts, Search};
use cotype::AppBuilder;
use cotype_persistence_adapter_sqlite::PersistenceAdapterSqlite;

pub struct Config {
	pub listen: String,
	pub db_dir: PathBuf,
	pub models_file: Option<PathBuf>,
	pub media_url: String,
	/// Email and password of the administrator created on first start
	pub admin: Option<(String, String)>,
}

impl Config {
	fn from_env() -> Self {
		let var = |name: &str| env::var(name).ok().filter(|value| !value.is_empty());
		Config {
			listen: var("COTYPE_LISTEN").unwrap_or_else(|| "127.0.0.1:4000".to_string()),
			db_dir: PathBuf::from(var("DB_DIR").unwrap_or_else(|| "./data".to_string())),
			models_file: var("COTYPE_MODELS").map(PathBuf::from),
			media_url: var("COTYPE_MEDIA_URL").unwrap_or_else(|| "/media".to_string()),
			admin: var("COTYPE_ADMIN_EMAIL").zip(var("COTYPE_ADMIN_PASSWORD")),
		}
	}
}

fn object(value: Value) -> Data {
	match value {
		Value::Object(map) => map,
		_ => Data::new(),
	}
}

/// Creates an administrator role and user unless a user with the email
/// exists already, then prints a session token for it
async fn bootstrap(
	app: App,
	adapter: Arc<PersistenceAdapterSqlite>,
	email: String,
	password: String,
) -> CtResult<()> {
	let roles = app.model(ModelType::Settings, ROLES_MODEL)?;
	let users = app.model(ModelType::Settings, USERS_MODEL)?;

	let opts = ListOpts {
		search: Some(Search { prop: "email".into(), term: email.as_str().into() }),
		..ListOpts::default()
	};
	let existing = app.settings_adapter.list(users, &opts).await?;
	if existing.items.iter().any(|user| user.data.get("email") == Some(&json!(email))) {
		info!("Administrator {} already exists", email);
		return Ok(());
	}

	let content: serde_json::Map<String, Value> = app
		.models
		.list(ModelType::Content)
		.map(|model| (model.name.to_string(), json!("publish")))
		.collect();
	let role = object(json!({
		"name": "Administrator",
		"permissions": { "settings": true, "content": content },
	}));
	let role_id = app.settings_adapter.create(roles, &role).await?;

	let system = Principal {
		id: "".into(),
		name: "bootstrap".into(),
		role: "".into(),
		permissions: Permissions::default(),
	};
	let mut user = object(json!({
		"name": "Administrator",
		"email": email,
		"role": role_id,
		"newPassword": password,
	}));
	app.hooks.before_create(users, &system, &mut user).await?;
	let user_id = app.settings_adapter.create(users, &user).await?;
	info!("Administrator {} created", email);

	// Shown once on the console, never logged
	let token = adapter.create_session(&user_id).await?;
	info!("Administrator session created, the token is printed to stdout");
	println!("Administrator session token: {}", token);
	Ok(())
}

#[tokio::main]
async fn main() {
	let config = Config::from_env();
	let mut builder = AppBuilder::new();

	let adapter = match PersistenceAdapterSqlite::new(&config.db_dir).await {
		Ok(adapter) => Arc::new(adapter),
		Err(err) => {
			error!("FATAL: Cannot open database in {}: {}", config.db_dir.display(), err);
			std::process::exit(1);
		}
	};

	builder
		.listen(config.listen)
		.media_url(config.media_url)
		.settings_adapter(adapter.clone())
		.content_adapter(adapter.clone())
		.principal_resolver(adapter.clone());
	if let Some(models_file) = config.models_file {
		builder.models_file(models_file);
	}
	if let Some((email, password)) = config.admin {
		builder.on_init(move |app| bootstrap(app, adapter, email, password));
	}

	if let Err(err) = builder.run().await {
		error!("FATAL: {}", err);
		std::process::exit(1);
	}
}

// vim: ts=4

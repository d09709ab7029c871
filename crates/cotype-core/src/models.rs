//! Model registry: mutable while the app is assembled, frozen afterwards.

use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use cotype_types::model::{
	BooleanType, Field, MapKeys, MapType, MediaType, Model, ModelType, ModelsJson, NumberType,
	ObjectType, ReferenceType, StringInput, StringType, Type,
};

use crate::prelude::*;

pub use cotype_types::model::{MEDIA_MODEL, ROLES_MODEL, USERS_MODEL};

type ModelKey = (ModelType, Box<str>);

/// Mutable registry used during app initialization
#[derive(Debug, Default)]
pub struct ModelRegistry {
	models: Vec<Arc<Model>>,
	index: HashMap<ModelKey, usize>,
}

impl ModelRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry preloaded with the built-in `roles`, `users` and `media` models
	pub fn with_builtins() -> CtResult<Self> {
		let mut registry = Self::new();
		registry.register(roles_model())?;
		registry.register(users_model())?;
		registry.register(media_model())?;
		Ok(registry)
	}

	/// Register a model. Names are unique per model type.
	pub fn register(&mut self, model: Model) -> CtResult<()> {
		model.validate()?;
		let key = (model.typ, model.name.clone());
		if self.index.contains_key(&key) {
			return Err(Error::ConfigError(format!(
				"Model '{}' ({}) is already registered",
				model.name,
				model.typ.as_str()
			)));
		}

		debug!("Registering model: {} ({})", model.name, model.typ.as_str());
		self.index.insert(key, self.models.len());
		self.models.push(Arc::new(model));
		Ok(())
	}

	/// Registers every model of a models file (`{ "models": [...] }`)
	pub fn load_json(&mut self, json: &str) -> CtResult<()> {
		let file: ModelsJson = serde_json::from_str(json)
			.map_err(|err| Error::ConfigError(format!("Invalid models file: {}", err)))?;
		for model in file.models {
			self.register(model)?;
		}
		Ok(())
	}

	pub async fn load_file(&mut self, path: &Path) -> CtResult<()> {
		info!("Loading models from {}", path.display());
		let json = tokio::fs::read_to_string(path).await?;
		self.load_json(&json)
	}

	/// Freeze the registry (make it immutable)
	pub fn freeze(self) -> FrozenModelRegistry {
		info!("Freezing model registry with {} models", self.models.len());
		FrozenModelRegistry { models: self.models, index: self.index }
	}

	pub fn len(&self) -> usize {
		self.models.len()
	}

	pub fn is_empty(&self) -> bool {
		self.models.is_empty()
	}
}

/// Immutable registry stored in AppState
#[derive(Debug)]
pub struct FrozenModelRegistry {
	models: Vec<Arc<Model>>,
	index: HashMap<ModelKey, usize>,
}

impl FrozenModelRegistry {
	pub fn get(&self, typ: ModelType, name: &str) -> Option<&Arc<Model>> {
		self.index.get(&(typ, Box::from(name))).and_then(|idx| self.models.get(*idx))
	}

	/// Models of one type in registration order
	pub fn list(&self, typ: ModelType) -> impl Iterator<Item = &Arc<Model>> {
		self.models.iter().filter(move |model| model.typ == typ)
	}

	pub fn iter(&self) -> impl Iterator<Item = &Arc<Model>> {
		self.models.iter()
	}

	pub fn len(&self) -> usize {
		self.models.len()
	}

	pub fn is_empty(&self) -> bool {
		self.models.is_empty()
	}
}

/// Registry grouped by model type, as served to the admin UI
#[derive(Debug, Serialize)]
pub struct ModelsByType<'a> {
	pub content: Vec<&'a Model>,
	pub settings: Vec<&'a Model>,
	pub media: Vec<&'a Model>,
}

impl FrozenModelRegistry {
	pub fn by_type(&self) -> ModelsByType<'_> {
		let collect = |typ: ModelType| -> Vec<&Model> { self.list(typ).map(|model| &**model).collect() };
		ModelsByType {
			content: collect(ModelType::Content),
			settings: collect(ModelType::Settings),
			media: collect(ModelType::Media),
		}
	}
}

// Built-in models //
//*****************//
fn string_field(label: &str, required: bool) -> Field {
	Field::new(Type::String(StringType { required, ..StringType::default() })).label(label)
}

fn roles_model() -> Model {
	let permission = Type::String(StringType {
		input: Some(StringInput::Select),
		values: Some(vec!["view".into(), "edit".into(), "publish".into()]),
		..StringType::default()
	});
	let permissions = ObjectType {
		fields: [
			(
				Box::from("settings"),
				Field::new(Type::Boolean(BooleanType::default())).label("Manage settings"),
			),
			(
				Box::from("content"),
				Field::new(Type::Map(MapType {
					keys: MapKeys { fetch: Some("/admin/rest/models/content".into()), values: None },
					values: Box::new(permission),
				}))
				.label("Content"),
			),
		]
		.into_iter()
		.collect(),
		layout: None,
		modal_view: false,
	};

	let mut model = Model::new(ROLES_MODEL, ModelType::Settings)
		.field("name", string_field("Name", true))
		.field("permissions", Field::new(Type::Object(permissions)).label("Permissions"))
		.title("name");
	model.singular = Some("Role".into());
	model.plural = Some("Roles".into());
	model
}

fn users_model() -> Model {
	let role = Type::Settings(ReferenceType {
		model: Some(ROLES_MODEL.into()),
		required: true,
		..ReferenceType::default()
	});
	let password = Type::String(StringType {
		input: Some(StringInput::Password),
		..StringType::default()
	});

	let mut model = Model::new(USERS_MODEL, ModelType::Settings)
		.field("name", string_field("Name", false))
		.field("email", string_field("Email", true))
		.field("role", Field::new(role).label("Role"))
		.field("newPassword", Field::new(password).label("Password"))
		.title("name");
	model.singular = Some("User".into());
	model.plural = Some("Users".into());
	model.unique_fields = vec!["email".into()];
	model
}

fn media_model() -> Model {
	let number = |label: &str| Field::new(Type::Number(NumberType::default())).label(label);
	let mut model = Model::new(MEDIA_MODEL, ModelType::Media)
		.field("originalname", string_field("Name", false))
		.field("mimetype", string_field("Type", false))
		.field("size", number("Size"))
		.field("width", number("Width"))
		.field("height", number("Height"))
		.field("alt", string_field("Alternative text", false))
		.field("credit", string_field("Credit", false))
		.field("file", Field::new(Type::Media(MediaType::default())).label("File"))
		.title("originalname");
	model.singular = Some("Media".into());
	model.plural = Some("Media".into());
	model
}


// vim: ts=4

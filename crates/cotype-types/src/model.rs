//! Model descriptors: content, settings and media types with their fields.
//!
//! Field types are a tagged union keyed by `type`. Every variant only accepts
//! the attributes that belong to it: unknown attributes are rejected while
//! deserializing, and attributes that depend on the `input`/`mediaType`
//! sub-variant are checked by [`Type::validate`].

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_with::skip_serializing_none;
use std::collections::BTreeMap;

use crate::prelude::*;

pub type Fields = BTreeMap<Box<str>, Field>;

/// Names of the built-in models
pub const ROLES_MODEL: &str = "roles";
pub const USERS_MODEL: &str = "users";
pub const MEDIA_MODEL: &str = "media";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
	#[default]
	Content,
	Settings,
	Media,
}

impl ModelType {
	pub fn as_str(&self) -> &'static str {
		match self {
			ModelType::Content => "content",
			ModelType::Settings => "settings",
			ModelType::Media => "media",
		}
	}
}

/// How records of a model are organized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
	#[default]
	List,
	/// Exactly one record, edited in place
	Singleton,
	None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
	Asc,
	Desc,
}

// Field types //
//*************//
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct BooleanType {
	pub input: Option<BooleanInput>,
	pub required: bool,
	pub index: bool,
	pub default_value: Option<bool>,
	pub hidden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanInput {
	Checkbox,
	Toggle,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct NumberType {
	pub min: Option<f64>,
	pub max: Option<f64>,
	pub placeholder: Option<String>,
	pub required: bool,
	pub index: bool,
	pub hidden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringInput {
	Textarea,
	Slug,
	Date,
	Select,
	Password,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct StringType {
	/// Plain text input when absent
	pub input: Option<StringInput>,
	pub placeholder: Option<String>,
	pub read_only: Option<bool>,
	pub max_length: Option<u32>,
	pub default_value: Option<String>,
	pub null_label: Option<String>,
	pub fetch: Option<String>,
	pub values: Option<Vec<String>>,
	pub required: bool,
	pub index: bool,
	pub hidden: bool,
}

impl StringType {
	fn validate(&self, path: &str) -> CtResult<()> {
		let input = self.input;
		let text_like = matches!(input, None | Some(StringInput::Textarea | StringInput::Password));
		let check = |present: bool, attr: &str, allowed: bool| {
			if present && !allowed {
				Err(Error::ConfigError(format!(
					"{}: '{}' is not allowed for string input {:?}",
					path, attr, input
				)))
			} else {
				Ok(())
			}
		};
		check(self.max_length.is_some(), "maxLength", text_like)?;
		check(self.read_only.is_some(), "readOnly", text_like)?;
		check(
			self.placeholder.is_some(),
			"placeholder",
			text_like || input == Some(StringInput::Date),
		)?;
		check(self.default_value.is_some(), "defaultValue", input == Some(StringInput::Date))?;
		let select = input == Some(StringInput::Select);
		check(self.values.is_some(), "values", select)?;
		check(self.fetch.is_some(), "fetch", select)?;
		check(self.null_label.is_some(), "nullLabel", select)?;
		Ok(())
	}
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RichtextType {
	pub required: bool,
	pub formats: Option<serde_json::Value>,
	pub modules: Option<serde_json::Map<String, serde_json::Value>>,
	pub index: bool,
	pub hidden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
	All,
	Image,
	Video,
	Pdf,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct MediaType {
	pub media_type: Option<MediaKind>,
	pub mime_type: Option<String>,
	pub min_width: Option<u32>,
	pub min_height: Option<u32>,
	pub max_width: Option<u32>,
	pub max_height: Option<u32>,
	pub max_size: Option<u64>,
	pub with_external: bool,
	pub required: bool,
	pub hidden: bool,
}

impl MediaType {
	fn validate(&self, path: &str) -> CtResult<()> {
		let kind = self.media_type.unwrap_or(MediaKind::All);
		if self.mime_type.is_some() && kind != MediaKind::All {
			return Err(Error::ConfigError(format!(
				"{}: 'mimeType' is only allowed for mediaType 'all'",
				path
			)));
		}
		let has_dimensions = self.min_width.is_some()
			|| self.min_height.is_some()
			|| self.max_width.is_some()
			|| self.max_height.is_some();
		if has_dimensions && kind != MediaKind::Image {
			return Err(Error::ConfigError(format!(
				"{}: size constraints are only allowed for mediaType 'image'",
				path
			)));
		}
		Ok(())
	}
}

/// Reference to a content, settings or external record
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ReferenceType {
	pub model: Option<Box<str>>,
	pub models: Option<Vec<Box<str>>>,
	pub required: bool,
	pub allow_absolute_refs: bool,
	pub index: bool,
	pub hidden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectLayout {
	Vertical,
	Horizontal,
	Inline,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ObjectType {
	pub fields: Fields,
	pub layout: Option<ObjectLayout>,
	#[serde(default)]
	pub modal_view: bool,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapKeys {
	pub fetch: Option<String>,
	pub values: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapType {
	pub keys: MapKeys,
	pub values: Box<Type>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListLayout {
	Inline,
	Block,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListType {
	pub item: Box<Field>,
	#[serde(default)]
	pub sortable: bool,
	#[serde(default)]
	pub schedule: bool,
	pub add_label: Option<String>,
	#[serde(default)]
	pub required: bool,
	pub min_length: Option<u32>,
	pub max_length: Option<u32>,
	pub layout: Option<ListLayout>,
	#[serde(default)]
	pub hidden: bool,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UnionMember {
	pub label: Option<String>,
	pub icon: Option<String>,
	pub fields: Fields,
	pub layout: Option<ObjectLayout>,
	#[serde(default)]
	pub modal_view: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnionType {
	pub types: BTreeMap<Box<str>, UnionMember>,
	#[serde(default)]
	pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PositionType {
	pub index: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImmutableType {
	pub child: Box<Field>,
}

/// Inverse reference: lists records of `model` pointing to this one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InverseReferenceType {
	pub model: Box<str>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Type {
	Boolean(BooleanType),
	Number(NumberType),
	String(StringType),
	Richtext(RichtextType),
	Media(MediaType),
	Content(ReferenceType),
	Settings(ReferenceType),
	External(ReferenceType),
	Object(ObjectType),
	Map(MapType),
	List(ListType),
	Union(UnionType),
	Position(PositionType),
	Immutable(ImmutableType),
	References(InverseReferenceType),
}

impl Type {
	pub fn type_name(&self) -> &'static str {
		match self {
			Type::Boolean(_) => "boolean",
			Type::Number(_) => "number",
			Type::String(_) => "string",
			Type::Richtext(_) => "richtext",
			Type::Media(_) => "media",
			Type::Content(_) => "content",
			Type::Settings(_) => "settings",
			Type::External(_) => "external",
			Type::Object(_) => "object",
			Type::Map(_) => "map",
			Type::List(_) => "list",
			Type::Union(_) => "union",
			Type::Position(_) => "position",
			Type::Immutable(_) => "immutable",
			Type::References(_) => "references",
		}
	}

	pub fn is_required(&self) -> bool {
		match self {
			Type::Boolean(t) => t.required,
			Type::Number(t) => t.required,
			Type::String(t) => t.required,
			Type::Richtext(t) => t.required,
			Type::Media(t) => t.required,
			Type::Content(t) | Type::Settings(t) | Type::External(t) => t.required,
			Type::List(t) => t.required,
			Type::Union(t) => t.required,
			Type::Immutable(t) => t.child.typ.is_required(),
			Type::Object(_) | Type::Map(_) | Type::Position(_) | Type::References(_) => false,
		}
	}

	/// Checks attributes that depend on a sub-variant, recursing into composites
	pub fn validate(&self, path: &str) -> CtResult<()> {
		match self {
			Type::String(t) => t.validate(path),
			Type::Media(t) => t.validate(path),
			Type::Number(t) => match (t.min, t.max) {
				(Some(min), Some(max)) if min > max => {
					Err(Error::ConfigError(format!("{}: min is greater than max", path)))
				}
				_ => Ok(()),
			},
			Type::Content(t) | Type::Settings(t) => {
				if t.model.is_none() && t.models.as_ref().is_none_or(Vec::is_empty) {
					return Err(Error::ConfigError(format!(
						"{}: reference needs 'model' or 'models'",
						path
					)));
				}
				Ok(())
			}
			Type::Object(t) => validate_fields(&t.fields, path),
			Type::Union(t) => {
				for (name, member) in &t.types {
					validate_fields(&member.fields, &format!("{}.{}", path, name))?;
				}
				Ok(())
			}
			Type::List(t) => {
				if let (Some(min), Some(max)) = (t.min_length, t.max_length)
					&& min > max
				{
					return Err(Error::ConfigError(format!(
						"{}: minLength is greater than maxLength",
						path
					)));
				}
				t.item.typ.validate(&format!("{}[]", path))
			}
			Type::Map(t) => t.values.validate(&format!("{}{{}}", path)),
			Type::Immutable(t) => t.child.typ.validate(path),
			Type::Boolean(_)
			| Type::Richtext(_)
			| Type::External(_)
			| Type::Position(_)
			| Type::References(_) => Ok(()),
		}
	}
}

fn validate_fields(fields: &Fields, path: &str) -> CtResult<()> {
	for (name, field) in fields {
		field.typ.validate(&format!("{}.{}", path, name))?;
	}
	Ok(())
}

/// A field: a type plus the attributes every field may carry
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
	pub label: Option<Box<str>>,
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub unique: bool,
	#[serde(flatten)]
	pub typ: Type,
}

impl Field {
	pub fn new(typ: Type) -> Self {
		Self { label: None, unique: false, typ }
	}

	pub fn label(mut self, label: impl Into<Box<str>>) -> Self {
		self.label = Some(label.into());
		self
	}
}

// `label` and `unique` are split off by hand so that the remaining attributes
// can be checked strictly against the type tag.
impl<'de> Deserialize<'de> for Field {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let mut map = serde_json::Map::deserialize(deserializer)?;
		let label = match map.remove("label") {
			None | Some(serde_json::Value::Null) => None,
			Some(serde_json::Value::String(label)) => Some(label.into_boxed_str()),
			Some(_) => return Err(D::Error::custom("field label must be a string")),
		};
		let unique = match map.remove("unique") {
			None => false,
			Some(serde_json::Value::Bool(unique)) => unique,
			Some(_) => return Err(D::Error::custom("field 'unique' must be a boolean")),
		};
		let typ = Type::deserialize(serde_json::Value::Object(map)).map_err(D::Error::custom)?;
		Ok(Field { label, unique, typ })
	}
}

// Model //
//*******//
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
	pub name: Box<str>,
	#[serde(rename = "type", default)]
	pub typ: ModelType,
	#[serde(default)]
	pub collection: Collection,
	pub fields: Fields,
	/// Field used for display and free-text search
	pub title: Option<Box<str>>,
	pub versioned: Option<bool>,
	pub singular: Option<Box<str>>,
	pub plural: Option<Box<str>>,
	pub description: Option<Box<str>>,
	pub image: Option<Box<str>>,
	pub url_path: Option<Box<str>>,
	pub group: Option<Box<str>>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub unique_fields: Vec<Box<str>>,
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub not_search_able: bool,
	pub order_by: Option<Box<str>>,
	pub order: Option<Order>,
	pub writable: Option<bool>,
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub external: bool,
}

impl Model {
	pub fn new(name: impl Into<Box<str>>, typ: ModelType) -> Self {
		Model {
			name: name.into(),
			typ,
			collection: Collection::List,
			fields: Fields::new(),
			title: None,
			versioned: None,
			singular: None,
			plural: None,
			description: None,
			image: None,
			url_path: None,
			group: None,
			unique_fields: Vec::new(),
			not_search_able: false,
			order_by: None,
			order: None,
			writable: None,
			external: false,
		}
	}

	pub fn field(mut self, name: impl Into<Box<str>>, field: Field) -> Self {
		self.fields.insert(name.into(), field);
		self
	}

	pub fn collection(mut self, collection: Collection) -> Self {
		self.collection = collection;
		self
	}

	pub fn title(mut self, title: impl Into<Box<str>>) -> Self {
		self.title = Some(title.into());
		self
	}

	pub fn versioned(mut self, versioned: bool) -> Self {
		self.versioned = Some(versioned);
		self
	}

	/// Content models keep a revision history unless told otherwise
	pub fn is_versioned(&self) -> bool {
		self.versioned.unwrap_or(self.typ == ModelType::Content)
	}

	pub fn is_singleton(&self) -> bool {
		self.collection == Collection::Singleton
	}

	/// Fields whose values must be unique among the model's records
	pub fn unique_field_names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.unique_fields.iter().map(AsRef::as_ref).collect();
		for (name, field) in &self.fields {
			if field.unique && !names.contains(&name.as_ref()) {
				names.push(name);
			}
		}
		names
	}

	pub fn validate(&self) -> CtResult<()> {
		if self.name.is_empty() {
			return Err(Error::ConfigError("Model name cannot be empty".into()));
		}
		for attr in [&self.title, &self.image, &self.description].into_iter().flatten() {
			if !self.fields.contains_key(attr) {
				return Err(Error::ConfigError(format!(
					"Model '{}' refers to unknown field '{}'",
					self.name, attr
				)));
			}
		}
		for name in &self.unique_fields {
			if !self.fields.contains_key(name) {
				return Err(Error::ConfigError(format!(
					"Model '{}' has unknown unique field '{}'",
					self.name, name
				)));
			}
		}
		validate_fields(&self.fields, &self.name)
	}
}

/// Contents of a models file
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsJson {
	#[serde(rename = "$schema")]
	pub schema: Option<String>,
	pub models: Vec<Model>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn parse_model(value: serde_json::Value) -> Result<Model, serde_json::Error> {
		serde_json::from_value(value)
	}

	#[test]
	fn test_parse_content_model() {
		let model = parse_model(json!({
			"name": "news",
			"title": "headline",
			"fields": {
				"headline": { "type": "string", "required": true, "label": "Headline" },
				"slug": { "type": "string", "input": "slug" },
				"body": { "type": "richtext" },
				"tags": { "type": "list", "item": { "type": "string" } },
				"author": { "type": "content", "model": "authors", "unique": false }
			}
		}))
		.unwrap();

		assert_eq!(model.typ, ModelType::Content);
		assert_eq!(model.collection, Collection::List);
		assert!(model.is_versioned());
		assert_eq!(model.fields["headline"].label.as_deref(), Some("Headline"));
		assert!(model.fields["headline"].typ.is_required());
		assert!(model.validate().is_ok());
	}

	#[test]
	fn test_attribute_from_other_type_is_rejected() {
		let res = parse_model(json!({
			"name": "flags",
			"fields": { "active": { "type": "boolean", "maxLength": 3 } }
		}));
		assert!(res.is_err());
	}

	#[test]
	fn test_input_specific_attribute_is_rejected() {
		let model = parse_model(json!({
			"name": "pages",
			"fields": { "slug": { "type": "string", "input": "slug", "maxLength": 10 } }
		}))
		.unwrap();
		assert!(matches!(model.validate(), Err(Error::ConfigError(_))));
	}

	#[test]
	fn test_select_values_allowed_only_on_select() {
		let select = parse_model(json!({
			"name": "a",
			"fields": { "kind": { "type": "string", "input": "select", "values": ["x", "y"] } }
		}))
		.unwrap();
		assert!(select.validate().is_ok());

		let text = parse_model(json!({
			"name": "b",
			"fields": { "kind": { "type": "string", "values": ["x", "y"] } }
		}))
		.unwrap();
		assert!(text.validate().is_err());
	}

	#[test]
	fn test_settings_models_are_not_versioned_by_default() {
		let model = Model::new("roles", ModelType::Settings);
		assert!(!model.is_versioned());
		assert!(!Model::new("news", ModelType::Content).versioned(false).is_versioned());
	}

	#[test]
	fn test_title_must_reference_a_field() {
		let model = Model::new("news", ModelType::Content).title("headline");
		assert!(model.validate().is_err());
	}

	#[test]
	fn test_unique_field_names_merge_both_sources() {
		let mut email = Field::new(Type::String(StringType::default()));
		email.unique = true;
		let mut model = Model::new("users", ModelType::Settings)
			.field("email", email)
			.field("login", Field::new(Type::String(StringType::default())));
		model.unique_fields.push("login".into());
		assert_eq!(model.unique_field_names(), vec!["login", "email"]);
	}
}

// vim: ts=4

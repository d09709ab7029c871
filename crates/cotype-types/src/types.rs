//! Common types used throughout the Cotype platform.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::time::SystemTime;

use crate::model::{Model, ModelType};

/// Record payload: a JSON object keyed by field name
pub type Data = serde_json::Map<String, serde_json::Value>;

/// Record identifier within a model's namespace
pub type RecordId = Box<str>;

// Timestamp //
//***********//
/// Seconds since the Unix epoch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Timestamp {
		let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
		Timestamp(res.as_secs().try_into().unwrap_or(i64::MAX))
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

// Rev //
//*****//
/// Revision number of a content record. Allocated monotonically per record,
/// starting at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rev(pub i64);

impl std::fmt::Display for Rev {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

// Records //
//*********//
/// A settings record, serialized flat as `{ "id": ..., ...data }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
	pub id: RecordId,
	#[serde(flatten)]
	pub data: Data,
}

impl Record {
	/// Data restricted to the fields the model declares
	pub fn pick_fields(&self, model: &Model) -> Data {
		pick_fields(&self.data, model)
	}
}

pub fn pick_fields(data: &Data, model: &Model) -> Data {
	data.iter()
		.filter(|(key, _)| model.fields.contains_key(key.as_str()))
		.map(|(key, value)| (key.clone(), value.clone()))
		.collect()
}

/// The latest revision of a content record together with its published pointer
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
	pub id: RecordId,
	pub rev: Rev,
	pub published_rev: Option<Rev>,
	pub date: Timestamp,
	pub author_name: Box<str>,
	pub data: Data,
}

/// Display projection of a record, returned by `load_item`
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
	pub id: RecordId,
	pub model: Box<str>,
	#[serde(rename = "type")]
	pub typ: ModelType,
	pub title: Option<String>,
	pub image: Option<String>,
	pub kind: Box<str>,
}

impl Item {
	pub fn from_record(model: &Model, record: &Record) -> Item {
		let string_field = |field: &Option<Box<str>>| {
			field
				.as_deref()
				.and_then(|name| record.data.get(name))
				.and_then(|v| v.as_str())
				.map(ToString::to_string)
		};
		Item {
			id: record.id.clone(),
			model: model.name.clone(),
			typ: model.typ,
			title: string_field(&model.title),
			image: string_field(&model.image),
			kind: model.singular.clone().unwrap_or_else(|| model.name.clone()),
		}
	}
}

// Listing //
//*********//
/// Free-text search against a single property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Search {
	pub prop: Box<str>,
	pub term: Box<str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOpts {
	pub search: Option<Search>,
	pub limit: u32,
	pub offset: u32,
}

impl Default for ListOpts {
	fn default() -> Self {
		Self { search: None, limit: 50, offset: 0 }
	}
}

/// Query parameters of list endpoints: `limit`, `offset` and free-text `q`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
	pub limit: Option<u32>,
	pub offset: Option<u32>,
	pub q: Option<String>,
}

impl ListQuery {
	/// Free-text search targets the model's title field. Models without a
	/// title are listed unfiltered.
	pub fn to_opts(&self, model: &Model) -> ListOpts {
		let defaults = ListOpts::default();
		let search = match (&self.q, &model.title) {
			(Some(term), Some(prop)) if !term.is_empty() => {
				Some(Search { prop: prop.clone(), term: term.as_str().into() })
			}
			_ => None,
		};
		ListOpts {
			search,
			limit: self.limit.unwrap_or(defaults.limit),
			offset: self.offset.unwrap_or(defaults.offset),
		}
	}
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListChunk<T> {
	pub total: u64,
	pub items: Vec<T>,
}

impl<T> ListChunk<T> {
	pub fn empty() -> Self {
		Self { total: 0, items: Vec::new() }
	}

	pub fn map<U>(self, f: impl FnMut(T) -> U) -> ListChunk<U> {
		ListChunk { total: self.total, items: self.items.into_iter().map(f).collect() }
	}
}


// vim: ts=4

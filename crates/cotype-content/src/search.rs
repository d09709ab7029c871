//! Free-text search across content models and shaping of the results.

use serde::Serialize;
use serde_with::skip_serializing_none;

use cotype_types::acl::{Permission, Principal};
use cotype_types::model::{Model, ModelType};
use cotype_types::types::{ContentRecord, ListChunk, ListOpts, Search};
use cotype_types::utils::url_join;

use crate::prelude::*;

/// A matching record before shaping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultItem {
	pub id: RecordId,
	pub model: Box<str>,
	pub title: Option<String>,
	pub description: Option<String>,
	pub image: Option<String>,
	pub url: Option<String>,
}

impl SearchResultItem {
	pub fn from_record(model: &Model, record: &ContentRecord) -> Self {
		let field = |name: &Option<Box<str>>| {
			name.as_deref()
				.and_then(|name| record.data.get(name))
				.and_then(serde_json::Value::as_str)
				.map(ToString::to_string)
		};
		SearchResultItem {
			id: record.id.clone(),
			model: model.name.clone(),
			title: field(&model.title),
			description: field(&model.description),
			image: field(&model.image),
			url: model.url_path.as_deref().map(|path| expand_url_path(path, record)),
		}
	}
}

/// Replaces `:id` and `:<field>` segments of a model's URL path
fn expand_url_path(path: &str, record: &ContentRecord) -> String {
	path.split('/')
		.map(|segment| match segment.strip_prefix(':') {
			Some("id") => record.id.to_string(),
			Some(field) => match record.data.get(field) {
				Some(serde_json::Value::String(value)) => value.clone(),
				Some(value) if !value.is_null() => value.to_string(),
				_ => String::new(),
			},
			None => segment.to_string(),
		})
		.collect::<Vec<_>>()
		.join("/")
}

/// Reference to a media record as the admin UI expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaRef {
	#[serde(rename = "_id")]
	pub id: Option<String>,
	#[serde(rename = "_ref")]
	pub reference: &'static str,
	#[serde(rename = "_src")]
	pub src: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
	pub id: RecordId,
	pub title: Option<String>,
	pub description: Option<String>,
	pub image: MediaRef,
	pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
	pub total: u64,
	pub items: Vec<SearchHit>,
	/// Ids of every media record referenced by `items`
	pub media_ids: Vec<String>,
}

/// Shapes raw matches. Matches of unknown models and of models excluded
/// from search are dropped.
pub fn prepare_search_results(
	results: ListChunk<SearchResultItem>,
	models: &[&Model],
	media_url: &str,
) -> SearchResults {
	let mut media_ids = Vec::new();
	let items = results
		.items
		.into_iter()
		.filter(|item| {
			models.iter().any(|model| model.name == item.model && !model.not_search_able)
		})
		.map(|item| {
			if let Some(image) = &item.image {
				media_ids.push(image.clone());
			}
			let src = item.image.as_deref().map(|image| url_join(media_url, image));
			SearchHit {
				id: item.id,
				title: item.title,
				description: item.description,
				image: MediaRef { id: item.image, reference: "media", src },
				url: item.url,
			}
		})
		.collect();

	SearchResults { total: results.total, items, media_ids }
}

/// Content models that take part in search: titled and not excluded
fn searchable(model: &Model) -> bool {
	model.title.is_some() && !model.not_search_able
}

/// Searches the title field of every searchable content model the principal
/// may view. Paging applies to the combined result, in model order.
pub async fn search(
	app: &App,
	principal: &Principal,
	term: &str,
	limit: u32,
	offset: u32,
) -> CtResult<SearchResults> {
	let models: Vec<&Model> = app
		.models
		.list(ModelType::Content)
		.map(|model| &**model)
		.filter(|model| searchable(model))
		.filter(|model| app.acl.is_allowed(principal, model, Permission::View))
		.collect();

	let wanted = offset.saturating_add(limit);
	let mut total = 0;
	let mut matches = Vec::new();
	for model in &models {
		let Some(prop) = model.title.clone() else { continue };
		let opts = ListOpts { search: Some(Search { prop, term: term.into() }), limit: wanted, offset: 0 };
		let chunk = app.content_adapter.list(model, &opts).await?;
		total += chunk.total;
		matches.extend(chunk.items.iter().map(|record| SearchResultItem::from_record(model, record)));
	}
	debug!(term, total, "Search");

	let items = matches.into_iter().skip(offset as usize).take(limit as usize).collect();
	Ok(prepare_search_results(ListChunk { total, items }, &models, &app.opts.media_url))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn result(id: &str, model: &str, image: Option<&str>) -> SearchResultItem {
		SearchResultItem {
			id: id.into(),
			model: model.into(),
			title: Some(format!("Title {}", id)),
			description: None,
			image: image.map(ToString::to_string),
			url: None,
		}
	}

	#[test]
	fn test_prepare_search_results() {
		let news = Model::new("news", ModelType::Content);
		let mut hidden = Model::new("internal", ModelType::Content);
		hidden.not_search_able = true;

		let results = ListChunk {
			total: 4,
			items: vec![
				result("1", "news", Some("img1")),
				result("2", "news", None),
				result("3", "internal", Some("img3")),
				result("4", "unknown", Some("img4")),
			],
		};
		let shaped = prepare_search_results(results, &[&news, &hidden], "/media/");

		assert_eq!(shaped.media_ids, vec!["img1".to_string()]);
		assert_eq!(shaped.items.len(), 2);
		assert_eq!(
			serde_json::to_value(&shaped.items[0]).unwrap(),
			json!({
				"id": "1",
				"title": "Title 1",
				"image": { "_id": "img1", "_ref": "media", "_src": "/media/img1" }
			})
		);
		assert_eq!(
			serde_json::to_value(&shaped.items[1].image).unwrap(),
			json!({ "_id": null, "_ref": "media", "_src": null })
		);
	}

	#[test]
	fn test_search_result_item_from_record() {
		let mut model = Model::new("news", ModelType::Content).title("headline");
		model.url_path = Some("/news/:slug".into());
		model.image = Some("teaser".into());

		let mut data = Data::new();
		data.insert("headline".into(), json!("Hello"));
		data.insert("slug".into(), json!("hello-world"));
		data.insert("teaser".into(), json!("abc"));
		let record = ContentRecord {
			id: "5".into(),
			rev: Rev(2),
			published_rev: None,
			date: Timestamp(0),
			author_name: "Editor".into(),
			data,
		};

		let item = SearchResultItem::from_record(&model, &record);
		assert_eq!(item.title.as_deref(), Some("Hello"));
		assert_eq!(item.image.as_deref(), Some("abc"));
		assert_eq!(item.url.as_deref(), Some("/news/hello-world"));
		assert_eq!(item.description, None);
	}
}

// vim: ts=4

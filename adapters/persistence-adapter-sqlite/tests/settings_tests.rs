//! Settings record tests
//!
//! CRUD, unique fields, listing and the referential checks on roles and users

#![allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]

use cotype::model::Model;
use cotype::persistence_adapter::SettingsAdapter;
use cotype::prelude::*;
use cotype::types::{ListOpts, Search};
use cotype_persistence_adapter_sqlite::PersistenceAdapterSqlite;
use serde_json::json;
use tempfile::TempDir;

async fn create_test_adapter() -> (PersistenceAdapterSqlite, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter =
		PersistenceAdapterSqlite::new(temp_dir.path()).await.expect("Failed to create adapter");
	(adapter, temp_dir)
}

fn model(value: serde_json::Value) -> Model {
	serde_json::from_value(value).expect("invalid model")
}

fn roles() -> Model {
	model(json!({
		"name": "roles",
		"type": "settings",
		"title": "name",
		"fields": { "name": { "type": "string", "required": true } }
	}))
}

fn users() -> Model {
	model(json!({
		"name": "users",
		"type": "settings",
		"title": "name",
		"uniqueFields": ["email"],
		"fields": {
			"name": { "type": "string" },
			"email": { "type": "string" },
			"role": { "type": "settings", "model": "roles" }
		}
	}))
}

fn data(value: serde_json::Value) -> Data {
	match value {
		serde_json::Value::Object(map) => map,
		_ => panic!("not an object"),
	}
}

#[tokio::test]
async fn test_create_and_load() {
	let (adapter, _temp) = create_test_adapter().await;
	let roles = roles();

	let id = adapter.create(&roles, &data(json!({ "name": "Editors" }))).await.unwrap();
	let record = adapter.load(&roles, &id).await.unwrap().expect("record should exist");

	assert_eq!(record.id, id);
	assert_eq!(record.data["name"], json!("Editors"));
}

#[tokio::test]
async fn test_load_unknown_or_foreign_id() {
	let (adapter, _temp) = create_test_adapter().await;
	let id = adapter.create(&roles(), &data(json!({ "name": "Editors" }))).await.unwrap();

	assert!(adapter.load(&roles(), "9999").await.unwrap().is_none());
	assert!(adapter.load(&roles(), "not-a-number").await.unwrap().is_none());
	// Ids are scoped to their model
	assert!(adapter.load(&users(), &id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_merges_data() {
	let (adapter, _temp) = create_test_adapter().await;
	let users = users();

	let id = adapter
		.create(&users, &data(json!({ "name": "Ann", "email": "ann@example.com" })))
		.await
		.unwrap();
	let record = adapter.update(&users, &id, &data(json!({ "name": "Anne" }))).await.unwrap();

	assert_eq!(record.data["name"], json!("Anne"));
	assert_eq!(record.data["email"], json!("ann@example.com"));

	let loaded = adapter.load(&users, &id).await.unwrap().unwrap();
	assert_eq!(loaded, record);
}

#[tokio::test]
async fn test_update_missing_record() {
	let (adapter, _temp) = create_test_adapter().await;
	let res = adapter.update(&roles(), "42", &data(json!({ "name": "x" }))).await;
	assert!(matches!(res, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_unique_fields() {
	let (adapter, _temp) = create_test_adapter().await;
	let users = users();

	let ann = adapter
		.create(&users, &data(json!({ "name": "Ann", "email": "ann@example.com" })))
		.await
		.unwrap();
	let res =
		adapter.create(&users, &data(json!({ "name": "Bob", "email": "ann@example.com" }))).await;
	assert!(matches!(res, Err(Error::Conflict(_))));

	let bob = adapter
		.create(&users, &data(json!({ "name": "Bob", "email": "bob@example.com" })))
		.await
		.unwrap();
	let res = adapter.update(&users, &bob, &data(json!({ "email": "ann@example.com" }))).await;
	assert!(matches!(res, Err(Error::Conflict(_))));

	// Writing back its own value is not a clash
	adapter.update(&users, &ann, &data(json!({ "email": "ann@example.com" }))).await.unwrap();
}

#[tokio::test]
async fn test_list_newest_first_with_paging() {
	let (adapter, _temp) = create_test_adapter().await;
	let roles = roles();
	for name in ["A", "B", "C"] {
		adapter.create(&roles, &data(json!({ "name": name }))).await.unwrap();
	}

	let chunk = adapter.list(&roles, &ListOpts::default()).await.unwrap();
	assert_eq!(chunk.total, 3);
	let names: Vec<_> = chunk.items.iter().map(|r| r.data["name"].clone()).collect();
	assert_eq!(names, vec![json!("C"), json!("B"), json!("A")]);

	let opts = ListOpts { limit: 1, offset: 1, ..ListOpts::default() };
	let chunk = adapter.list(&roles, &opts).await.unwrap();
	assert_eq!(chunk.total, 3);
	assert_eq!(chunk.items.len(), 1);
	assert_eq!(chunk.items[0].data["name"], json!("B"));
}

#[tokio::test]
async fn test_list_search() {
	let (adapter, _temp) = create_test_adapter().await;
	let roles = roles();
	for name in ["Editors", "Authors", "Admins"] {
		adapter.create(&roles, &data(json!({ "name": name }))).await.unwrap();
	}

	let opts = ListOpts {
		search: Some(Search { prop: "name".into(), term: "itor".into() }),
		..ListOpts::default()
	};
	let chunk = adapter.list(&roles, &opts).await.unwrap();
	assert_eq!(chunk.total, 1);
	assert_eq!(chunk.items[0].data["name"], json!("Editors"));
}

#[tokio::test]
async fn test_list_order_by() {
	let (adapter, _temp) = create_test_adapter().await;
	let mut roles = roles();
	roles.order_by = Some("name".into());
	for name in ["b", "c", "a"] {
		adapter.create(&roles, &data(json!({ "name": name }))).await.unwrap();
	}

	let chunk = adapter.list(&roles, &ListOpts::default()).await.unwrap();
	let names: Vec<_> = chunk.items.iter().map(|r| r.data["name"].clone()).collect();
	assert_eq!(names, vec![json!("a"), json!("b"), json!("c")]);
}

#[tokio::test]
async fn test_delete() {
	let (adapter, _temp) = create_test_adapter().await;
	let roles = roles();
	let id = adapter.create(&roles, &data(json!({ "name": "Editors" }))).await.unwrap();

	adapter.delete(&roles, &id).await.unwrap();
	assert!(adapter.load(&roles, &id).await.unwrap().is_none());
	assert!(matches!(adapter.delete(&roles, &id).await, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_delete_role_in_use() {
	let (adapter, _temp) = create_test_adapter().await;
	let (roles, users) = (roles(), users());

	let role = adapter.create(&roles, &data(json!({ "name": "Editors" }))).await.unwrap();
	let user = adapter
		.create(&users, &data(json!({ "name": "Ann", "email": "ann@example.com", "role": role })))
		.await
		.unwrap();

	let res = adapter.delete(&roles, &role).await;
	assert!(matches!(res, Err(Error::Conflict(_))));

	adapter.delete(&users, &user).await.unwrap();
	adapter.delete(&roles, &role).await.unwrap();
}

// vim: ts=4

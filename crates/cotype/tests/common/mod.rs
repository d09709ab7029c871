//! Shared fixtures: an app on a temporary SQLite database, principals with
//! sessions, and a request helper driving the router directly.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
	Router,
	body::Body,
	http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use cotype::model::Model;
use cotype::persistence_adapter::SettingsAdapter;
use cotype::{App, AppBuilder};
use cotype_persistence_adapter_sqlite::PersistenceAdapterSqlite;

pub struct TestApp {
	pub app: App,
	pub router: Router,
	pub adapter: Arc<PersistenceAdapterSqlite>,
	_temp: TempDir,
}

/// A user with a role and an open session
pub struct TestUser {
	pub id: String,
	pub role: String,
	pub token: String,
}

pub fn models() -> Vec<Model> {
	let models = json!([
		{
			"name": "news",
			"type": "content",
			"title": "title",
			"image": "image",
			"urlPath": "/news/:slug",
			"fields": {
				"title": { "type": "string" },
				"slug": { "type": "string", "input": "slug" },
				"image": { "type": "media" },
				"body": { "type": "richtext" }
			}
		},
		{
			"name": "startpage",
			"type": "content",
			"collection": "singleton",
			"title": "title",
			"fields": { "title": { "type": "string" } }
		},
		{
			"name": "notes",
			"type": "content",
			"versioned": false,
			"title": "title",
			"fields": { "title": { "type": "string" } }
		},
		{
			"name": "footer",
			"type": "settings",
			"fields": { "text": { "type": "string" } }
		}
	]);
	serde_json::from_value(models).expect("invalid test models")
}

pub async fn setup() -> TestApp {
	let temp = TempDir::new().expect("Failed to create temp directory");
	let adapter = Arc::new(
		PersistenceAdapterSqlite::new(temp.path()).await.expect("Failed to create adapter"),
	);

	let mut builder = AppBuilder::new();
	builder
		.models(models())
		.settings_adapter(adapter.clone())
		.content_adapter(adapter.clone())
		.principal_resolver(adapter.clone());
	let (app, router) = builder.build().await.expect("Failed to build app");

	TestApp { app, router, adapter, _temp: temp }
}

impl TestApp {
	/// Creates a role with `permissions`, a user holding it and a session
	pub async fn user(&self, email: &str, permissions: Value) -> TestUser {
		let roles = self.app.models.get(cotype::model::ModelType::Settings, "roles").unwrap();
		let users = self.app.models.get(cotype::model::ModelType::Settings, "users").unwrap();

		let role = self
			.adapter
			.create(roles, &object(json!({ "name": email, "permissions": permissions })))
			.await
			.unwrap();
		let id = self
			.adapter
			.create(users, &object(json!({ "name": email, "email": email, "role": role })))
			.await
			.unwrap();
		let token = self.adapter.create_session(&id).await.unwrap();

		TestUser { id: id.to_string(), role: role.to_string(), token }
	}

	/// A user allowed to do everything on the test models
	pub async fn admin(&self) -> TestUser {
		self.user(
			"admin@example.com",
			json!({
				"settings": true,
				"content": { "news": "publish", "startpage": "publish", "notes": "publish" }
			}),
		)
		.await
	}

	pub async fn request(
		&self,
		method: Method,
		uri: &str,
		token: Option<&str>,
		body: Option<Value>,
	) -> (StatusCode, Value) {
		let mut req = Request::builder().method(method).uri(uri);
		if let Some(token) = token {
			req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
		}
		let req = match body {
			Some(body) => req
				.header(header::CONTENT_TYPE, "application/json")
				.body(Body::from(body.to_string()))
				.unwrap(),
			None => req.body(Body::empty()).unwrap(),
		};

		let res = self.router.clone().oneshot(req).await.unwrap();
		let status = res.status();
		let bytes = res.into_body().collect().await.unwrap().to_bytes();
		let value =
			if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
		(status, value)
	}

	pub async fn get(&self, uri: &str, user: &TestUser) -> (StatusCode, Value) {
		self.request(Method::GET, uri, Some(&user.token), None).await
	}

	pub async fn post(&self, uri: &str, user: &TestUser, body: Value) -> (StatusCode, Value) {
		self.request(Method::POST, uri, Some(&user.token), Some(body)).await
	}

	pub async fn put(&self, uri: &str, user: &TestUser, body: Value) -> (StatusCode, Value) {
		self.request(Method::PUT, uri, Some(&user.token), Some(body)).await
	}

	pub async fn delete(&self, uri: &str, user: &TestUser) -> (StatusCode, Value) {
		self.request(Method::DELETE, uri, Some(&user.token), None).await
	}

	/// Creates a content record and returns its id
	pub async fn create_content(&self, model: &str, user: &TestUser, data: Value) -> String {
		let (status, body) = self
			.post(&format!("/admin/rest/content/{}", model), user, json!({ "data": data }))
			.await;
		assert_eq!(status, StatusCode::OK, "create failed: {}", body);
		body["id"].as_str().unwrap().to_string()
	}
}

pub fn object(value: Value) -> serde_json::Map<String, Value> {
	match value {
		Value::Object(map) => map,
		_ => panic!("not an object"),
	}
}

// vim: ts=4

//! SQLite-backed persistence adapter for Cotype.
//!
//! One database file holds settings records, content records with their
//! revision history, and login sessions. Record ids are integer row ids
//! rendered as strings; ids that do not parse are treated as unknown.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

mod content;
mod schema;
mod session;
mod settings;

use async_trait::async_trait;
use sqlx::{
	QueryBuilder, Sqlite,
	sqlite::{self, SqlitePool},
};
use std::path::Path;

use cotype::{
	acl::Principal,
	model::{Model, Order},
	persistence_adapter::{ContentAdapter, PrincipalResolver, SettingsAdapter, VersionItem},
	prelude::*,
	types::{ContentRecord, ListChunk, ListOpts, Record},
};

use crate::schema::init_db;

const DB_FILE: &str = "cotype.db";

// Helper functions
//******************
fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

pub(crate) fn collect_res<T>(
	iter: impl Iterator<Item = Result<T, sqlx::Error>>,
) -> CtResult<Vec<T>> {
	let mut items = Vec::new();
	for item in iter {
		items.push(item.inspect_err(inspect).map_err(|_| Error::DbError)?);
	}
	Ok(items)
}

pub(crate) fn parse_id(id: &str) -> Option<i64> {
	id.parse().ok()
}

/// JSON path of a top level property, quoted so any field name is accepted
pub(crate) fn json_path(prop: &str) -> String {
	format!("$.\"{}\"", prop.replace('"', "\\\""))
}

pub(crate) fn parse_data(json: &str) -> Result<Data, sqlx::Error> {
	serde_json::from_str(json).map_err(|err| sqlx::Error::Decode(err.into()))
}

/// Substring `LIKE` pattern matching `term` literally, used with `ESCAPE '\'`
pub(crate) fn like_pattern(term: &str) -> String {
	let mut pattern = String::with_capacity(term.len() + 2);
	pattern.push('%');
	for ch in term.chars() {
		if matches!(ch, '\\' | '%' | '_') {
			pattern.push('\\');
		}
		pattern.push(ch);
	}
	pattern.push('%');
	pattern
}

/// Appends the free-text condition of a listing, if any
pub(crate) fn push_search(query: &mut QueryBuilder<'_, Sqlite>, column: &str, opts: &ListOpts) {
	if let Some(search) = &opts.search {
		query.push(format!(" AND json_extract({}, ", column));
		query.push_bind(json_path(&search.prop));
		query.push(") LIKE ");
		query.push_bind(like_pattern(&search.term));
		query.push(" ESCAPE '\\'");
	}
}

/// Appends ORDER BY, LIMIT and OFFSET of a listing
pub(crate) fn push_order(
	query: &mut QueryBuilder<'_, Sqlite>,
	column: &str,
	id_column: &str,
	model: &Model,
	opts: &ListOpts,
) {
	if let Some(order_by) = &model.order_by {
		query.push(format!(" ORDER BY json_extract({}, ", column));
		query.push_bind(json_path(order_by));
		match model.order.unwrap_or(Order::Asc) {
			Order::Asc => query.push(") ASC, "),
			Order::Desc => query.push(") DESC, "),
		};
		query.push(format!("{} DESC", id_column));
	} else {
		query.push(format!(" ORDER BY {} DESC", id_column));
	}
	query.push(" LIMIT ").push_bind(i64::from(opts.limit));
	query.push(" OFFSET ").push_bind(i64::from(opts.offset));
}

#[derive(Debug)]
pub struct PersistenceAdapterSqlite {
	db: SqlitePool,
}

impl PersistenceAdapterSqlite {
	/// Opens (or creates) the database in `dir`
	pub async fn new(dir: impl AsRef<Path>) -> CtResult<Self> {
		tokio::fs::create_dir_all(dir.as_ref()).await?;

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(dir.as_ref().join(DB_FILE))
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;

		init_db(&db).await.inspect_err(inspect).map_err(|_| Error::DbError)?;
		info!("Persistence database opened in {}", dir.as_ref().display());

		Ok(Self { db })
	}

	/// Issues a new session token for a user. Only the token's hash is stored.
	pub async fn create_session(&self, user_id: &str) -> CtResult<String> {
		session::create(&self.db, user_id).await
	}

	/// Revokes a single session
	pub async fn delete_session(&self, token: &str) -> CtResult<()> {
		session::delete(&self.db, token).await
	}
}

#[async_trait]
impl SettingsAdapter for PersistenceAdapterSqlite {
	async fn list(&self, model: &Model, opts: &ListOpts) -> CtResult<ListChunk<Record>> {
		settings::list(&self.db, model, opts).await
	}

	async fn create(&self, model: &Model, data: &Data) -> CtResult<RecordId> {
		settings::create(&self.db, model, data).await
	}

	async fn load(&self, model: &Model, id: &str) -> CtResult<Option<Record>> {
		settings::load(&self.db, model, id).await
	}

	async fn update(&self, model: &Model, id: &str, data: &Data) -> CtResult<Record> {
		settings::update(&self.db, model, id, data).await
	}

	async fn delete(&self, model: &Model, id: &str) -> CtResult<()> {
		settings::delete(&self.db, model, id).await
	}
}

#[async_trait]
impl ContentAdapter for PersistenceAdapterSqlite {
	async fn list(&self, model: &Model, opts: &ListOpts) -> CtResult<ListChunk<ContentRecord>> {
		content::list(&self.db, model, opts).await
	}

	async fn create(
		&self,
		model: &Model,
		author: &Principal,
		data: &Data,
	) -> CtResult<ContentRecord> {
		content::create(&self.db, model, author, data).await
	}

	async fn load(&self, model: &Model, id: &str) -> CtResult<Option<ContentRecord>> {
		content::load(&self.db, model, id).await
	}

	async fn update(
		&self,
		model: &Model,
		author: &Principal,
		id: &str,
		data: &Data,
	) -> CtResult<ContentRecord> {
		content::update(&self.db, model, author, id, data).await
	}

	async fn delete(&self, model: &Model, id: &str) -> CtResult<()> {
		content::delete(&self.db, model, id).await
	}

	async fn list_versions(&self, model: &Model, id: &str) -> CtResult<Option<Vec<VersionItem>>> {
		content::list_versions(&self.db, model, id).await
	}

	async fn get_published_revision(&self, model: &Model, id: &str) -> CtResult<Option<Rev>> {
		content::get_published_revision(&self.db, model, id).await
	}

	async fn set_published_revision(
		&self,
		model: &Model,
		id: &str,
		rev: Option<Rev>,
	) -> CtResult<bool> {
		content::set_published_revision(&self.db, model, id, rev).await
	}
}

#[async_trait]
impl PrincipalResolver for PersistenceAdapterSqlite {
	async fn resolve(&self, token: &str) -> CtResult<Principal> {
		session::resolve(&self.db, token).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_json_path_quotes_property() {
		assert_eq!(json_path("title"), "$.\"title\"");
		assert_eq!(json_path("a\"b"), "$.\"a\\\"b\"");
	}

	#[test]
	fn test_like_pattern_escapes_wildcards() {
		assert_eq!(like_pattern("rust"), "%rust%");
		assert_eq!(like_pattern("100%"), "%100\\%%");
		assert_eq!(like_pattern("a_b\\c"), "%a\\_b\\\\c%");
	}

	#[test]
	fn test_parse_id_rejects_garbage() {
		assert_eq!(parse_id("42"), Some(42));
		assert_eq!(parse_id("abc"), None);
		assert_eq!(parse_id(""), None);
	}
}

// vim: ts=4

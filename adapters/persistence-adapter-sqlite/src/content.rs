//! Content records and their revision history
//!
//! A content record is a row in `contents` carrying the published pointer,
//! its data lives in `content_revisions`, one row per revision. Revision
//! numbers start at 1 and are allocated inside the inserting statement.

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use cotype::{
	acl::Principal,
	model::Model,
	persistence_adapter::VersionItem,
	prelude::*,
	types::{ContentRecord, ListChunk, ListOpts},
};

use crate::{collect_res, inspect, parse_data, parse_id, push_order, push_search};

const LATEST_REVISION_JOIN: &str = "FROM contents c
	JOIN content_revisions r ON r.content_id = c.id
		AND r.rev = (SELECT MAX(rev) FROM content_revisions WHERE content_id = c.id)";

fn content_from_row(row: &SqliteRow) -> Result<ContentRecord, sqlx::Error> {
	let id: i64 = row.try_get("id")?;
	let published_rev: Option<i64> = row.try_get("published_rev")?;
	let author_name: Option<String> = row.try_get("author_name")?;
	let data: &str = row.try_get("data")?;
	Ok(ContentRecord {
		id: id.to_string().into(),
		rev: Rev(row.try_get("rev")?),
		published_rev: published_rev.map(Rev),
		date: Timestamp(row.try_get("created_at")?),
		author_name: author_name.unwrap_or_default().into(),
		data: parse_data(data)?,
	})
}

pub(crate) async fn list(
	db: &SqlitePool,
	model: &Model,
	opts: &ListOpts,
) -> CtResult<ListChunk<ContentRecord>> {
	let mut query = sqlx::QueryBuilder::new("SELECT COUNT(*) AS total ");
	query.push(LATEST_REVISION_JOIN).push(" WHERE c.model = ");
	query.push_bind(model.name.as_ref());
	push_search(&mut query, "r.data", opts);
	let total: i64 = query
		.build()
		.fetch_one(db)
		.await
		.and_then(|row| row.try_get("total"))
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	let mut query = sqlx::QueryBuilder::new(
		"SELECT c.id, c.published_rev, r.rev, r.data, r.author_name, r.created_at ",
	);
	query.push(LATEST_REVISION_JOIN).push(" WHERE c.model = ");
	query.push_bind(model.name.as_ref());
	push_search(&mut query, "r.data", opts);
	push_order(&mut query, "r.data", "c.id", model, opts);
	let rows = query
		.build()
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(ListChunk {
		total: u64::try_from(total).unwrap_or_default(),
		items: collect_res(rows.iter().map(content_from_row))?,
	})
}

pub(crate) async fn create(
	db: &SqlitePool,
	model: &Model,
	author: &Principal,
	data: &Data,
) -> CtResult<ContentRecord> {
	let json = serde_json::to_string(data)?;
	let now = Timestamp::now();
	let mut tx = db.begin().await.inspect_err(inspect).map_err(|_| Error::DbError)?;

	// Singletons: check and insert in one statement
	let row = if model.is_singleton() {
		sqlx::query(
			"INSERT INTO contents (model) SELECT ?1
			WHERE NOT EXISTS (SELECT 1 FROM contents WHERE model = ?1)
			RETURNING id",
		)
		.bind(model.name.as_ref())
		.fetch_optional(&mut *tx)
		.await
	} else {
		sqlx::query("INSERT INTO contents (model) VALUES (?) RETURNING id")
			.bind(model.name.as_ref())
			.fetch_optional(&mut *tx)
			.await
	}
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;
	let Some(row) = row else {
		return Err(Error::Conflict(format!(
			"The singleton model '{}' already has a record",
			model.name
		)));
	};
	let id: i64 = row.try_get("id").inspect_err(inspect).map_err(|_| Error::DbError)?;

	sqlx::query(
		"INSERT INTO content_revisions (content_id, rev, data, author_id, author_name, created_at)
		VALUES (?, 1, ?, ?, ?, ?)",
	)
	.bind(id)
	.bind(json)
	.bind(author.id.as_ref())
	.bind(author.name.as_ref())
	.bind(now.0)
	.execute(&mut *tx)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	tx.commit().await.inspect_err(inspect).map_err(|_| Error::DbError)?;
	debug!("Created {} #{}", model.name, id);

	Ok(ContentRecord {
		id: id.to_string().into(),
		rev: Rev(1),
		published_rev: None,
		date: now,
		author_name: author.name.clone(),
		data: data.clone(),
	})
}

pub(crate) async fn load(
	db: &SqlitePool,
	model: &Model,
	id: &str,
) -> CtResult<Option<ContentRecord>> {
	let Some(id) = parse_id(id) else { return Ok(None) };

	let sql = format!(
		"SELECT c.id, c.published_rev, r.rev, r.data, r.author_name, r.created_at {}
		WHERE c.id = ? AND c.model = ?",
		LATEST_REVISION_JOIN
	);
	let row = sqlx::query(&sql)
		.bind(id)
		.bind(model.name.as_ref())
		.fetch_optional(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	row.as_ref()
		.map(content_from_row)
		.transpose()
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)
}

pub(crate) async fn update(
	db: &SqlitePool,
	model: &Model,
	author: &Principal,
	id: &str,
	data: &Data,
) -> CtResult<ContentRecord> {
	let id = parse_id(id).ok_or(Error::NotFound)?;
	let now = Timestamp::now();
	let mut tx = db.begin().await.inspect_err(inspect).map_err(|_| Error::DbError)?;

	let sql = format!(
		"SELECT c.id, c.published_rev, r.rev, r.data, r.author_name, r.created_at {}
		WHERE c.id = ? AND c.model = ?",
		LATEST_REVISION_JOIN
	);
	let row = sqlx::query(&sql)
		.bind(id)
		.bind(model.name.as_ref())
		.fetch_optional(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?
		.ok_or(Error::NotFound)?;
	let mut content = content_from_row(&row).inspect_err(inspect).map_err(|_| Error::DbError)?;

	for (key, value) in data {
		content.data.insert(key.clone(), value.clone());
	}

	let rev: i64 = sqlx::query(
		"INSERT INTO content_revisions (content_id, rev, data, author_id, author_name, created_at)
		SELECT ?1, COALESCE(MAX(rev), 0) + 1, ?2, ?3, ?4, ?5 FROM content_revisions WHERE content_id = ?1
		RETURNING rev",
	)
	.bind(id)
	.bind(serde_json::to_string(&content.data)?)
	.bind(author.id.as_ref())
	.bind(author.name.as_ref())
	.bind(now.0)
	.fetch_one(&mut *tx)
	.await
	.and_then(|row| row.try_get("rev"))
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	tx.commit().await.inspect_err(inspect).map_err(|_| Error::DbError)?;
	debug!("Updated {} #{} to rev {}", model.name, id, rev);

	content.rev = Rev(rev);
	content.date = now;
	content.author_name = author.name.clone();
	Ok(content)
}

pub(crate) async fn delete(db: &SqlitePool, model: &Model, id: &str) -> CtResult<()> {
	let id = parse_id(id).ok_or(Error::NotFound)?;
	let mut tx = db.begin().await.inspect_err(inspect).map_err(|_| Error::DbError)?;

	let res = sqlx::query("DELETE FROM contents WHERE id = ? AND model = ?")
		.bind(id)
		.bind(model.name.as_ref())
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}

	sqlx::query("DELETE FROM content_revisions WHERE content_id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	tx.commit().await.inspect_err(inspect).map_err(|_| Error::DbError)?;
	Ok(())
}

async fn exists(db: &SqlitePool, model: &Model, id: i64) -> CtResult<bool> {
	let row = sqlx::query("SELECT id FROM contents WHERE id = ? AND model = ?")
		.bind(id)
		.bind(model.name.as_ref())
		.fetch_optional(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
	Ok(row.is_some())
}

pub(crate) async fn list_versions(
	db: &SqlitePool,
	model: &Model,
	id: &str,
) -> CtResult<Option<Vec<VersionItem>>> {
	let Some(id) = parse_id(id) else { return Ok(None) };
	if !exists(db, model, id).await? {
		return Ok(None);
	}

	let rows = sqlx::query(
		"SELECT rev, created_at, author_name FROM content_revisions WHERE content_id = ? ORDER BY rev",
	)
	.bind(id)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	let versions = collect_res(rows.iter().map(|row| -> Result<VersionItem, sqlx::Error> {
		let author_name: Option<String> = row.try_get("author_name")?;
		Ok(VersionItem {
			rev: Rev(row.try_get("rev")?),
			date: Timestamp(row.try_get("created_at")?),
			author_name: author_name.unwrap_or_default().into(),
		})
	}))?;
	Ok(Some(versions))
}

pub(crate) async fn get_published_revision(
	db: &SqlitePool,
	model: &Model,
	id: &str,
) -> CtResult<Option<Rev>> {
	let id = parse_id(id).ok_or(Error::NotFound)?;

	let row = sqlx::query("SELECT published_rev FROM contents WHERE id = ? AND model = ?")
		.bind(id)
		.bind(model.name.as_ref())
		.fetch_optional(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?
		.ok_or(Error::NotFound)?;

	let rev: Option<i64> =
		row.try_get("published_rev").inspect_err(inspect).map_err(|_| Error::DbError)?;
	Ok(rev.map(Rev))
}

/// Moves the published pointer in one statement. Setting is guarded by the
/// existence of the revision, so a concurrent delete can not leave a
/// dangling pointer behind.
pub(crate) async fn set_published_revision(
	db: &SqlitePool,
	model: &Model,
	id: &str,
	rev: Option<Rev>,
) -> CtResult<bool> {
	let Some(id) = parse_id(id) else { return Ok(false) };

	let res = if let Some(rev) = rev {
		sqlx::query(
			"UPDATE contents SET published_rev = ?1 WHERE id = ?2 AND model = ?3
			AND EXISTS (SELECT 1 FROM content_revisions WHERE content_id = ?2 AND rev = ?1)",
		)
		.bind(rev.0)
		.bind(id)
		.bind(model.name.as_ref())
		.execute(db)
		.await
	} else {
		sqlx::query("UPDATE contents SET published_rev = NULL WHERE id = ? AND model = ?")
			.bind(id)
			.bind(model.name.as_ref())
			.execute(db)
			.await
	}
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(res.rows_affected() > 0)
}

// vim: ts=4

//! Settings records
//!
//! Each record is one row holding the JSON data of a settings model
//! (roles, users, and any custom settings models).

use sqlx::{Row, SqliteConnection, SqlitePool, sqlite::SqliteRow};

use cotype::{
	model::{Model, ROLES_MODEL, USERS_MODEL},
	prelude::*,
	types::{ListChunk, ListOpts, Record},
};

use crate::{collect_res, inspect, json_path, parse_data, parse_id, push_order, push_search};

fn record_from_row(row: &SqliteRow) -> Result<Record, sqlx::Error> {
	let id: i64 = row.try_get("id")?;
	let data: &str = row.try_get("data")?;
	Ok(Record { id: id.to_string().into(), data: parse_data(data)? })
}

/// Fails with a conflict if a unique field value of `data` is already used
/// by another record of the model
async fn check_unique(
	conn: &mut SqliteConnection,
	model: &Model,
	data: &Data,
	exclude_id: Option<i64>,
) -> CtResult<()> {
	for field in model.unique_field_names() {
		let Some(value) = data.get(field).filter(|value| !value.is_null()) else {
			continue;
		};
		let row = sqlx::query(
			"SELECT id FROM settings WHERE model = ? AND json_extract(data, ?) = json_extract(?, '$')
			AND id != ? LIMIT 1",
		)
		.bind(model.name.as_ref())
		.bind(json_path(field))
		.bind(value.to_string())
		.bind(exclude_id.unwrap_or(-1))
		.fetch_optional(&mut *conn)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

		if row.is_some() {
			debug!("Unique value clash on {}.{}", model.name, field);
			return Err(Error::Conflict(format!("The value of '{}' is already in use", field)));
		}
	}
	Ok(())
}

pub(crate) async fn list(
	db: &SqlitePool,
	model: &Model,
	opts: &ListOpts,
) -> CtResult<ListChunk<Record>> {
	let mut query = sqlx::QueryBuilder::new("SELECT COUNT(*) AS total FROM settings WHERE model = ");
	query.push_bind(model.name.as_ref());
	push_search(&mut query, "data", opts);
	let total: i64 = query
		.build()
		.fetch_one(db)
		.await
		.and_then(|row| row.try_get("total"))
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	let mut query = sqlx::QueryBuilder::new("SELECT id, data FROM settings WHERE model = ");
	query.push_bind(model.name.as_ref());
	push_search(&mut query, "data", opts);
	push_order(&mut query, "data", "id", model, opts);
	let rows = query
		.build()
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(ListChunk {
		total: u64::try_from(total).unwrap_or_default(),
		items: collect_res(rows.iter().map(record_from_row))?,
	})
}

pub(crate) async fn create(db: &SqlitePool, model: &Model, data: &Data) -> CtResult<RecordId> {
	let json = serde_json::to_string(data)?;
	let mut tx = db.begin().await.inspect_err(inspect).map_err(|_| Error::DbError)?;

	check_unique(&mut tx, model, data, None).await?;
	let id: i64 = sqlx::query("INSERT INTO settings (model, data) VALUES (?, ?) RETURNING id")
		.bind(model.name.as_ref())
		.bind(json)
		.fetch_one(&mut *tx)
		.await
		.and_then(|row| row.try_get("id"))
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	tx.commit().await.inspect_err(inspect).map_err(|_| Error::DbError)?;
	Ok(id.to_string().into())
}

pub(crate) async fn load(db: &SqlitePool, model: &Model, id: &str) -> CtResult<Option<Record>> {
	let Some(id) = parse_id(id) else { return Ok(None) };

	let row = sqlx::query("SELECT id, data FROM settings WHERE id = ? AND model = ?")
		.bind(id)
		.bind(model.name.as_ref())
		.fetch_optional(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	row.as_ref()
		.map(record_from_row)
		.transpose()
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)
}

pub(crate) async fn update(
	db: &SqlitePool,
	model: &Model,
	id: &str,
	data: &Data,
) -> CtResult<Record> {
	let id = parse_id(id).ok_or(Error::NotFound)?;
	let mut tx = db.begin().await.inspect_err(inspect).map_err(|_| Error::DbError)?;

	let row = sqlx::query("SELECT id, data FROM settings WHERE id = ? AND model = ?")
		.bind(id)
		.bind(model.name.as_ref())
		.fetch_optional(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?
		.ok_or(Error::NotFound)?;
	let mut record = record_from_row(&row).inspect_err(inspect).map_err(|_| Error::DbError)?;

	for (key, value) in data {
		record.data.insert(key.clone(), value.clone());
	}
	check_unique(&mut tx, model, &record.data, Some(id)).await?;

	sqlx::query("UPDATE settings SET data = ?, updated_at = unixepoch() WHERE id = ?")
		.bind(serde_json::to_string(&record.data)?)
		.bind(id)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	tx.commit().await.inspect_err(inspect).map_err(|_| Error::DbError)?;
	Ok(record)
}

pub(crate) async fn delete(db: &SqlitePool, model: &Model, id: &str) -> CtResult<()> {
	let id = parse_id(id).ok_or(Error::NotFound)?;
	let mut tx = db.begin().await.inspect_err(inspect).map_err(|_| Error::DbError)?;

	if model.name.as_ref() == ROLES_MODEL {
		let users: i64 = sqlx::query(
			"SELECT COUNT(*) AS n FROM settings
			WHERE model = ? AND CAST(json_extract(data, '$.role') AS TEXT) = ?",
		)
		.bind(USERS_MODEL)
		.bind(id.to_string())
		.fetch_one(&mut *tx)
		.await
		.and_then(|row| row.try_get("n"))
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

		if users > 0 {
			return Err(Error::Conflict(format!(
				"The role is still assigned to {} user(s)",
				users
			)));
		}
	}

	let res = sqlx::query("DELETE FROM settings WHERE id = ? AND model = ?")
		.bind(id)
		.bind(model.name.as_ref())
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}

	if model.name.as_ref() == USERS_MODEL {
		sqlx::query("DELETE FROM sessions WHERE user_id = ?")
			.bind(id)
			.execute(&mut *tx)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
	}

	tx.commit().await.inspect_err(inspect).map_err(|_| Error::DbError)?;
	Ok(())
}

// vim: ts=4

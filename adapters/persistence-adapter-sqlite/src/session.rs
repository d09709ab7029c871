//! Login sessions
//!
//! Sessions map the hash of a bearer token to a user record. The principal is
//! assembled on every lookup, so role changes apply to open sessions at once.

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use cotype::{
	acl::{Permissions, Principal},
	model::{ROLES_MODEL, USERS_MODEL},
	prelude::*,
	utils::{hash_token, random_id},
};

use crate::{inspect, parse_data, parse_id};

fn principal_from_row(row: &SqliteRow) -> Result<Principal, sqlx::Error> {
	let id: i64 = row.try_get("id")?;
	let user = parse_data(row.try_get("user_data")?)?;
	let role_id: Option<i64> = row.try_get("role_id")?;
	let role_data: Option<&str> = row.try_get("role_data")?;
	let permissions = match role_data {
		Some(role_data) => {
			let role = parse_data(role_data)?;
			role.get("permissions").map(Permissions::from_value).unwrap_or_default()
		}
		None => Permissions::default(),
	};
	let name = user
		.get("name")
		.or_else(|| user.get("email"))
		.and_then(serde_json::Value::as_str)
		.unwrap_or_default();

	Ok(Principal {
		id: id.to_string().into(),
		name: name.into(),
		role: role_id.map(|id| id.to_string()).unwrap_or_default().into(),
		permissions,
	})
}

pub(crate) async fn create(db: &SqlitePool, user_id: &str) -> CtResult<String> {
	let user_id = parse_id(user_id).ok_or(Error::NotFound)?;

	let user = sqlx::query("SELECT id FROM settings WHERE id = ? AND model = ?")
		.bind(user_id)
		.bind(USERS_MODEL)
		.fetch_optional(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
	if user.is_none() {
		return Err(Error::NotFound);
	}

	let token = format!("{}{}", random_id(), random_id());
	sqlx::query("INSERT INTO sessions (token_hash, user_id) VALUES (?, ?)")
		.bind(hash_token(&token).as_ref())
		.bind(user_id)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	info!("Session created for user #{}", user_id);
	Ok(token)
}

pub(crate) async fn delete(db: &SqlitePool, token: &str) -> CtResult<()> {
	sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
		.bind(hash_token(token).as_ref())
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
	Ok(())
}

pub(crate) async fn resolve(db: &SqlitePool, token: &str) -> CtResult<Principal> {
	let row = sqlx::query(
		"SELECT u.id, u.data AS user_data, r.id AS role_id, r.data AS role_data
		FROM sessions s
		JOIN settings u ON u.id = s.user_id AND u.model = ?
		LEFT JOIN settings r ON r.model = ?
			AND CAST(r.id AS TEXT) = CAST(json_extract(u.data, '$.role') AS TEXT)
		WHERE s.token_hash = ?",
	)
	.bind(USERS_MODEL)
	.bind(ROLES_MODEL)
	.bind(hash_token(token).as_ref())
	.fetch_optional(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?
	.ok_or(Error::Unauthorized)?;

	let principal = principal_from_row(&row).inspect_err(inspect).map_err(|_| Error::DbError)?;

	debug!("Resolved session of user #{}", principal.id);
	Ok(principal)
}

// vim: ts=4

//! Database schema initialization

use sqlx::SqlitePool;

/// Initialize the database schema with all required tables and indexes
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Settings records
	//******************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS settings (
		id integer PRIMARY KEY AUTOINCREMENT,
		model text NOT NULL,
		data json NOT NULL,
		created_at datetime DEFAULT (unixepoch()),
		updated_at datetime DEFAULT (unixepoch())
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_settings_model ON settings(model)")
		.execute(&mut *tx)
		.await?;

	// Content records
	//*****************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS contents (
		id integer PRIMARY KEY AUTOINCREMENT,
		model text NOT NULL,
		published_rev integer,
		created_at datetime DEFAULT (unixepoch())
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_contents_model ON contents(model)")
		.execute(&mut *tx)
		.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS content_revisions (
		content_id integer NOT NULL,
		rev integer NOT NULL,
		data json NOT NULL,
		author_id text,
		author_name text,
		created_at datetime NOT NULL,
		PRIMARY KEY(content_id, rev)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Sessions
	//**********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS sessions (
		token_hash text NOT NULL,
		user_id integer NOT NULL,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(token_hash)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)")
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;

	Ok(())
}

// vim: ts=4

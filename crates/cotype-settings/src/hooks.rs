//! Business rules of the built-in `users` and `roles` models

use cotype_core::hooks::{BoxFuture, HookRegistry};
use cotype_core::models::{ROLES_MODEL, USERS_MODEL};
use cotype_types::acl::Principal;
use cotype_types::model::ModelType;
use cotype_types::utils::{join_natural, missing_fields};

use crate::prelude::*;

pub const BCRYPT_COST: u32 = 10;

/// Field holding the cleartext password in requests
pub const NEW_PASSWORD_FIELD: &str = "newPassword";
/// Field holding the password hash in storage
pub const PASSWORD_FIELD: &str = "password";

const USER_REQUIRED_FIELDS: &[(&str, &str)] =
	&[("email", "email"), ("role", "role"), (NEW_PASSWORD_FIELD, "password")];

pub fn register_hooks(registry: &mut HookRegistry) {
	registry
		.before_create(ModelType::Settings, USERS_MODEL, require_user_fields)
		.before_create(ModelType::Settings, USERS_MODEL, hash_new_password)
		.before_update(ModelType::Settings, USERS_MODEL, hash_new_password)
		.before_delete(ModelType::Settings, USERS_MODEL, forbid_own_account)
		.before_delete(ModelType::Settings, ROLES_MODEL, forbid_own_role);
}

fn require_user_fields<'a>(
	_principal: &'a Principal,
	data: &'a mut Data,
) -> BoxFuture<'a, CtResult<()>> {
	Box::pin(async move {
		let missing = missing_fields(data, USER_REQUIRED_FIELDS);
		if missing.is_empty() {
			return Ok(());
		}
		Err(Error::Conflict(format!(
			"Following fields are missing in order to create a new user: {}!",
			join_natural(&missing)
		)))
	})
}

fn generate_password_hash_sync(password: &str) -> CtResult<Box<str>> {
	let hash = bcrypt::hash(password, BCRYPT_COST)
		.map_err(|err| Error::Internal(format!("password hashing failed: {}", err)))?;
	Ok(hash.into())
}

/// Replaces `newPassword` with its bcrypt hash under `password`
fn hash_new_password<'a>(
	_principal: &'a Principal,
	data: &'a mut Data,
) -> BoxFuture<'a, CtResult<()>> {
	Box::pin(async move {
		// clients may send a stored hash back, it is never accepted
		data.remove(PASSWORD_FIELD);
		let Some(password) = data.remove(NEW_PASSWORD_FIELD) else {
			return Ok(());
		};
		let Some(password) = password.as_str().filter(|p| !p.is_empty()).map(ToString::to_string)
		else {
			return Ok(());
		};

		let hash = tokio::task::spawn_blocking(move || generate_password_hash_sync(&password))
			.await
			.map_err(|err| Error::Internal(format!("password hashing task failed: {}", err)))??;
		data.insert(PASSWORD_FIELD.into(), serde_json::Value::String(hash.into()));
		Ok(())
	})
}

fn forbid_own_account<'a>(principal: &'a Principal, id: &'a str) -> BoxFuture<'a, CtResult<()>> {
	Box::pin(async move {
		if principal.id.as_ref() == id {
			warn!(principal = %principal.id, "Refused to delete own account");
			return Err(Error::Conflict("You cannot delete your own account! Sorry.".into()));
		}
		Ok(())
	})
}

fn forbid_own_role<'a>(principal: &'a Principal, id: &'a str) -> BoxFuture<'a, CtResult<()>> {
	Box::pin(async move {
		if principal.role.as_ref() == id {
			warn!(principal = %principal.id, role = id, "Refused to delete own role");
			return Err(Error::Conflict(
				"You cannot delete a role which is assigned to your account! That would make no sense."
					.into(),
			));
		}
		Ok(())
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use cotype_types::acl::Permissions;
	use serde_json::json;

	fn principal() -> Principal {
		Principal {
			id: "3".into(),
			name: "Admin".into(),
			role: "1".into(),
			permissions: Permissions { settings: true, ..Permissions::default() },
		}
	}

	fn data(value: serde_json::Value) -> Data {
		match value {
			serde_json::Value::Object(map) => map,
			_ => Data::new(),
		}
	}

	fn conflict_message(res: CtResult<()>) -> String {
		match res {
			Err(Error::Conflict(msg)) => msg,
			other => format!("unexpected: {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_missing_email_and_role() {
		let mut data = data(json!({ "name": "Jane", "newPassword": "secret" }));
		let msg = conflict_message(require_user_fields(&principal(), &mut data).await);
		assert_eq!(
			msg,
			"Following fields are missing in order to create a new user: email and role!"
		);
	}

	#[tokio::test]
	async fn test_missing_password_only() {
		let mut data = data(json!({ "email": "jane@example.com", "role": "1" }));
		let msg = conflict_message(require_user_fields(&principal(), &mut data).await);
		assert!(msg.ends_with(": password!"), "{}", msg);
	}

	#[tokio::test]
	async fn test_missing_everything() {
		let mut data = Data::new();
		let msg = conflict_message(require_user_fields(&principal(), &mut data).await);
		assert!(msg.ends_with("email, role and password!"), "{}", msg);
	}

	#[tokio::test]
	async fn test_new_password_is_hashed() {
		let mut data = data(json!({ "email": "a@b.c", "newPassword": "secret" }));
		hash_new_password(&principal(), &mut data).await.unwrap();

		assert!(!data.contains_key(NEW_PASSWORD_FIELD));
		let hash = data.get(PASSWORD_FIELD).and_then(|v| v.as_str()).unwrap();
		assert!(bcrypt::verify("secret", hash).unwrap());
	}

	#[tokio::test]
	async fn test_empty_new_password_keeps_stored_one() {
		let mut data = data(json!({ "newPassword": "", "password": "forged" }));
		hash_new_password(&principal(), &mut data).await.unwrap();
		assert!(data.is_empty());
	}

	#[tokio::test]
	async fn test_self_delete_guards() {
		let principal = principal();
		assert!(forbid_own_account(&principal, "3").await.is_err());
		assert!(forbid_own_account(&principal, "4").await.is_ok());
		assert!(forbid_own_role(&principal, "1").await.is_err());
		assert!(forbid_own_role(&principal, "2").await.is_ok());
	}
}

// vim: ts=4

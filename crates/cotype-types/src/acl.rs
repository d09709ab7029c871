//! Principals, permissions and the access control contract.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;

use crate::model::Model;
use crate::prelude::*;

/// Capability on a model. Ordered: `View < Edit < Publish`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
	View,
	Edit,
	Publish,
}

impl Permission {
	pub fn parse(name: &str) -> Option<Permission> {
		match name {
			"view" => Some(Permission::View),
			"edit" => Some(Permission::Edit),
			"publish" => Some(Permission::Publish),
			_ => None,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Permission::View => "view",
			Permission::Edit => "edit",
			Permission::Publish => "publish",
		}
	}
}

/// Permissions granted by a role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
	#[serde(default)]
	pub settings: bool,
	#[serde(default)]
	pub content: HashMap<Box<str>, Permission>,
}

impl Permissions {
	/// Reads the `permissions` object of a role record. Entries with an
	/// unknown permission name are skipped.
	pub fn from_value(value: &serde_json::Value) -> Permissions {
		let settings = value.get("settings").and_then(serde_json::Value::as_bool).unwrap_or(false);
		let content = value
			.get("content")
			.and_then(serde_json::Value::as_object)
			.map(|content| {
				content
					.iter()
					.filter_map(|(model, perm)| {
						let perm = Permission::parse(perm.as_str()?)?;
						Some((Box::from(model.as_str()), perm))
					})
					.collect()
			})
			.unwrap_or_default();
		Permissions { settings, content }
	}

	pub fn content_permission(&self, model: &str) -> Option<Permission> {
		self.content.get(model).copied()
	}
}

/// The authenticated actor of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
	pub id: RecordId,
	pub name: Box<str>,
	/// Id of the principal's role record
	pub role: RecordId,
	pub permissions: Permissions,
}

/// Decides whether a principal may perform an operation on a model.
///
/// Implementations must be pure: no I/O, no caching across calls.
pub trait AccessControl: Debug + Send + Sync {
	fn is_allowed(&self, principal: &Principal, model: &Model, permission: Permission) -> bool;

	/// Same as `is_allowed`, but unknown permission names are never allowed
	fn is_allowed_by_name(&self, principal: &Principal, model: &Model, permission: &str) -> bool {
		Permission::parse(permission).is_some_and(|perm| self.is_allowed(principal, model, perm))
	}

	fn check(&self, principal: &Principal, model: &Model, permission: Permission) -> CtResult<()> {
		if self.is_allowed(principal, model, permission) {
			Ok(())
		} else {
			debug!(
				principal = %principal.id,
				model = %model.name,
				permission = permission.as_str(),
				"Permission denied"
			);
			Err(Error::PermissionDenied)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_permission_order() {
		assert!(Permission::View < Permission::Edit);
		assert!(Permission::Edit < Permission::Publish);
		assert_eq!(Permission::parse("publish"), Some(Permission::Publish));
		assert_eq!(Permission::parse("admin"), None);
	}

	#[test]
	fn test_permissions_from_role_value() {
		let perms = Permissions::from_value(&json!({
			"settings": true,
			"content": { "news": "publish", "pages": "edit", "bogus": "everything" }
		}));
		assert!(perms.settings);
		assert_eq!(perms.content_permission("news"), Some(Permission::Publish));
		assert_eq!(perms.content_permission("pages"), Some(Permission::Edit));
		assert_eq!(perms.content_permission("bogus"), None);
	}

	#[test]
	fn test_permissions_from_missing_value() {
		let perms = Permissions::from_value(&serde_json::Value::Null);
		assert_eq!(perms, Permissions::default());
	}
}

// vim: ts=4

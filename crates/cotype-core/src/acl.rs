//! Role based access control policy.

use cotype_types::acl::{AccessControl, Permission, Principal};
use cotype_types::model::{Model, ModelType};

/// Decides from the permissions of the principal's role.
///
/// - settings models: `permissions.settings`
/// - content models: the role's permission on the model must reach the
///   requested one (`view < edit < publish`)
/// - media: view and edit for anyone who may edit some content, never publish
#[derive(Debug, Default, Clone, Copy)]
pub struct RolePolicy;

impl AccessControl for RolePolicy {
	fn is_allowed(&self, principal: &Principal, model: &Model, permission: Permission) -> bool {
		let perms = &principal.permissions;
		match model.typ {
			ModelType::Settings => perms.settings,
			ModelType::Content => {
				perms.content_permission(&model.name).is_some_and(|granted| granted >= permission)
			}
			ModelType::Media => {
				permission <= Permission::Edit
					&& perms.content.values().any(|granted| *granted >= Permission::Edit)
			}
		}
	}
}


// vim: ts=4

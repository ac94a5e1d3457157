//! Well-known roles and the permissions each one is granted.
//!
//! Role names must match the seed data in the `roles` table migration.

use crate::error::CoreError;
use crate::permissions::{
    academic_years, activity, calls, documents, events, news, newsletter, programs, resolutions,
    settings, translations, ALL,
};

pub const ROLE_SUPER_ADMIN: &str = "super-admin";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_VIEWER: &str = "viewer";

/// Editors manage content but cannot delete it, and cannot touch users,
/// settings or the audit trail beyond reading it.
const EDITOR_PERMISSIONS: &[&str] = &[
    programs::VIEW,
    programs::CREATE,
    programs::EDIT,
    academic_years::VIEW,
    calls::VIEW,
    calls::CREATE,
    calls::EDIT,
    resolutions::VIEW,
    resolutions::CREATE,
    resolutions::EDIT,
    news::VIEW,
    news::CREATE,
    news::EDIT,
    news::PUBLISH,
    documents::VIEW,
    documents::CREATE,
    documents::EDIT,
    events::VIEW,
    events::CREATE,
    events::EDIT,
    newsletter::VIEW,
    translations::VIEW,
    translations::CREATE,
    translations::EDIT,
    settings::VIEW,
    activity::VIEW,
];

const VIEWER_PERMISSIONS: &[&str] = &[
    programs::VIEW,
    academic_years::VIEW,
    calls::VIEW,
    resolutions::VIEW,
    news::VIEW,
    documents::VIEW,
    events::VIEW,
    newsletter::VIEW,
    settings::VIEW,
    translations::VIEW,
    activity::VIEW,
];

/// A user's role. Exactly one per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    SuperAdmin,
    Admin,
    Editor,
    Viewer,
}

impl Role {
    pub const ALL: &'static [Role] = &[Role::SuperAdmin, Role::Admin, Role::Editor, Role::Viewer];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => ROLE_SUPER_ADMIN,
            Role::Admin => ROLE_ADMIN,
            Role::Editor => ROLE_EDITOR,
            Role::Viewer => ROLE_VIEWER,
        }
    }

    pub fn parse(name: &str) -> Result<Self, CoreError> {
        match name {
            ROLE_SUPER_ADMIN => Ok(Role::SuperAdmin),
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_EDITOR => Ok(Role::Editor),
            ROLE_VIEWER => Ok(Role::Viewer),
            other => Err(CoreError::Validation(format!("Unknown role: '{other}'"))),
        }
    }

    pub fn is_super_admin(self) -> bool {
        self == Role::SuperAdmin
    }

    /// Super-admins and admins.
    pub fn is_admin(self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }

    /// Permissions granted to this role.
    pub fn permissions(self) -> &'static [&'static str] {
        match self {
            Role::SuperAdmin | Role::Admin => ALL,
            Role::Editor => EDITOR_PERMISSIONS,
            Role::Viewer => VIEWER_PERMISSIONS,
        }
    }

    pub fn has_permission(self, permission: &str) -> bool {
        self.permissions().contains(&permission)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()).unwrap(), *role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(Role::parse("root").is_err());
    }

    #[test]
    fn admin_has_every_permission() {
        for p in ALL {
            assert!(Role::Admin.has_permission(p), "admin lacks {p}");
        }
    }

    #[test]
    fn editor_cannot_delete_or_publish_calls() {
        assert!(Role::Editor.has_permission(calls::EDIT));
        assert!(!Role::Editor.has_permission(calls::DELETE));
        assert!(!Role::Editor.has_permission(calls::PUBLISH));
        assert!(!Role::Editor.has_permission(calls::EXPORT));
        assert!(Role::Editor.has_permission(news::PUBLISH));
    }

    #[test]
    fn viewer_only_has_view_permissions() {
        for p in Role::Viewer.permissions() {
            assert!(p.ends_with(".view"), "viewer should not have {p}");
        }
    }

    #[test]
    fn editor_and_viewer_permissions_are_known() {
        for p in Role::Editor.permissions().iter().chain(Role::Viewer.permissions()) {
            assert!(ALL.contains(p), "{p} missing from permissions::ALL");
        }
    }
}

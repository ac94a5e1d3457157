//! Per-entity authorization policies.
//!
//! Every policy maps an [`Ability`] onto a permission string. The shared
//! [`Policy::before`] hook grants super-admins every ability before the
//! permission lookup runs.

use crate::error::CoreError;
use crate::permissions::{
    academic_years, activity, calls, documents, events, news, newsletter, programs, resolutions,
    settings, translations, users,
};
use crate::roles::Role;
use crate::types::DbId;

/// Actions a policy can gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ability {
    ViewAny,
    View,
    Create,
    Update,
    Delete,
    Restore,
    ForceDelete,
    Publish,
    Export,
}

impl Ability {
    pub fn as_str(self) -> &'static str {
        match self {
            Ability::ViewAny => "viewAny",
            Ability::View => "view",
            Ability::Create => "create",
            Ability::Update => "update",
            Ability::Delete => "delete",
            Ability::Restore => "restore",
            Ability::ForceDelete => "forceDelete",
            Ability::Publish => "publish",
            Ability::Export => "export",
        }
    }
}

/// The authenticated user a policy decision is made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: DbId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn can(&self, permission: &str) -> bool {
        self.role.has_permission(permission)
    }
}

/// Permission strings backing each ability of a resource.
///
/// `None` means no role (other than super-admin) may perform the action.
#[derive(Debug, Clone, Copy)]
pub struct PermissionSet {
    pub view: Option<&'static str>,
    pub create: Option<&'static str>,
    pub edit: Option<&'static str>,
    pub delete: Option<&'static str>,
    pub publish: Option<&'static str>,
    pub export: Option<&'static str>,
}

impl PermissionSet {
    pub fn for_ability(&self, ability: Ability) -> Option<&'static str> {
        match ability {
            Ability::ViewAny | Ability::View => self.view,
            Ability::Create => self.create,
            Ability::Update => self.edit,
            Ability::Delete | Ability::Restore | Ability::ForceDelete => self.delete,
            Ability::Publish => self.publish,
            Ability::Export => self.export,
        }
    }
}

pub trait Policy {
    /// Entity name used in denial messages.
    const NAME: &'static str;
    const PERMISSIONS: PermissionSet;

    /// Runs before any permission check. `Some` short-circuits the decision.
    fn before(&self, actor: &Actor, _ability: Ability) -> Option<bool> {
        if actor.role.is_super_admin() {
            Some(true)
        } else {
            None
        }
    }

    fn check(&self, actor: &Actor, ability: Ability) -> bool {
        let granted = Self::PERMISSIONS
            .for_ability(ability)
            .is_some_and(|permission| actor.can(permission));
        match ability {
            // Permanent removal is reserved for administrators.
            Ability::ForceDelete => granted && actor.role.is_admin(),
            _ => granted,
        }
    }

    fn allows(&self, actor: &Actor, ability: Ability) -> bool {
        self.before(actor, ability)
            .unwrap_or_else(|| self.check(actor, ability))
    }
}

/// Fail with [`CoreError::Forbidden`] unless `policy` allows `ability`.
pub fn authorize<P: Policy>(policy: &P, actor: &Actor, ability: Ability) -> Result<(), CoreError> {
    if policy.allows(actor, ability) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Role '{}' is not allowed to {} {}",
            actor.role,
            ability.as_str(),
            P::NAME
        )))
    }
}

macro_rules! define_policy {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            view: $view:expr,
            create: $create:expr,
            edit: $edit:expr,
            delete: $delete:expr,
            publish: $publish:expr,
            export: $export:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Policy for $name {
            const NAME: &'static str = $label;
            const PERMISSIONS: PermissionSet = PermissionSet {
                view: $view,
                create: $create,
                edit: $edit,
                delete: $delete,
                publish: $publish,
                export: $export,
            };
        }
    };
}

define_policy! {
    ProgramPolicy ("program") {
        view: Some(programs::VIEW),
        create: Some(programs::CREATE),
        edit: Some(programs::EDIT),
        delete: Some(programs::DELETE),
        publish: None,
        export: None,
    }
}

define_policy! {
    AcademicYearPolicy ("academic year") {
        view: Some(academic_years::VIEW),
        create: Some(academic_years::CREATE),
        edit: Some(academic_years::EDIT),
        delete: Some(academic_years::DELETE),
        publish: None,
        export: None,
    }
}

define_policy! {
    CallPolicy ("call") {
        view: Some(calls::VIEW),
        create: Some(calls::CREATE),
        edit: Some(calls::EDIT),
        delete: Some(calls::DELETE),
        publish: Some(calls::PUBLISH),
        export: Some(calls::EXPORT),
    }
}

define_policy! {
    /// Phases are managed as part of their call.
    CallPhasePolicy ("call phase") {
        view: Some(calls::VIEW),
        create: Some(calls::EDIT),
        edit: Some(calls::EDIT),
        delete: Some(calls::DELETE),
        publish: None,
        export: None,
    }
}

define_policy! {
    CallApplicationPolicy ("call application") {
        view: Some(calls::VIEW),
        create: Some(calls::EDIT),
        edit: Some(calls::EDIT),
        delete: Some(calls::DELETE),
        publish: None,
        export: None,
    }
}

define_policy! {
    ResolutionPolicy ("resolution") {
        view: Some(resolutions::VIEW),
        create: Some(resolutions::CREATE),
        edit: Some(resolutions::EDIT),
        delete: Some(resolutions::DELETE),
        publish: Some(resolutions::PUBLISH),
        export: Some(resolutions::EXPORT),
    }
}

define_policy! {
    NewsPostPolicy ("news post") {
        view: Some(news::VIEW),
        create: Some(news::CREATE),
        edit: Some(news::EDIT),
        delete: Some(news::DELETE),
        publish: Some(news::PUBLISH),
        export: Some(news::EXPORT),
    }
}

define_policy! {
    DocumentCategoryPolicy ("document category") {
        view: Some(documents::VIEW),
        create: Some(documents::CREATE),
        edit: Some(documents::EDIT),
        delete: Some(documents::DELETE),
        publish: None,
        export: None,
    }
}

define_policy! {
    DocumentPolicy ("document") {
        view: Some(documents::VIEW),
        create: Some(documents::CREATE),
        edit: Some(documents::EDIT),
        delete: Some(documents::DELETE),
        publish: None,
        export: Some(documents::EXPORT),
    }
}

define_policy! {
    ErasmusEventPolicy ("event") {
        view: Some(events::VIEW),
        create: Some(events::CREATE),
        edit: Some(events::EDIT),
        delete: Some(events::DELETE),
        publish: None,
        export: None,
    }
}

define_policy! {
    NewsletterSubscriptionPolicy ("newsletter subscription") {
        view: Some(newsletter::VIEW),
        create: None,
        edit: None,
        delete: Some(newsletter::DELETE),
        publish: None,
        export: Some(newsletter::EXPORT),
    }
}

define_policy! {
    SettingPolicy ("setting") {
        view: Some(settings::VIEW),
        create: None,
        edit: Some(settings::EDIT),
        delete: None,
        publish: None,
        export: None,
    }
}

define_policy! {
    TranslationPolicy ("translation") {
        view: Some(translations::VIEW),
        create: Some(translations::CREATE),
        edit: Some(translations::EDIT),
        delete: Some(translations::DELETE),
        publish: None,
        export: None,
    }
}

define_policy! {
    UserPolicy ("user") {
        view: Some(users::VIEW),
        create: Some(users::CREATE),
        edit: Some(users::EDIT),
        delete: Some(users::DELETE),
        publish: None,
        export: None,
    }
}

define_policy! {
    ActivityPolicy ("activity log") {
        view: Some(activity::VIEW),
        create: None,
        edit: None,
        delete: None,
        publish: None,
        export: Some(activity::EXPORT),
    }
}

impl UserPolicy {
    /// Users may never delete (or force-delete) their own account, not even
    /// super-admins.
    pub fn can_delete_user(&self, actor: &Actor, target_id: DbId) -> bool {
        actor.user_id != target_id && self.allows(actor, Ability::Delete)
    }

    /// Only super-admins may hand out the super-admin role.
    pub fn can_assign_role(&self, actor: &Actor, role: Role) -> bool {
        if role.is_super_admin() {
            actor.role.is_super_admin()
        } else {
            self.allows(actor, Ability::Update) || self.allows(actor, Ability::Create)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn actor(role: Role) -> Actor {
        Actor::new(1, role)
    }

    #[test]
    fn super_admin_short_circuits_every_ability() {
        let admin = actor(Role::SuperAdmin);
        assert!(SettingPolicy.allows(&admin, Ability::Delete));
        assert!(ActivityPolicy.allows(&admin, Ability::Create));
        assert!(CallPolicy.allows(&admin, Ability::ForceDelete));
    }

    #[test]
    fn viewer_can_only_view() {
        let viewer = actor(Role::Viewer);
        assert!(CallPolicy.allows(&viewer, Ability::ViewAny));
        assert!(CallPolicy.allows(&viewer, Ability::View));
        assert!(!CallPolicy.allows(&viewer, Ability::Create));
        assert!(!CallPolicy.allows(&viewer, Ability::Update));
        assert!(!CallPolicy.allows(&viewer, Ability::Delete));
        assert!(!CallPolicy.allows(&viewer, Ability::Publish));
    }

    #[test]
    fn editor_edits_but_does_not_delete() {
        let editor = actor(Role::Editor);
        assert!(ResolutionPolicy.allows(&editor, Ability::Create));
        assert!(ResolutionPolicy.allows(&editor, Ability::Update));
        assert!(!ResolutionPolicy.allows(&editor, Ability::Delete));
        assert!(!ResolutionPolicy.allows(&editor, Ability::Restore));
        assert!(!ResolutionPolicy.allows(&editor, Ability::Publish));
        assert!(NewsPostPolicy.allows(&editor, Ability::Publish));
    }

    #[test]
    fn force_delete_requires_admin_role() {
        assert!(ProgramPolicy.allows(&actor(Role::Admin), Ability::ForceDelete));
        assert!(!ProgramPolicy.allows(&actor(Role::Editor), Ability::ForceDelete));
    }

    #[test]
    fn abilities_without_permission_are_denied() {
        let admin = actor(Role::Admin);
        assert!(!SettingPolicy.allows(&admin, Ability::Delete));
        assert!(!ActivityPolicy.allows(&admin, Ability::Update));
        assert!(!NewsletterSubscriptionPolicy.allows(&admin, Ability::Create));
    }

    #[test]
    fn authorize_returns_forbidden() {
        let result = authorize(&CallPolicy, &actor(Role::Viewer), Ability::Delete);
        assert_matches!(result, Err(CoreError::Forbidden(msg)) if msg.contains("call"));
        assert!(authorize(&CallPolicy, &actor(Role::Admin), Ability::Delete).is_ok());
    }

    #[test]
    fn export_gating_follows_policy() {
        assert!(NewsletterSubscriptionPolicy.allows(&actor(Role::Admin), Ability::Export));
        assert!(!NewsletterSubscriptionPolicy.allows(&actor(Role::Editor), Ability::Export));
        assert!(!CallPolicy.allows(&actor(Role::Viewer), Ability::Export));
        assert!(!CallPolicy.allows(&actor(Role::Editor), Ability::Export));
        assert!(!ResolutionPolicy.allows(&actor(Role::Editor), Ability::Export));
        assert!(!NewsPostPolicy.allows(&actor(Role::Editor), Ability::Export));
        assert!(!DocumentPolicy.allows(&actor(Role::Viewer), Ability::Export));
        // No export exists for these.
        assert!(!ProgramPolicy.allows(&actor(Role::Admin), Ability::Export));
        assert!(!CallApplicationPolicy.allows(&actor(Role::Admin), Ability::Export));
        assert!(CallPolicy.allows(&actor(Role::Admin), Ability::Export));
        assert!(DocumentPolicy.allows(&actor(Role::SuperAdmin), Ability::Export));
        assert!(!ActivityPolicy.allows(&actor(Role::Editor), Ability::Export));
    }

    #[test]
    fn users_cannot_delete_themselves() {
        let admin = Actor::new(7, Role::SuperAdmin);
        assert!(!UserPolicy.can_delete_user(&admin, 7));
        assert!(UserPolicy.can_delete_user(&admin, 8));
    }

    #[test]
    fn only_super_admin_assigns_super_admin() {
        assert!(!UserPolicy.can_assign_role(&actor(Role::Admin), Role::SuperAdmin));
        assert!(UserPolicy.can_assign_role(&actor(Role::Admin), Role::Editor));
        assert!(UserPolicy.can_assign_role(&actor(Role::SuperAdmin), Role::SuperAdmin));
        assert!(!UserPolicy.can_assign_role(&actor(Role::Editor), Role::Viewer));
    }
}

//! Permission string constants, one module per resource.
//!
//! Permissions follow the `<resource>.<action>` convention. Roles are granted
//! subsets of these in [`crate::roles`]; policies in [`crate::policy`] map
//! abilities onto them.

pub mod programs {
    pub const VIEW: &str = "programs.view";
    pub const CREATE: &str = "programs.create";
    pub const EDIT: &str = "programs.edit";
    pub const DELETE: &str = "programs.delete";
}

pub mod academic_years {
    pub const VIEW: &str = "academic_years.view";
    pub const CREATE: &str = "academic_years.create";
    pub const EDIT: &str = "academic_years.edit";
    pub const DELETE: &str = "academic_years.delete";
}

pub mod calls {
    pub const VIEW: &str = "calls.view";
    pub const CREATE: &str = "calls.create";
    pub const EDIT: &str = "calls.edit";
    pub const DELETE: &str = "calls.delete";
    pub const PUBLISH: &str = "calls.publish";
    pub const EXPORT: &str = "calls.export";
}

pub mod resolutions {
    pub const VIEW: &str = "resolutions.view";
    pub const CREATE: &str = "resolutions.create";
    pub const EDIT: &str = "resolutions.edit";
    pub const DELETE: &str = "resolutions.delete";
    pub const PUBLISH: &str = "resolutions.publish";
    pub const EXPORT: &str = "resolutions.export";
}

pub mod news {
    pub const VIEW: &str = "news.view";
    pub const CREATE: &str = "news.create";
    pub const EDIT: &str = "news.edit";
    pub const DELETE: &str = "news.delete";
    pub const PUBLISH: &str = "news.publish";
    pub const EXPORT: &str = "news.export";
}

pub mod documents {
    pub const VIEW: &str = "documents.view";
    pub const CREATE: &str = "documents.create";
    pub const EDIT: &str = "documents.edit";
    pub const DELETE: &str = "documents.delete";
    pub const EXPORT: &str = "documents.export";
}

pub mod events {
    pub const VIEW: &str = "events.view";
    pub const CREATE: &str = "events.create";
    pub const EDIT: &str = "events.edit";
    pub const DELETE: &str = "events.delete";
}

pub mod newsletter {
    pub const VIEW: &str = "newsletter.view";
    pub const DELETE: &str = "newsletter.delete";
    pub const EXPORT: &str = "newsletter.export";
}

pub mod settings {
    pub const VIEW: &str = "settings.view";
    pub const EDIT: &str = "settings.edit";
}

pub mod translations {
    pub const VIEW: &str = "translations.view";
    pub const CREATE: &str = "translations.create";
    pub const EDIT: &str = "translations.edit";
    pub const DELETE: &str = "translations.delete";
}

pub mod users {
    pub const VIEW: &str = "users.view";
    pub const CREATE: &str = "users.create";
    pub const EDIT: &str = "users.edit";
    pub const DELETE: &str = "users.delete";
}

pub mod activity {
    pub const VIEW: &str = "activity.view";
    pub const EXPORT: &str = "activity.export";
}

/// Every permission known to the system.
pub const ALL: &[&str] = &[
    programs::VIEW,
    programs::CREATE,
    programs::EDIT,
    programs::DELETE,
    academic_years::VIEW,
    academic_years::CREATE,
    academic_years::EDIT,
    academic_years::DELETE,
    calls::VIEW,
    calls::CREATE,
    calls::EDIT,
    calls::DELETE,
    calls::PUBLISH,
    calls::EXPORT,
    resolutions::VIEW,
    resolutions::CREATE,
    resolutions::EDIT,
    resolutions::DELETE,
    resolutions::PUBLISH,
    resolutions::EXPORT,
    news::VIEW,
    news::CREATE,
    news::EDIT,
    news::DELETE,
    news::PUBLISH,
    news::EXPORT,
    documents::VIEW,
    documents::CREATE,
    documents::EDIT,
    documents::DELETE,
    documents::EXPORT,
    events::VIEW,
    events::CREATE,
    events::EDIT,
    events::DELETE,
    newsletter::VIEW,
    newsletter::DELETE,
    newsletter::EXPORT,
    settings::VIEW,
    settings::EDIT,
    translations::VIEW,
    translations::CREATE,
    translations::EDIT,
    translations::DELETE,
    users::VIEW,
    users::CREATE,
    users::EDIT,
    users::DELETE,
    activity::VIEW,
    activity::EXPORT,
];

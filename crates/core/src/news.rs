//! News post enumerations and publication rules.

use crate::types::Timestamp;

define_text_enum! {
    /// Editorial status of a news post.
    NewsStatus ("news status") {
        Borrador = ("borrador", "Borrador"),
        EnRevision = ("en_revision", "En revisión"),
        Publicado = ("publicado", "Publicado"),
        Archivado = ("archivado", "Archivado"),
    }
}

define_text_enum! {
    /// Who took part in the mobility the post reports on.
    MobilityType ("mobility type") {
        Alumnado = ("alumnado", "Alumnado"),
        Personal = ("personal", "Personal"),
    }
}

define_text_enum! {
    MobilityCategory ("mobility category") {
        Fct = ("fct", "FCT"),
        JobShadowing = ("job_shadowing", "Job shadowing"),
        Intercambio = ("intercambio", "Intercambio"),
        Curso = ("curso", "Curso"),
        Otro = ("otro", "Otro"),
    }
}

/// Status and publication timestamp after publishing at `now`.
pub fn published(now: Timestamp) -> (NewsStatus, Option<Timestamp>) {
    (NewsStatus::Publicado, Some(now))
}

/// Status and publication timestamp after unpublishing.
pub fn unpublished() -> (NewsStatus, Option<Timestamp>) {
    (NewsStatus::Borrador, None)
}

/// Timestamp to store when a status is set directly through an edit.
///
/// Setting `publicado` without a date stamps `now`; leaving `publicado`
/// clears the date.
pub fn published_at_for_status(
    status: NewsStatus,
    current: Option<Timestamp>,
    now: Timestamp,
) -> Option<Timestamp> {
    match status {
        NewsStatus::Publicado => current.or(Some(now)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn publish_and_unpublish() {
        let now = Utc::now();
        assert_eq!(published(now), (NewsStatus::Publicado, Some(now)));
        assert_eq!(unpublished(), (NewsStatus::Borrador, None));
    }

    #[test]
    fn editing_status_keeps_existing_date() {
        let earlier = Utc::now() - Duration::days(1);
        let now = Utc::now();
        assert_eq!(
            published_at_for_status(NewsStatus::Publicado, Some(earlier), now),
            Some(earlier)
        );
        assert_eq!(
            published_at_for_status(NewsStatus::Publicado, None, now),
            Some(now)
        );
        assert_eq!(
            published_at_for_status(NewsStatus::Archivado, Some(earlier), now),
            None
        );
    }

    #[test]
    fn category_labels() {
        assert_eq!(MobilityCategory::Fct.label(), "FCT");
        assert_eq!(MobilityCategory::label_or_raw("job_shadowing"), "Job shadowing");
    }
}

//! Activity log recording for handler-level mutations.
//!
//! Model changes are diffed with [`erasmus_core::audit`] and stored through
//! [`ActivityRepo`]. Every entry carries the request's IP address and user
//! agent, and every property map is redacted before it is written.
//!
//! Entries are written on the connection that made the change. Handlers run
//! the change and its entry in one transaction so neither commits alone.

use erasmus_core::audit::{
    changes_on_create, changes_on_delete, changes_on_update, events, finalize_properties,
    status_change_properties, ActivityContext, Auditable,
};
use erasmus_core::types::DbId;
use erasmus_db::models::activity::CreateActivity;
use erasmus_db::repositories::ActivityRepo;
use serde_json::{Map, Value};
use sqlx::PgConnection;

/// Writes activity entries on behalf of one user and request.
pub struct ActivityLogger<'a> {
    causer_id: Option<DbId>,
    context: &'a ActivityContext,
}

impl<'a> ActivityLogger<'a> {
    pub fn new(causer_id: Option<DbId>, context: &'a ActivityContext) -> Self {
        Self { causer_id, context }
    }

    pub async fn created<T: Auditable>(
        &self,
        conn: &mut PgConnection,
        model: &T,
    ) -> Result<(), sqlx::Error> {
        let props = changes_on_create(model).into_properties();
        self.subject_entry(conn, model, events::CREATED, props).await
    }

    /// Nothing is written when no logged field changed.
    pub async fn updated<T: Auditable>(
        &self,
        conn: &mut PgConnection,
        before: &T,
        after: &T,
    ) -> Result<(), sqlx::Error> {
        match changes_on_update(before, after) {
            Some(changes) => {
                self.subject_entry(conn, after, events::UPDATED, changes.into_properties())
                    .await
            }
            None => Ok(()),
        }
    }

    pub async fn deleted<T: Auditable>(
        &self,
        conn: &mut PgConnection,
        model: &T,
    ) -> Result<(), sqlx::Error> {
        let props = changes_on_delete(model).into_properties();
        self.subject_entry(conn, model, events::DELETED, props).await
    }

    pub async fn restored<T: Auditable>(
        &self,
        conn: &mut PgConnection,
        model: &T,
    ) -> Result<(), sqlx::Error> {
        self.subject_entry(conn, model, events::RESTORED, Map::new())
            .await
    }

    pub async fn force_deleted<T: Auditable>(
        &self,
        conn: &mut PgConnection,
        model: &T,
    ) -> Result<(), sqlx::Error> {
        let props = changes_on_delete(model).into_properties();
        self.subject_entry(conn, model, events::FORCE_DELETED, props)
            .await
    }

    pub async fn published<T: Auditable>(
        &self,
        conn: &mut PgConnection,
        model: &T,
    ) -> Result<(), sqlx::Error> {
        self.subject_entry(conn, model, events::PUBLISH, Map::new())
            .await
    }

    pub async fn unpublished<T: Auditable>(
        &self,
        conn: &mut PgConnection,
        model: &T,
    ) -> Result<(), sqlx::Error> {
        self.subject_entry(conn, model, events::UNPUBLISH, Map::new())
            .await
    }

    /// Records `old_status` / `new_status`, even when they are equal.
    pub async fn status_changed<T: Auditable>(
        &self,
        conn: &mut PgConnection,
        model: &T,
        old_status: &str,
        new_status: &str,
    ) -> Result<(), sqlx::Error> {
        let props = status_change_properties(old_status, new_status);
        self.subject_entry(conn, model, events::STATUS_CHANGED, props)
            .await
    }

    /// Entry about a model instance.
    pub async fn subject_entry<T: Auditable>(
        &self,
        conn: &mut PgConnection,
        model: &T,
        event: &str,
        props: Map<String, Value>,
    ) -> Result<(), sqlx::Error> {
        let entry = CreateActivity {
            log_name: T::LOG_NAME.to_string(),
            description: event.to_string(),
            subject_type: Some(T::SUBJECT_TYPE.to_string()),
            subject_id: Some(model.subject_id()),
            event: Some(event.to_string()),
            causer_id: self.causer_id,
            properties: finalize_properties(props, self.context),
        };
        let id = ActivityRepo::insert(&mut *conn, &entry).await?;
        tracing::debug!(
            activity_id = id,
            event,
            subject_type = T::SUBJECT_TYPE,
            subject_id = entry.subject_id,
            "Activity recorded"
        );
        Ok(())
    }
}

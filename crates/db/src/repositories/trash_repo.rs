//! Cross-table view of soft-deleted rows.
//!
//! Entity types are the table names of every soft-deletable entity. The
//! restore flow uses [`TrashRepo::check_parent_trashed`] to refuse
//! restoring a child whose parent is still in the trash.

use serde::Serialize;
use sqlx::PgPool;

use erasmus_core::types::{DbId, Timestamp};

/// Entity types that support soft delete.
pub const KNOWN_ENTITY_TYPES: &[&str] = &[
    "programs",
    "academic_years",
    "calls",
    "call_phases",
    "call_applications",
    "resolutions",
    "news_posts",
    "document_categories",
    "documents",
    "erasmus_events",
    "users",
];

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TrashedItem {
    pub id: DbId,
    pub entity_type: String,
    pub name_or_label: Option<String>,
    pub deleted_at: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrashList {
    pub items: Vec<TrashedItem>,
    pub total_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrashCount {
    pub entity_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrashSummary {
    pub counts_by_type: Vec<TrashCount>,
    pub total_count: i64,
}

pub fn is_known_entity_type(entity_type: &str) -> bool {
    KNOWN_ENTITY_TYPES.contains(&entity_type)
}

pub struct TrashRepo;

impl TrashRepo {
    // ------ Listing ------

    /// Soft-deleted rows, newest first. `entity_type` limits the query to
    /// one table; callers validate it with [`is_known_entity_type`].
    pub async fn list_trashed(
        pool: &PgPool,
        entity_type: Option<&str>,
    ) -> Result<TrashList, sqlx::Error> {
        let types: Vec<&str> = match entity_type {
            Some(et) => vec![et],
            None => KNOWN_ENTITY_TYPES.to_vec(),
        };
        let unions: Vec<String> = types
            .iter()
            .map(|et| {
                let (table, name_expr) = table_and_name_expr(et);
                format!(
                    "SELECT id, '{et}' AS entity_type, {name_expr} AS name_or_label, \
                     deleted_at FROM {table} WHERE deleted_at IS NOT NULL"
                )
            })
            .collect();
        let sql = format!("{} ORDER BY deleted_at DESC", unions.join(" UNION ALL "));
        let items = sqlx::query_as::<_, TrashedItem>(&sql).fetch_all(pool).await?;
        let total_count = items.len() as i64;
        Ok(TrashList { items, total_count })
    }

    /// Per-type counts of trashed rows. Types with nothing trashed are omitted.
    pub async fn summary(pool: &PgPool) -> Result<TrashSummary, sqlx::Error> {
        let mut counts_by_type = Vec::new();
        let mut total_count: i64 = 0;

        for et in KNOWN_ENTITY_TYPES {
            let (table, _) = table_and_name_expr(et);
            let sql = format!("SELECT COUNT(*) FROM {table} WHERE deleted_at IS NOT NULL");
            let count: i64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;
            if count > 0 {
                counts_by_type.push(TrashCount {
                    entity_type: (*et).to_string(),
                    count,
                });
                total_count += count;
            }
        }

        Ok(TrashSummary {
            counts_by_type,
            total_count,
        })
    }

    // ------ Restore checks ------

    /// Returns a message when any parent of the row is trashed, `None`
    /// when every parent is live or the type has no parent.
    pub async fn check_parent_trashed(
        pool: &PgPool,
        entity_type: &str,
        id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        for (fk_col, parent_table, parent_label) in parents_of(entity_type) {
            let (child_table, _) = table_and_name_expr(entity_type);
            let sql = format!(
                "SELECT p.deleted_at \
                 FROM {child_table} c \
                 JOIN {parent_table} p ON p.id = c.{fk_col} \
                 WHERE c.id = $1"
            );
            let row: Option<Option<Timestamp>> =
                sqlx::query_scalar(&sql).bind(id).fetch_optional(pool).await?;
            if let Some(Some(_)) = row {
                return Ok(Some(format!(
                    "No se puede restaurar: {parent_label} está en la papelera. \
                     Restaure primero {parent_label}."
                )));
            }
        }
        Ok(None)
    }
}

// ------ Private helpers ------

/// `(fk column, parent table, Spanish label)` for every parent of a type.
fn parents_of(entity_type: &str) -> &'static [(&'static str, &'static str, &'static str)] {
    match entity_type {
        "calls" => &[
            ("program_id", "programs", "el programa"),
            ("academic_year_id", "academic_years", "el año académico"),
        ],
        "call_phases" | "call_applications" => &[("call_id", "calls", "la convocatoria")],
        "resolutions" => &[
            ("call_id", "calls", "la convocatoria"),
            ("call_phase_id", "call_phases", "la fase"),
        ],
        "news_posts" => &[
            ("program_id", "programs", "el programa"),
            ("academic_year_id", "academic_years", "el año académico"),
        ],
        "documents" => &[
            ("category_id", "document_categories", "la categoría"),
            ("program_id", "programs", "el programa"),
            ("academic_year_id", "academic_years", "el año académico"),
        ],
        "erasmus_events" => &[
            ("program_id", "programs", "el programa"),
            ("call_id", "calls", "la convocatoria"),
        ],
        _ => &[],
    }
}

/// Table name and label expression of an entity type.
fn table_and_name_expr(entity_type: &str) -> (&str, &str) {
    match entity_type {
        "programs" => ("programs", "name"),
        "academic_years" => ("academic_years", "year"),
        "calls" => ("calls", "title"),
        "call_phases" => ("call_phases", "name"),
        "call_applications" => ("call_applications", "applicant_name"),
        "resolutions" => ("resolutions", "title"),
        "news_posts" => ("news_posts", "title"),
        "document_categories" => ("document_categories", "name"),
        "documents" => ("documents", "title"),
        "erasmus_events" => ("erasmus_events", "title"),
        "users" => ("users", "name"),
        // Unreachable when callers validate entity_type first
        _ => ("programs", "NULL::text"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_type_maps_to_its_table() {
        for et in KNOWN_ENTITY_TYPES {
            assert_eq!(table_and_name_expr(et).0, *et);
        }
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(is_known_entity_type("calls"));
        assert!(!is_known_entity_type("settings"));
        assert!(parents_of("programs").is_empty());
    }
}

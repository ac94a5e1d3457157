//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` + `Validate` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//! - The index filter struct and the sort whitelist for the entity

pub mod academic_year;
pub mod activity;
pub mod call;
pub mod call_application;
pub mod call_phase;
pub mod document;
pub mod document_category;
pub mod erasmus_event;
pub mod news_post;
pub mod newsletter;
pub mod program;
pub mod resolution;
pub mod role;
pub mod session;
pub mod setting;
pub mod translation;
pub mod user;

//! Domain logic for the Erasmus+ mobility admin service.
//!
//! Everything in this crate is pure: no database, no HTTP. The `db` and
//! `api` crates build on these types for persistence and transport.

#[macro_use]
mod text_enum;

pub mod academic_year;
pub mod audit;
pub mod call;
pub mod document;
pub mod error;
pub mod event;
pub mod guard;
pub mod hashing;
pub mod labels;
pub mod listing;
pub mod news;
pub mod newsletter;
pub mod permissions;
pub mod policy;
pub mod resolution;
pub mod roles;
pub mod settings;
pub mod slug;
pub mod translation;
pub mod types;
pub mod validation;

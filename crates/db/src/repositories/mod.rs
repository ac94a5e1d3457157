//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! take `&PgPool` as the first argument.

pub mod academic_year_repo;
pub mod activity_repo;
pub mod call_application_repo;
pub mod call_phase_repo;
pub mod call_repo;
pub mod document_category_repo;
pub mod document_repo;
pub mod erasmus_event_repo;
pub mod news_post_repo;
pub mod newsletter_repo;
pub mod program_repo;
pub mod resolution_repo;
pub mod role_repo;
pub mod session_repo;
pub mod setting_repo;
pub mod translation_repo;
pub mod trash_repo;
pub mod user_repo;

pub use academic_year_repo::AcademicYearRepo;
pub use activity_repo::ActivityRepo;
pub use call_application_repo::CallApplicationRepo;
pub use call_phase_repo::CallPhaseRepo;
pub use call_repo::CallRepo;
pub use document_category_repo::DocumentCategoryRepo;
pub use document_repo::DocumentRepo;
pub use erasmus_event_repo::ErasmusEventRepo;
pub use news_post_repo::NewsPostRepo;
pub use newsletter_repo::NewsletterRepo;
pub use program_repo::ProgramRepo;
pub use resolution_repo::ResolutionRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use setting_repo::SettingRepo;
pub use translation_repo::TranslationRepo;
pub use trash_repo::TrashRepo;
pub use user_repo::UserRepo;

//! Read-only access to the `user_languages` dataset: the self-reported skill
//! levels of members in individual languages, one tab-separated file per
//! language code.

pub mod config;
pub mod tsv;
pub mod user_languages;
pub mod version;

pub use user_languages::{UserLanguage, UserLanguages};
pub use version::Versions;

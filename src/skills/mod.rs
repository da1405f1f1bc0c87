//! Skill taxonomy and the matcher that both tags and classifies postings.

mod extractor;
pub mod taxonomy;

pub use extractor::{extract_skills, is_software_job};
pub use taxonomy::Taxonomy;

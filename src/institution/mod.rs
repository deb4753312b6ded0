//! Everything for displaying and managing institutions.

mod core;
mod create_endpoint;
mod institutions_page;

pub use core::{INSTITUTION_KINDS, Institution, InstitutionKind};
pub use create_endpoint::{NewInstitutionForm, create_institution};
pub use institutions_page::{InstitutionState, get_institutions_page};

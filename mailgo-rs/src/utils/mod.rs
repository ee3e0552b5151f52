//! Utility modules
//!
//! - [`email`]: Sender address validation and domain extraction
//! - [`random`]: Random MIME boundary tokens

pub mod email;
pub mod random;

pub use email::{domain_of, validate_email};
pub use random::{generate_boundary, generate_boundary_from};

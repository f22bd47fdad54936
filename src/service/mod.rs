//! PetService: lookups, creation policy and payload validation.

mod diagnostics;
mod pet;
mod validation;
pub use diagnostics::{Capture, ConstraintDiagnostics};
pub use pet::{Created, PetService};
pub use validation::PetValidator;

pub mod loader;
pub mod models;
pub mod validation;

pub use loader::load_input;
pub use models::*;
pub use validation::{PropertiesValidator, ValidationError, ValidationResult};

// Utility functions
pub mod docs;
pub mod error;
pub mod ident;

pub use error::AppError;

pub mod budget_request;
pub mod club;
pub mod report;
pub mod user;

pub use budget_request::*;
pub use club::*;
pub use report::*;
pub use user::*;

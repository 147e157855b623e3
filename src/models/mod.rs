pub mod enums;
pub mod filters;
pub mod report;
pub mod user;

pub use filters::*;
pub use report::*;
pub use user::*;

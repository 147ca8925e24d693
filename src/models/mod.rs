pub mod assignment;
pub mod audit_event;
pub mod dashboard;
pub mod project;
pub mod user;

pub use assignment::*;
pub use audit_event::*;
pub use dashboard::*;
pub use project::*;
pub use user::*;

pub mod assignments;
pub mod audit;
pub mod dashboard;
pub mod projects;
pub mod users;

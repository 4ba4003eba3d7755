pub mod dashboard;
pub mod patient;
pub mod register;

pub mod department;
pub mod patient;

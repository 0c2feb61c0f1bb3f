pub mod activities;
pub mod backup;
pub mod class;
pub mod core;
pub mod evaluations;
pub mod grades;
pub mod points;
pub mod students;

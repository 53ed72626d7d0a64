pub mod comparison;
pub mod schedule;
pub mod summary;

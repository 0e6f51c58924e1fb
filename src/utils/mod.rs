pub mod dependency_check;
pub mod progress;

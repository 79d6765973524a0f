pub mod enrollments;
pub mod handlers;
pub mod progress;

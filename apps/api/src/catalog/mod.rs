pub mod attachments;
pub mod categories;
pub mod chapters;
pub mod courses;
pub mod handlers;

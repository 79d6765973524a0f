pub mod analysis;
pub mod handlers;
pub mod questions;
pub mod scoring;
pub mod submission;

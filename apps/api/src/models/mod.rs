pub mod assessment;
pub mod attachment;
pub mod category;
pub mod chapter;
pub mod course;
pub mod enrollment;
pub mod onboarding;
pub mod progress;
pub mod user;

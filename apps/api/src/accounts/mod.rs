pub mod access;
pub mod handlers;
pub mod identity;
pub mod onboarding;
pub mod users;
pub mod verification;

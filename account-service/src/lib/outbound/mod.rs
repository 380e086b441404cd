pub mod identity;
pub mod notifications;
pub mod repositories;

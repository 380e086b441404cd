pub mod errors;
pub mod models;
pub mod notifications;
pub mod ports;
pub mod resolver;
pub mod service;
pub mod validation;

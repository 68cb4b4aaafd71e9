pub mod date;
pub mod email_registry;

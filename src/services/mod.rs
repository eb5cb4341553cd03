pub mod audit_log_service;

pub use audit_log_service::{format_log_message, AuditLog};

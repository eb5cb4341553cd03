pub mod audit_log;
pub mod session;

pub use audit_log::AuditLogDao;
pub use session::SessionDao;

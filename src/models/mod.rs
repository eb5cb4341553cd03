pub mod session_model;

pub use session_model::{LogEntry, OutputStatus, Session, SessionHandle};

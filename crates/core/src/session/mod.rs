pub mod detection_loop;
pub mod domain;
pub mod infrastructure;
pub mod session_logger;
pub mod try_on_session;

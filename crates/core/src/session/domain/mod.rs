pub mod camera;
pub mod session_state;

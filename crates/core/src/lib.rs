pub mod overlay;
pub mod session;
pub mod shared;
pub mod tracking;

pub mod domain;
pub mod infrastructure;
pub mod landmark_tracker;

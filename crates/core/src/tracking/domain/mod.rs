pub mod detection;
pub mod landmark_detector;
pub mod landmark_index_map;
pub mod landmark_record;
pub mod landmark_smoother;

pub mod overlay_asset;
pub mod overlay_catalog;
pub mod overlay_renderer;
pub mod placement_transform;

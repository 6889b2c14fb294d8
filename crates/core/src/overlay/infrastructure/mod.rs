pub mod css_overlay_renderer;
pub mod raster_overlay_renderer;

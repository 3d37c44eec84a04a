pub mod app;
pub mod config;
pub mod driver;
pub mod gesture;
pub mod input;
pub mod morph;
pub mod particles;
pub mod raster;
pub mod render;
pub mod scene;
pub mod shapes;
pub mod terminal;

pub mod analytics;
pub mod canvas;
pub mod color;
pub mod config;
pub mod contrast;
pub mod effects;
pub mod math;
pub mod names;
pub mod noise;
pub mod painter;
pub mod palette;
pub mod plan;
pub mod rand;
pub mod render;
pub mod seed;
pub mod themes;

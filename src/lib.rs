// Library exports for demodash

pub mod aggregate;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod model;
pub mod palette;
pub mod render;

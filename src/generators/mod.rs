pub mod color;
pub mod escape;
pub mod noise;

pub use color::hsv_to_rgb;
pub use escape::{escape_time, FractalKind};
pub use noise::Perlin3;

pub mod cloud;
pub mod color;
pub mod engine;
pub mod keyframes;

pub use color::{ColorError, Hsl, Rgb};
pub use engine::{clear_sky_color, compute_sky_color, SkyColors, SkyError, Weather};
pub use keyframes::{KeyFrame, KeyframeTable, DAY_SECONDS};

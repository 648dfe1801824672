use super::color::{hsl_to_rgb, rgb_to_hsl, Hsl, Rgb};

/// Fraction of saturation removed under full overcast. Below 1.0 so a
/// cloudy sky keeps a slight tint.
pub const MAX_DESATURATION: f64 = 0.9;
/// Lightness added under full overcast.
pub const MAX_BRIGHTENING: f64 = 0.15;
pub const LIGHTNESS_CEILING: f64 = 0.95;

/// Applies `cloud` percent of overcast to a color in HSL space.
pub fn overcast_hsl(hsl: Hsl, cloud: f64) -> Hsl {
    let cover = cloud / 100.0;
    Hsl {
        h: hsl.h,
        s: hsl.s - hsl.s * cover * MAX_DESATURATION,
        l: (cover * MAX_BRIGHTENING + hsl.l).min(LIGHTNESS_CEILING),
    }
}

pub fn apply_cloud_cover(clear_sky: Rgb, cloud: f64) -> Rgb {
    if cloud == 0.0 {
        return clear_sky;
    }
    hsl_to_rgb(overcast_hsl(rgb_to_hsl(clear_sky), cloud))
}

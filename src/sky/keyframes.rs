use super::color::{mix_color, Rgb};

pub const DAY_SECONDS: f64 = 86_400.0;

const HALF_HOUR: f64 = 1_800.0;
const HOUR: f64 = 3_600.0;

// Offsets relative to sunrise.
const NIGHT_END: f64 = -2.0 * HOUR;
const NAUTICAL_DAWN: f64 = -1.5 * HOUR;
const CIVIL_DAWN: f64 = -HOUR;
const FIRST_LIGHT: f64 = -HALF_HOUR;
const MORNING: f64 = HALF_HOUR;

// Offsets relative to sunset.
const AFTERNOON: f64 = -1.5 * HOUR;
const GOLDEN_HOUR: f64 = -HOUR;
const DUSK: f64 = -HALF_HOUR;
const NIGHT_START: f64 = HALF_HOUR;

const NIGHT: u32 = 0x111111;
const NAUTICAL_DAWN_COLOR: u32 = 0x4d548a;
const CIVIL_DAWN_COLOR: u32 = 0xc486b1;
const FIRST_LIGHT_COLOR: u32 = 0xee88a0;
const SUNRISE_COLOR: u32 = 0xff7d75;
const MORNING_COLOR: u32 = 0xf4eeef;
const NOON_COLOR: u32 = 0x5dc9f1;
const AFTERNOON_COLOR: u32 = 0x9eefe0;
const GOLDEN_HOUR_COLOR: u32 = 0xf1e17c;
const DUSK_COLOR: u32 = 0xf86b10;
const SUNSET_COLOR: u32 = 0x100028;

pub const KEYFRAME_COUNT: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyFrame {
    /// Seconds since local midnight.
    pub offset: f64,
    pub color: Rgb,
}

impl KeyFrame {
    fn new(offset: f64, packed: u32) -> Self {
        Self {
            offset,
            color: Rgb::from_u24(packed),
        }
    }
}

/// The day's color curve, anchored at midnight on both ends and at fixed
/// offsets around sunrise and sunset.
///
/// Entries keep their construction order. Extreme sunrise/sunset values
/// (polar days, offsets near midnight) can make the offsets non-monotonic;
/// [`KeyframeTable::is_monotonic`] reports that, but the table is never
/// reordered.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTable {
    frames: [KeyFrame; KEYFRAME_COUNT],
}

impl KeyframeTable {
    pub fn for_day(sunrise: f64, sunset: f64) -> Self {
        Self {
            frames: [
                KeyFrame::new(0.0, NIGHT),
                KeyFrame::new(sunrise + NIGHT_END, NIGHT),
                KeyFrame::new(sunrise + NAUTICAL_DAWN, NAUTICAL_DAWN_COLOR),
                KeyFrame::new(sunrise + CIVIL_DAWN, CIVIL_DAWN_COLOR),
                KeyFrame::new(sunrise + FIRST_LIGHT, FIRST_LIGHT_COLOR),
                KeyFrame::new(sunrise, SUNRISE_COLOR),
                KeyFrame::new(sunrise + MORNING, MORNING_COLOR),
                KeyFrame::new((sunrise + sunset) / 2.0, NOON_COLOR),
                KeyFrame::new(sunset + AFTERNOON, AFTERNOON_COLOR),
                KeyFrame::new(sunset + GOLDEN_HOUR, GOLDEN_HOUR_COLOR),
                KeyFrame::new(sunset + DUSK, DUSK_COLOR),
                KeyFrame::new(sunset, SUNSET_COLOR),
                KeyFrame::new(sunset + NIGHT_START, NIGHT),
                KeyFrame::new(DAY_SECONDS, NIGHT),
            ],
        }
    }

    pub fn frames(&self) -> &[KeyFrame] {
        &self.frames
    }

    pub fn is_monotonic(&self) -> bool {
        self.frames.windows(2).all(|w| w[0].offset <= w[1].offset)
    }

    /// Index of the segment end used for `time`: the first frame (in table
    /// order) whose offset is past `time`, falling back to 1 when there is
    /// none or it is the very first frame.
    fn segment_end(&self, time: f64) -> usize {
        self.frames
            .iter()
            .position(|frame| frame.offset > time)
            .filter(|&i| i > 0)
            .unwrap_or(1)
    }

    /// Clear-sky color at `time` seconds since midnight.
    pub fn sample(&self, time: f64) -> Rgb {
        let i = self.segment_end(time);
        let prev = &self.frames[i - 1];
        let next = &self.frames[i];

        let span = next.offset - prev.offset;
        if span == 0.0 {
            return next.color;
        }

        let ratio = (time - prev.offset) / span;
        mix_color(prev.color, next.color, 1.0 - ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sky::color::rgb_to_hex;

    const SUNRISE: f64 = 21_600.0;
    const SUNSET: f64 = 64_800.0;

    #[test]
    fn table_is_anchored_at_both_midnights() {
        let table = KeyframeTable::for_day(SUNRISE, SUNSET);
        let frames = table.frames();
        assert_eq!(frames.len(), KEYFRAME_COUNT);
        assert_eq!(frames[0].offset, 0.0);
        assert_eq!(frames[KEYFRAME_COUNT - 1].offset, DAY_SECONDS);
        assert_eq!(frames[7].offset, 43_200.0);
        assert!(table.is_monotonic());
    }

    #[test]
    fn midnight_resolves_to_night_color() {
        let table = KeyframeTable::for_day(SUNRISE, SUNSET);
        assert_eq!(rgb_to_hex(table.sample(0.0)), "#111111");
        assert_eq!(rgb_to_hex(table.sample(DAY_SECONDS)), "#111111");
    }

    #[test]
    fn keyframe_offsets_return_exact_colors() {
        let table = KeyframeTable::for_day(SUNRISE, SUNSET);
        assert_eq!(table.sample(SUNRISE), Rgb::from_u24(SUNRISE_COLOR));
        assert_eq!(table.sample(43_200.0), Rgb::from_u24(NOON_COLOR));
        assert_eq!(table.sample(SUNSET), Rgb::from_u24(SUNSET_COLOR));
    }

    #[test]
    fn halfway_between_keyframes_is_even_mix() {
        let table = KeyframeTable::for_day(SUNRISE, SUNSET);
        let sampled = table.sample(SUNRISE - 900.0);
        let expected = mix_color(
            Rgb::from_u24(FIRST_LIGHT_COLOR),
            Rgb::from_u24(SUNRISE_COLOR),
            0.5,
        );
        assert!((sampled.r - expected.r).abs() < 1e-12);
        assert!((sampled.g - expected.g).abs() < 1e-12);
        assert!((sampled.b - expected.b).abs() < 1e-12);
    }

    #[test]
    fn early_morning_stays_night() {
        let table = KeyframeTable::for_day(SUNRISE, SUNSET);
        assert_eq!(rgb_to_hex(table.sample(3_600.0)), "#111111");
        assert_eq!(rgb_to_hex(table.sample(SUNRISE + NIGHT_END)), "#111111");
    }

    #[test]
    fn zero_length_segment_returns_later_color() {
        // Sunrise at 02:00 puts the end of night exactly on midnight.
        let table = KeyframeTable::for_day(7_200.0, SUNSET);
        assert_eq!(table.frames()[1].offset, 0.0);
        assert_eq!(table.sample(-10.0), Rgb::from_u24(NIGHT));
        assert_eq!(table.sample(DAY_SECONDS + 60.0), Rgb::from_u24(NIGHT));
    }

    #[test]
    fn pathological_sun_times_are_reported_not_reordered() {
        let table = KeyframeTable::for_day(1_000.0, 80_000.0);
        assert!(!table.is_monotonic());
        assert_eq!(table.frames()[1].offset, 1_000.0 + NIGHT_END);

        let sampled = table.sample(40_000.0);
        for channel in [sampled.r, sampled.g, sampled.b] {
            assert!(channel.is_finite());
        }
    }

    #[test]
    fn polar_night_does_not_divide_by_zero() {
        let table = KeyframeTable::for_day(43_200.0, 43_200.0);
        for time in [0.0, 30_000.0, 43_200.0, 50_000.0, DAY_SECONDS] {
            let sampled = table.sample(time);
            assert!(sampled.r.is_finite() && sampled.g.is_finite() && sampled.b.is_finite());
        }
    }
}

//! RGB (0-127 per channel, as sent by MIDI controllers) to the hue/saturation/brightness
//! ranges the Hue bridge expects.

const CHANNEL_MAX: f64 = 127.0;
const HUE_MAX: f64 = 65535.0;
const SAT_BRI_MAX: f64 = 254.0;

const WARM_WHITE_GREEN: f64 = 0.8;
const WARM_WHITE_BLUE: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hsv {
    pub hue: u16,
    pub sat: u8,
    pub bri: u8,
}

pub fn rgb_to_hsv(r: f64, g: f64, b: f64) -> Hsv {
    let (r, g, b) = (r / CHANNEL_MAX, g / CHANNEL_MAX, b / CHANNEL_MAX);
    let v = r.max(g).max(b);
    let c = v - r.min(g).min(b);

    let h = if c == 0.0 {
        0.0
    } else if v == r {
        (g - b) / c
    } else if v == g {
        2.0 + (b - r) / c
    } else {
        4.0 + (r - g) / c
    };
    let h = if h < 0.0 { h + 6.0 } else { h };
    let sat = if v > 0.0 { c / v * SAT_BRI_MAX } else { 0.0 };

    // `as` saturates, so inputs outside 0-127 clamp to the protocol ranges.
    Hsv {
        hue: ((60.0 * h / 360.0) * HUE_MAX).floor() as u16,
        sat: sat.floor() as u8,
        bri: (v * SAT_BRI_MAX).floor() as u8,
    }
}

/// Pulls pure grays towards a warmer white. Colored triples pass through untouched.
pub fn warm_white(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    if r == g && g == b {
        (r, g * WARM_WHITE_GREEN, b * WARM_WHITE_BLUE)
    } else {
        (r, g, b)
    }
}

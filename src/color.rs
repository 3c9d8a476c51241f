//! RGB <-> HSV conversion on the 0–255 integer scale.
//!
//! Both directions truncate toward zero when going back to integers, so
//! results are reproducible bit-for-bit. Hue is stored as a fraction of the
//! full wheel scaled to 0–255, which means a round trip through HSV may move
//! a channel by a few units where chroma is low.

use crate::PixelSample;

/// Convert an 8-bit RGB triple into 8-bit HSV.
///
/// Grey pixels (all channels equal) get hue and saturation 0.
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == min {
        return [0, 0, max];
    }

    let (r, g, b, maxc) = (r as f64, g as f64, b as f64, max as f64);
    let chroma = maxc - min as f64;
    let s = chroma / maxc;
    let rc = (maxc - r) / chroma;
    let gc = (maxc - g) / chroma;
    let bc = (maxc - b) / chroma;

    let h = if r == maxc {
        bc - gc
    } else if g == maxc {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    // Hue is held in single precision before scaling, so exact thirds of the
    // wheel land on 85 and 170.
    let h = ((h / 6.0 + 1.0) % 1.0) as f32;

    [to_channel(h as f64), to_channel(s), max]
}

/// Convert an 8-bit HSV triple back into 8-bit RGB.
pub fn hsv_to_rgb([h, s, v]: [u8; 3]) -> [u8; 3] {
    let h = h as f64 / 255.0;
    let s = s as f64 / 255.0;
    let v = v as f64 / 255.0;

    if s == 0.0 {
        return [to_channel(v); 3];
    }

    let sector = (h * 6.0) as u32;
    let f = h * 6.0 - sector as f64;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    [to_channel(r), to_channel(g), to_channel(b)]
}

/// Scale a normalized channel to 0–255, truncating.
#[inline]
fn to_channel(x: f64) -> u8 {
    (x * 255.0) as u8
}

/// Convert a whole sample buffer to HSV in place.
pub(crate) fn samples_to_hsv(samples: &mut [PixelSample]) {
    for sample in samples.iter_mut() {
        *sample = rgb_to_hsv(*sample);
    }
}

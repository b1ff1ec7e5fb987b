//! Rotation by affine resampling.
//!
//! Every destination pixel centre is mapped back into the source through the inverse rotation
//! about the image centres and reconstructed with the selected kernel. Interpolation is
//! alpha-weighted so transparent texels do not darken edges. For exact quarter turns every
//! sample lands on a source pixel centre and the kernels collapse to a plain copy, giving the
//! same bytes as [`image::imageops::rotate270`] (90°), `rotate180` and `rotate90` (270°).

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::model::Angle;

/// Reconstruction filter used when sampling between source pixels.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResampleKernel {
    Nearest,
    Bilinear,
    /// Catmull-Rom cubic.
    #[default]
    Bicubic,
}

impl FromStr for ResampleKernel {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" | "nn" => Ok(Self::Nearest),
            "bilinear" | "linear" => Ok(Self::Bilinear),
            "bicubic" | "cubic" | "catmullrom" => Ok(Self::Bicubic),
            _ => Err(()),
        }
    }
}

impl ResampleKernel {
    /// Inclusive range of source indices contributing to a sample at `s`.
    fn taps(self, s: f64) -> (i64, i64) {
        match self {
            Self::Nearest => {
                let c = s.round() as i64;
                (c, c)
            }
            Self::Bilinear => {
                let f = s.floor() as i64;
                (f, f + 1)
            }
            Self::Bicubic => {
                let f = s.floor() as i64;
                (f - 1, f + 2)
            }
        }
    }

    fn weight(self, d: f64) -> f64 {
        let d = d.abs();
        match self {
            Self::Nearest => 1.0,
            Self::Bilinear => (1.0 - d).max(0.0),
            Self::Bicubic => {
                const A: f64 = -0.5;
                if d <= 1.0 {
                    (A + 2.0) * d * d * d - (A + 3.0) * d * d + 1.0
                } else if d < 2.0 {
                    A * d * d * d - 5.0 * A * d * d + 8.0 * A * d - 4.0 * A
                } else {
                    0.0
                }
            }
        }
    }
}

/// `(sin, cos)` of the angle, exact for multiples of 90°.
fn sin_cos(angle: Angle) -> (f64, f64) {
    let deg = angle.degrees().rem_euclid(360.0);
    if deg == 0.0 {
        (0.0, 1.0)
    } else if deg == 90.0 {
        (1.0, 0.0)
    } else if deg == 180.0 {
        (0.0, -1.0)
    } else if deg == 270.0 {
        (-1.0, 0.0)
    } else {
        deg.to_radians().sin_cos()
    }
}

/// Size of the canvas that holds a `w × h` image rotated by `angle`.
///
/// Quarter turns swap the axes exactly; other angles take the bounding box of the rotated
/// rectangle, ignoring sub-pixel slivers.
pub fn rotated_size(w: u32, h: u32, angle: Angle) -> (u32, u32) {
    if w == 0 || h == 0 {
        return (0, 0);
    }
    let (sin, cos) = sin_cos(angle);
    let (w, h) = (w as f64, h as f64);
    let rw = (w * cos).abs() + (h * sin).abs();
    let rh = (w * sin).abs() + (h * cos).abs();
    // 1e-6 absorbs floating error so near-integral extents do not grow by a pixel.
    ((rw - 1e-6).ceil().max(1.0) as u32, (rh - 1e-6).ceil().max(1.0) as u32)
}

/// Rotates `src` counter-clockwise by `angle` with the given kernel.
///
/// The output is sized by [`rotated_size`]; pixels not covered by the source are transparent.
pub fn rotate(src: &RgbaImage, angle: Angle, kernel: ResampleKernel) -> RgbaImage {
    let (sw, sh) = src.dimensions();
    let (dw, dh) = rotated_size(sw, sh, angle);
    let mut out = RgbaImage::new(dw, dh);
    if dw == 0 || dh == 0 {
        return out;
    }
    let (sin, cos) = sin_cos(angle);
    let (scx, scy) = (sw as f64 / 2.0, sh as f64 / 2.0);
    let (dcx, dcy) = (dw as f64 / 2.0, dh as f64 / 2.0);

    for (x, y, px) in out.enumerate_pixels_mut() {
        let dx = x as f64 + 0.5 - dcx;
        let dy = y as f64 + 0.5 - dcy;
        // Inverse of a counter-clockwise turn in y-down coordinates.
        let u = dx * cos - dy * sin;
        let v = dx * sin + dy * cos;
        // Continuous source coordinates in pixel-index space.
        let sx = u + scx - 0.5;
        let sy = v + scy - 0.5;
        *px = sample(src, sx, sy, kernel);
    }
    out
}

fn sample(src: &RgbaImage, sx: f64, sy: f64, kernel: ResampleKernel) -> Rgba<u8> {
    let (w, h) = (src.width() as i64, src.height() as i64);
    let (x0, x1) = kernel.taps(sx);
    let (y0, y1) = kernel.taps(sy);

    // Premultiplied sums drive the colour; straight sums are the fallback when every
    // contributing texel is fully transparent.
    let mut premul = [0.0f64; 3];
    let mut straight = [0.0f64; 3];
    let mut alpha = 0.0f64;

    for ty in y0.max(0)..=y1.min(h - 1) {
        let wy = kernel.weight(sy - ty as f64);
        if wy == 0.0 {
            continue;
        }
        for tx in x0.max(0)..=x1.min(w - 1) {
            let wxy = kernel.weight(sx - tx as f64) * wy;
            if wxy == 0.0 {
                continue;
            }
            let p = src.get_pixel(tx as u32, ty as u32).0;
            let a = p[3] as f64;
            for c in 0..3 {
                premul[c] += p[c] as f64 * a * wxy;
                straight[c] += p[c] as f64 * wxy;
            }
            alpha += a * wxy;
        }
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        out[c] = if alpha > 0.0 {
            clamp_u8(premul[c] / alpha)
        } else {
            clamp_u8(straight[c])
        };
    }
    out[3] = clamp_u8(alpha);
    Rgba(out)
}

fn clamp_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

//! Per-sprite transform: rotate the mask, then cut out the region that was packed.

use image::{RgbaImage, imageops};

use crate::error::{MaskPackerError, Result};
use crate::model::{Angle, Point, Sprite};
use crate::resample::{self, ResampleKernel};

/// Largest canvas or sprite image, in pixels, that will be allocated (1 GiB of RGBA).
pub const MAX_IMAGE_PIXELS: u64 = 1 << 28;

/// Validates `width x height` against [`MAX_IMAGE_PIXELS`] and narrows it to `u32`.
///
/// Negative extents count as zero.
pub fn checked_dimensions(width: i64, height: i64) -> Result<(u32, u32)> {
    let (w, h) = (width.max(0) as u64, height.max(0) as u64);
    let fits = w
        .checked_mul(h)
        .is_some_and(|pixels| pixels <= MAX_IMAGE_PIXELS);
    match (fits, u32::try_from(w), u32::try_from(h)) {
        (true, Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(MaskPackerError::TooLarge {
            width: w,
            height: h,
        }),
    }
}

/// Region to cut out of the rotated mask. `origin` may be negative or run past the mask;
/// uncovered pixels come out transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub origin: Point,
    pub size: Point,
}

/// How to turn a loaded mask into the image placed at `sprite.bounds.position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformPlan {
    /// `None` when the sprite is not rotated.
    pub rotation: Option<Angle>,
    /// Mask size after rotation.
    pub rotated_size: (u32, u32),
    /// `None` when the sprite was not trimmed.
    pub crop: Option<CropRect>,
}

impl TransformPlan {
    /// Size of the image that ends up on the page.
    pub fn placed_size(&self) -> (u32, u32) {
        match self.crop {
            Some(c) => (c.size.x.max(0) as u32, c.size.y.max(0) as u32),
            None => self.rotated_size,
        }
    }
}

/// Computes the transform for `sprite` given the natural size of its mask.
///
/// Fails when the crop cannot be expressed in page coordinates or when an intermediate
/// image would exceed [`MAX_IMAGE_PIXELS`].
pub fn plan(sprite: &Sprite, mask_size: (u32, u32)) -> Result<TransformPlan> {
    let rotation = (!sprite.rotate.is_zero()).then_some(sprite.rotate);
    let rotated_size = match rotation {
        Some(angle) => {
            let (w, h) = resample::rotated_size(mask_size.0, mask_size.1, angle);
            checked_dimensions(w.into(), h.into())?
        }
        None => mask_size,
    };
    let crop = crop_rect(sprite)?;
    if let Some(rect) = crop {
        checked_dimensions(rect.size.x.into(), rect.size.y.into())?;
    }
    Ok(TransformPlan {
        rotation,
        rotated_size,
        crop,
    })
}

/// Crop of the rotated mask that recovers the packed region, or `None` for untrimmed sprites.
///
/// Offsets are (left, bottom) in the original image; the returned origin is top-left based.
/// Quarter-turned sprites use the same formula with both axes swapped. Offsets whose crop
/// origin falls outside the `i32` range are a [`MaskPackerError::Geometry`] error.
pub fn crop_rect(sprite: &Sprite) -> Result<Option<CropRect>> {
    if sprite.is_untrimmed() {
        return Ok(None);
    }
    let size = sprite.bounds.size;
    let orig = sprite.offsets.original_size;
    let off = sprite.offsets.offset;
    // i32 - i32 - i32 always fits in i64.
    let far = |orig: i32, size: i32, off: i32| i64::from(orig) - i64::from(size) - i64::from(off);

    let (x, y, size) = if sprite.is_quarter_turn() {
        (far(orig.y, size.y, off.y), far(orig.x, size.x, off.x), size.swapped())
    } else {
        (i64::from(off.x), far(orig.y, size.y, off.y), size)
    };
    match (i32::try_from(x), i32::try_from(y)) {
        (Ok(x), Ok(y)) => Ok(Some(CropRect {
            origin: Point::new(x, y),
            size,
        })),
        _ => Err(MaskPackerError::Geometry {
            sprite: sprite.name.clone(),
            message: format!("crop origin ({x}, {y}) is out of range"),
        }),
    }
}

/// Copies `rect` out of `img`; pixels outside `img` stay transparent.
pub fn crop(img: &RgbaImage, rect: CropRect) -> Result<RgbaImage> {
    let (w, h) = checked_dimensions(rect.size.x.into(), rect.size.y.into())?;
    let mut out = RgbaImage::new(w, h);
    imageops::replace(
        &mut out,
        img,
        -i64::from(rect.origin.x),
        -i64::from(rect.origin.y),
    );
    Ok(out)
}

/// Applies `plan` to `mask`: rotation first, then the crop.
pub fn apply(plan: &TransformPlan, mask: RgbaImage, kernel: ResampleKernel) -> Result<RgbaImage> {
    let rotated = match plan.rotation {
        Some(angle) => resample::rotate(&mask, angle, kernel),
        None => mask,
    };
    match plan.crop {
        Some(rect) => crop(&rotated, rect),
        None => Ok(rotated),
    }
}

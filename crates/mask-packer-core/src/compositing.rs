use image::{RgbaImage, imageops};
use tracing::{debug, instrument, trace, warn};

use crate::config::ComposeConfig;
use crate::error::Result;
use crate::geometry;
use crate::mask_index::MaskSource;
use crate::model::Page;

/// A composited page canvas together with what went into it.
#[derive(Debug, Clone)]
pub struct ComposedPage {
    pub canvas: RgbaImage,
    /// Sprites whose mask was found and drawn.
    pub painted: usize,
    /// Sprite names with no matching mask, in draw order.
    pub skipped: Vec<String>,
}

/// Paints the mask of every sprite of `page` onto a transparent canvas of the page size.
///
/// Sprites are drawn in list order with source-over blending, so later sprites cover earlier
/// ones. A sprite without a mask is skipped with a warning. Unless `cfg.keep_alpha` is set the
/// finished canvas is made fully opaque.
#[instrument(skip_all, fields(page = %page.name))]
pub fn compose_page<M>(page: &Page, masks: &M, cfg: &ComposeConfig) -> Result<ComposedPage>
where
    M: MaskSource + ?Sized,
{
    let (w, h) = geometry::checked_dimensions(page.size.x.into(), page.size.y.into())?;
    let mut canvas = RgbaImage::new(w, h);
    if page.premultiplied_alpha {
        debug!("page declares premultiplied alpha; compositing with straight alpha");
    }

    let mut painted = 0usize;
    let mut skipped = Vec::new();
    for sprite in &page.sprites {
        let Some(mask) = masks.load_mask(&sprite.name)? else {
            warn!(sprite = %sprite.name, "skipped sprite: no matching mask");
            skipped.push(sprite.name.clone());
            continue;
        };
        let plan = geometry::plan(sprite, mask.dimensions())?;
        let placed = geometry::apply(&plan, mask, cfg.kernel)?;
        trace!(
            sprite = %sprite.name,
            at = %sprite.bounds.position,
            size = ?placed.dimensions(),
            "painting"
        );
        imageops::overlay(
            &mut canvas,
            &placed,
            sprite.bounds.position.x as i64,
            sprite.bounds.position.y as i64,
        );
        painted += 1;
    }

    if !cfg.keep_alpha {
        strip_alpha(&mut canvas);
    }
    Ok(ComposedPage {
        canvas,
        painted,
        skipped,
    })
}

/// Forces every pixel fully opaque, leaving colour untouched.
pub fn strip_alpha(canvas: &mut RgbaImage) {
    for px in canvas.pixels_mut() {
        px.0[3] = u8::MAX;
    }
}

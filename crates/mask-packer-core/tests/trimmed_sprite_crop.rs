mod common;

use common::masks;
use image::{Rgba, RgbaImage};
use mask_packer_core::prelude::*;

/// Every pixel encodes its coordinates, so the crop origin is readable from the output.
fn coord_mask(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, 7, 255]))
}

#[test]
fn trimmed_sprite_is_cut_from_bottom_left_offset() {
    let atlas = "page.png\nsize: 64,64\narm\n  bounds: 10,4,30,40\n  offsets: 5,10,40,60\n  rotate: false\n";
    let pages = decode_atlas_str(atlas).expect("decode");
    let masks = masks([("arm", coord_mask(40, 60))]);
    let cfg = ComposeConfig::builder().keep_alpha(true).build();

    let out = compose_page(&pages[0], &masks, &cfg).expect("compose");
    let c = &out.canvas;
    // Mask (5,10) lands on the sprite's top-left corner.
    assert_eq!(c.get_pixel(10, 4).0, [5, 10, 7, 255]);
    assert_eq!(c.get_pixel(39, 43).0, [34, 49, 7, 255]);
    assert_eq!(c.get_pixel(40, 4).0[3], 0);
    assert_eq!(c.get_pixel(10, 44).0[3], 0);
}

#[test]
fn rotated_sprite_occupies_swapped_footprint() {
    let atlas = "page.png\nsize: 64,64\narm\n  bounds: 0,0,30,40\n  offsets: 5,10,40,60\n  rotate: true\n";
    let pages = decode_atlas_str(atlas).expect("decode");
    let sprite = &pages[0].sprites[0];
    let plan = mask_packer_core::geometry::plan(sprite, (40, 60)).expect("plan");
    assert_eq!(plan.placed_size(), (40, 30));

    let masks = masks([("arm", coord_mask(40, 60))]);
    let cfg = ComposeConfig::builder()
        .keep_alpha(true)
        .kernel(ResampleKernel::Nearest)
        .build();
    let out = compose_page(&pages[0], &masks, &cfg).expect("compose");
    let c = &out.canvas;
    // Rotated counter-clockwise, then cut at (10,5): the corners come from mask columns 34 and 5.
    assert_eq!(c.get_pixel(0, 0).0, [34, 10, 7, 255]);
    assert_eq!(c.get_pixel(39, 0).0, [34, 49, 7, 255]);
    assert_eq!(c.get_pixel(0, 29).0, [5, 10, 7, 255]);
    assert_eq!(c.get_pixel(39, 29).0, [5, 49, 7, 255]);
    assert_eq!(c.get_pixel(40, 0).0[3], 0);
    assert_eq!(c.get_pixel(0, 30).0[3], 0);
}

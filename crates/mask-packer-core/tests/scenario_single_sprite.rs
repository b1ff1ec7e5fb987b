mod common;

use common::{masks, solid_image};
use mask_packer_core::prelude::*;

const ATLAS: &str = "
p.png
size: 100,100
format: RGBA8888
filter: Linear,Linear
repeat: none
hero
  rotate: false
  bounds: 0,0,50,50
  index: -1
";

#[test]
fn decodes_single_page_with_default_offsets() {
    let pages = decode_atlas_str(ATLAS).expect("decode");
    assert_eq!(pages.len(), 1);
    let page = &pages[0];
    assert_eq!(page.name, "p.png");
    assert_eq!(page.size, Point::new(100, 100));
    assert_eq!(page.sprites.len(), 1);

    let hero = &page.sprites[0];
    assert_eq!(hero.name, "hero");
    assert_eq!(hero.bounds.position, Point::new(0, 0));
    assert_eq!(hero.bounds.size, Point::new(50, 50));
    assert_eq!(hero.offsets.offset, Point::new(0, 0));
    assert_eq!(hero.offsets.original_size, Point::new(50, 50));
    assert_eq!(hero.rotate, Angle(0.0));
}

#[test]
fn paints_red_square_on_transparent_canvas() {
    let pages = decode_atlas_str(ATLAS).expect("decode");
    let masks = masks([("hero", solid_image(50, 50, [255, 0, 0, 255]))]);
    let cfg = ComposeConfig::builder().keep_alpha(true).build();

    let out = compose_page(&pages[0], &masks, &cfg).expect("compose");
    assert_eq!(out.painted, 1);
    assert!(out.skipped.is_empty());
    assert_eq!(out.canvas.dimensions(), (100, 100));
    for (x, y, px) in out.canvas.enumerate_pixels() {
        if x < 50 && y < 50 {
            assert_eq!(px.0, [255, 0, 0, 255], "({x},{y})");
        } else {
            assert_eq!(px.0[3], 0, "({x},{y})");
        }
    }
}

#[test]
fn without_alpha_background_is_opaque_black() {
    let pages = decode_atlas_str(ATLAS).expect("decode");
    let masks = masks([("hero", solid_image(50, 50, [255, 0, 0, 255]))]);

    let out = compose_page(&pages[0], &masks, &ComposeConfig::default()).expect("compose");
    assert_eq!(out.canvas.get_pixel(10, 10).0, [255, 0, 0, 255]);
    assert_eq!(out.canvas.get_pixel(75, 75).0, [0, 0, 0, 255]);
}

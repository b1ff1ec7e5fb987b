mod common;

use common::{masks, scratch_dir, solid_image, write_png};
use mask_packer_core::prelude::*;

const ATLAS: &str = "\
left.png
size: 16,16
a
  bounds: 0,0,8,8

right.png
size: 16,16
b
  bounds: 8,8,8,8
ghost
  bounds: 0,0,4,4
";

#[test]
fn both_pages_written_when_one_has_missing_masks() {
    let out_dir = scratch_dir("two-pages-missing");
    let pages = decode_atlas_str(ATLAS).expect("decode");
    assert_eq!(pages.len(), 2);
    let masks = masks([
        ("a", solid_image(8, 8, [0, 255, 0, 255])),
        ("b", solid_image(8, 8, [0, 0, 255, 255])),
    ]);

    let reports = pack_masks(&pages, &masks, &ComposeConfig::default(), &out_dir).expect("pack");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].page, "left.png");
    assert_eq!(reports[0].painted, 1);
    assert_eq!(reports[1].painted, 1);
    assert_eq!(reports[1].skipped, vec!["ghost".to_string()]);

    let left = image::open(out_dir.join("left_masks.png")).expect("left").to_rgba8();
    let right = image::open(out_dir.join("right_masks.png")).expect("right").to_rgba8();
    assert_eq!(left.get_pixel(0, 0).0, [0, 255, 0, 255]);
    assert_eq!(right.get_pixel(15, 15).0, [0, 0, 255, 255]);
    assert_eq!(right.get_pixel(0, 0).0, [0, 0, 0, 255]);
}

#[test]
fn failing_page_does_not_stop_the_others() {
    let root = scratch_dir("two-pages-corrupt");
    let mask_dir = root.join("masks");
    let out_dir = root.join("out");
    write_png(&mask_dir.join("a.png"), &solid_image(8, 8, [9, 9, 9, 255]));
    std::fs::write(mask_dir.join("b.png"), b"definitely not a png").expect("write");

    let pages = decode_atlas_str(ATLAS).expect("decode");
    let index = MaskIndex::scan(&mask_dir).expect("scan");
    let err = pack_masks(&pages, &index, &ComposeConfig::default(), &out_dir)
        .expect_err("right page must fail");

    match err {
        MaskPackerError::Job { page, source } => {
            assert_eq!(page, "right.png");
            assert!(matches!(*source, MaskPackerError::Image(_)), "{source:?}");
        }
        other => panic!("expected Job error, got {other:?}"),
    }
    assert!(out_dir.join("left_masks.png").exists());
    assert!(!out_dir.join("right_masks.png").exists());
}

#[test]
fn first_error_in_page_order_is_reported() {
    let out_dir = scratch_dir("two-pages-first-error");
    let pages = decode_atlas_str(ATLAS).expect("decode");
    // Every page fails; the first page's error wins.
    struct Broken;
    impl MaskSource for Broken {
        fn load_mask(&self, name: &str) -> mask_packer_core::Result<Option<image::RgbaImage>> {
            Err(MaskPackerError::InvalidConfig(format!("no {name}")))
        }
        fn has_mask(&self, _: &str) -> bool {
            true
        }
    }

    let err = pack_masks(&pages, &Broken, &ComposeConfig::default(), &out_dir).expect_err("fail");
    match err {
        MaskPackerError::Job { page, .. } => assert_eq!(page, "left.png"),
        other => panic!("expected Job error, got {other:?}"),
    }
}

mod common;

use common::{masks, scratch_dir, solid_image};
use mask_packer_core::prelude::*;

const ATLAS: &str = "sheet.png\nsize: 8,8\ndot\n  bounds: 2,2,4,4\n";

#[test]
fn jpeg_output_is_rgb_and_named_with_jpg_extension() {
    let out_dir = scratch_dir("format-jpg");
    let pages = decode_atlas_str(ATLAS).expect("decode");
    let masks = masks([("dot", solid_image(4, 4, [255, 255, 255, 255]))]);
    let cfg = ComposeConfig::builder()
        .format("jpg".parse().expect("format"))
        .suffix("m")
        .build();

    let reports = pack_masks(&pages, &masks, &cfg, &out_dir).expect("pack");
    assert_eq!(reports[0].output, out_dir.join("sheet_m.jpg"));
    let img = image::open(&reports[0].output).expect("open");
    assert_eq!(img.color(), image::ColorType::Rgb8);
    assert_eq!((img.width(), img.height()), (8, 8));
}

#[test]
fn png_keeps_alpha_when_asked() {
    let out_dir = scratch_dir("format-png-alpha");
    let pages = decode_atlas_str(ATLAS).expect("decode");
    let masks = masks([("dot", solid_image(4, 4, [10, 20, 30, 255]))]);
    let cfg = ComposeConfig::builder().keep_alpha(true).build();

    let reports = pack_masks(&pages, &masks, &cfg, &out_dir).expect("pack");
    let img = image::open(&reports[0].output).expect("open").to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0[3], 0);
    assert_eq!(img.get_pixel(3, 3).0, [10, 20, 30, 255]);
}

#[test]
fn invalid_suffix_fails_before_any_work() {
    let out_dir = scratch_dir("format-bad-suffix").join("never");
    let pages = decode_atlas_str(ATLAS).expect("decode");
    let cfg = ComposeConfig::builder().suffix("../x").build();
    let masks = masks([]);

    let err = pack_masks(&pages, &masks, &cfg, &out_dir).expect_err("invalid");
    assert!(matches!(err, MaskPackerError::InvalidConfig(_)));
    assert!(!out_dir.exists());
}

#[test]
fn dry_run_reports_lookups_without_writing() {
    let out_dir = scratch_dir("format-dry-run").join("never");
    let pages = decode_atlas_str("a.png\nsize: 4,4\nx\n  bounds: 0,0,1,1\ny\n  bounds: 1,1,1,1\n")
        .expect("decode");
    let masks = masks([("y", solid_image(1, 1, [0, 0, 0, 255]))]);

    let reports = dry_run(&pages, &masks, &ComposeConfig::default(), &out_dir);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].painted, 1);
    assert_eq!(reports[0].skipped, vec!["x".to_string()]);
    assert_eq!(reports[0].output, out_dir.join("a_masks.png"));
    assert!(!out_dir.exists());
}

#[test]
fn pages_named_like_indexed_outputs_do_not_overwrite_each_other() {
    let out_dir = scratch_dir("format-name-collision");
    let atlas = "b\nsize: 1,1\nr\n  bounds: 0,0,1,1\n\nb\nsize: 1,1\ng\n  bounds: 0,0,1,1\n\nb_00\nsize: 1,1\nu\n  bounds: 0,0,1,1\n";
    let pages = decode_atlas_str(atlas).expect("decode");
    let masks = masks([
        ("r", solid_image(1, 1, [255, 0, 0, 255])),
        ("g", solid_image(1, 1, [0, 255, 0, 255])),
        ("u", solid_image(1, 1, [0, 0, 255, 255])),
    ]);
    let cfg = ComposeConfig::builder().suffix("00").build();

    let reports = pack_masks(&pages, &masks, &cfg, &out_dir).expect("pack");
    let colours: Vec<[u8; 4]> = reports
        .iter()
        .map(|r| image::open(&r.output).expect("open").to_rgba8().get_pixel(0, 0).0)
        .collect();
    assert_eq!(
        colours,
        vec![[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]]
    );
}

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};
use mask_packer_core::prelude::*;
use std::collections::HashMap;
use std::hint::black_box;

fn generate_atlas(sprites: usize, rotate: &str) -> String {
    let mut text = String::from("bench.png\nsize: 1024,1024\nformat: RGBA8888\n");
    for i in 0..sprites {
        let (x, y) = ((i % 16) as i32 * 64, (i / 16) as i32 * 64);
        text.push_str(&format!(
            "s{i}\n  rotate: {rotate}\n  bounds: {x},{y},56,48\n  offsets: 4,6,64,60\n  index: -1\n"
        ));
    }
    text
}

fn generate_masks(count: usize) -> HashMap<String, RgbaImage> {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            let img = RgbaImage::from_fn(64, 60, |_, _| Rgba(rng.r#gen::<[u8; 4]>()));
            (format!("s{i}"), img)
        })
        .collect()
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_atlas");
    for count in [64usize, 256] {
        let text = generate_atlas(count, "false");
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &text, |b, text| {
            b.iter(|| black_box(decode_atlas_str(text).expect("decode")));
        });
    }
    group.finish();
}

fn bench_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose_page");
    let masks = generate_masks(128);

    for (label, rotate) in [("upright", "false"), ("quarter_turn", "true"), ("angle_30", "30")] {
        let pages = decode_atlas_str(&generate_atlas(128, rotate)).expect("decode");
        for kernel in [
            ResampleKernel::Nearest,
            ResampleKernel::Bilinear,
            ResampleKernel::Bicubic,
        ] {
            let cfg = ComposeConfig::builder().kernel(kernel).build();
            group.bench_with_input(
                BenchmarkId::new(label, format!("{kernel:?}")),
                &pages[0],
                |b, page| {
                    b.iter(|| black_box(compose_page(page, &masks, &cfg).expect("compose")));
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_decode, bench_compose);
criterion_main!(benches);

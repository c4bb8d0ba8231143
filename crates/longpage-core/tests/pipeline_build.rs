use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use longpage_core::error::LongPageError;
use longpage_core::prelude::*;
use longpage_core::{MAX_JPEG_HEIGHT, sanitize_base_name, to_json_summary};
use std::io::Cursor;

fn asset(name: &str, w: u32, h: u32, c: [u8; 3]) -> ImageAsset {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(c)));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    ImageAsset::from_bytes(name, buf).expect("decode")
}

fn many(n: usize, h: u32) -> Vec<ImageAsset> {
    (0..n)
        .map(|i| asset(&format!("{i}.png"), 900, h, [i as u8 * 10, 40, 200]))
        .collect()
}

#[test]
fn three_images_compose_at_expected_offsets() {
    let assets = vec![
        asset("a.png", 900, 500, [200, 0, 0]),
        asset("b.png", 900, 400, [0, 200, 0]),
        asset("c.png", 900, 600, [0, 0, 200]),
    ];
    let out = build(&assets, "spring sale", &BuildConfig::default()).expect("build");

    assert_eq!(out.base_name, "spring_sale");
    assert_eq!(out.plan.offsets(), vec![180, 980, 1680]);
    assert_eq!(out.composite.dimensions(), (900, 2530));
    assert_eq!(*out.composite.get_pixel(10, 100), Rgb([255, 255, 255]));
    assert_eq!(*out.composite.get_pixel(10, 180), Rgb([200, 0, 0]));
    assert_eq!(*out.composite.get_pixel(10, 679), Rgb([200, 0, 0]));
    assert_eq!(*out.composite.get_pixel(10, 700), Rgb([255, 255, 255]));
    assert_eq!(*out.composite.get_pixel(899, 980), Rgb([0, 200, 0]));
    assert_eq!(*out.composite.get_pixel(450, 2279), Rgb([0, 0, 200]));
    assert_eq!(*out.composite.get_pixel(450, 2280), Rgb([255, 255, 255]));

    let decoded = image::load_from_memory(&out.composite_jpeg).expect("jpeg");
    assert_eq!((decoded.width(), decoded.height()), (900, 2530));

    assert_eq!(out.partitions.len(), 1);
    let script = &out.partitions[0].script;
    assert_eq!(script.entries.iter().map(|e| e.y).collect::<Vec<_>>(), vec![180, 980, 1680]);
    assert_eq!(script.height, 2530);
}

#[test]
fn single_partition_bundle_layout() {
    let out = build(&many(3, 50), "page", &BuildConfig::default()).expect("build");
    assert_eq!(
        out.bundle.paths(),
        vec![
            "page.jpg",
            "README.txt",
            "page_psd_build.jsx",
            "images/img_01.jpg",
            "images/img_02.jpg",
            "images/img_03.jpg",
        ]
    );
    let first = out.bundle.get("images/img_01.jpg").expect("asset");
    let decoded = image::load_from_memory(first).expect("decode asset");
    assert_eq!((decoded.width(), decoded.height()), (900, 50));
}

#[test]
fn twelve_images_split_into_two_scripts() {
    let out = build(&many(12, 40), "sale", &BuildConfig::default()).expect("build");
    assert_eq!(out.composite.height(), 180 + 250 + 12 * 40 + 11 * 300);
    assert_eq!(out.partitions.len(), 2);

    let (p1, p2) = (&out.partitions[0], &out.partitions[1]);
    assert_eq!(p1.partition.len(), 10);
    assert_eq!(p2.partition.len(), 2);
    assert_eq!(p1.names.folder, "images_part1");
    assert_eq!(p2.names.script, "sale_part2_psd_build.jsx");
    assert_eq!(p2.script.entries[0].y, 180);
    assert_eq!(p2.script.height, 180 + 250 + 2 * 40 + 300);
    assert_eq!(p2.files[1].0, "img_02.jpg");

    let paths = out.bundle.paths();
    assert!(paths.contains(&"sale_part1_psd_build.jsx"));
    assert!(paths.contains(&"images_part1/img_10.jpg"));
    assert!(paths.contains(&"images_part2/img_02.jpg"));
    assert!(!paths.contains(&"images_part2/img_03.jpg"));
    assert_eq!(out.summary.partition_sizes, vec![10, 2]);
}

#[test]
fn resized_inputs_line_up_with_script_offsets() {
    let assets = vec![
        asset("wide.png", 1800, 1000, [10, 10, 10]),
        asset("narrow.png", 300, 100, [20, 20, 20]),
    ];
    let out = build(&assets, "mix", &BuildConfig::default()).expect("build");
    assert_eq!(out.plan.offsets(), vec![180, 180 + 500 + 300]);
    let script = &out.partitions[0].script;
    assert_eq!(
        script.entries.iter().map(|e| e.y).collect::<Vec<_>>(),
        out.plan.offsets()
    );
    assert_eq!(out.composite.height(), 180 + 500 + 300 + 300 + 250);
}

#[test]
fn empty_snapshot_builds_nothing() {
    assert!(matches!(
        build(&[], "x", &BuildConfig::default()),
        Err(LongPageError::Empty)
    ));
}

#[test]
fn too_many_images_fail_before_anything_is_produced() {
    let cfg = BuildConfig::builder().max_per_group(2).max_total(4).build();
    assert!(matches!(
        build(&many(5, 10), "x", &cfg),
        Err(LongPageError::GroupLimitExceeded { count: 5, .. })
    ));
}

#[test]
fn composite_taller_than_jpeg_limit_fails_before_composing() {
    let cfg = BuildConfig::builder().gap(70_000).build();
    match build(&many(2, 10), "tall", &cfg) {
        Err(LongPageError::CanvasTooTall { height, max }) => {
            assert_eq!(height, 180 + 250 + 2 * 10 + 70_000);
            assert_eq!(max, MAX_JPEG_HEIGHT);
        }
        Err(other) => panic!("expected CanvasTooTall, got {other}"),
        Ok(_) => panic!("expected CanvasTooTall, got a build"),
    }
}

#[test]
fn exactly_the_jpeg_limit_still_builds() {
    // 180 + 250 + 2 * 10 + gap == 65535, kept narrow to stay cheap
    let cfg = BuildConfig::builder().canvas_width(8).gap(65_085).build();
    let assets = vec![
        asset("a.png", 8, 10, [1, 1, 1]),
        asset("b.png", 8, 10, [2, 2, 2]),
    ];
    let out = build(&assets, "edge", &cfg).expect("build");
    assert_eq!(out.composite.height(), MAX_JPEG_HEIGHT);
}

#[test]
fn overflowing_spacing_is_reported() {
    let cfg = BuildConfig::builder().gap(u32::MAX / 2).build();
    assert!(matches!(
        build(&many(3, 10), "x", &cfg),
        Err(LongPageError::LayoutOverflow { count: 3 })
    ));
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = BuildConfig::builder().canvas_width(0).build();
    assert!(matches!(
        build(&many(1, 10), "x", &cfg),
        Err(LongPageError::InvalidDimensions { .. })
    ));
}

#[test]
fn repeated_fingerprints_are_dropped() {
    let a = asset("a.png", 900, 30, [1, 2, 3]);
    let b = asset("b.png", 900, 30, [4, 5, 6]);
    let out = build(&[a.clone(), b, a], "d", &BuildConfig::default()).expect("build");
    assert_eq!(out.summary.count, 2);
}

#[test]
fn archive_bytes_are_deterministic() {
    let assets = many(2, 20);
    let cfg = BuildConfig::default();
    let a = build(&assets, "d", &cfg).expect("build").archive_bytes().expect("zip");
    let b = build(&assets, "d", &cfg).expect("build").archive_bytes().expect("zip");
    assert_eq!(a, b);
}

#[test]
fn summary_describes_the_build() {
    let out = build(&many(12, 40), "sale", &BuildConfig::default()).expect("build");
    let s = &out.summary;
    assert_eq!(s.app, "longpage");
    assert_eq!(s.count, 12);
    assert_eq!(s.partitions, 2);
    assert_eq!(s.total_height, out.composite.height());
    assert_eq!(s.archive_entries.len(), out.bundle.entries.len());
    assert!(s.describe().contains("12 images"));

    let json = to_json_summary(s);
    assert_eq!(json["meta"]["name"], "sale");
    assert_eq!(json["layout"]["totalHeight"], s.total_height);
    assert_eq!(json["partitions"][1]["count"], 2);
    assert_eq!(json["partitions"][1]["number"], 2);
}

#[test]
fn base_names_are_sanitized() {
    assert_eq!(sanitize_base_name("  spring   sale 2026 "), "spring_sale_2026");
    assert_eq!(sanitize_base_name("a/b\\c:d*e"), "abcde");
    assert_eq!(sanitize_base_name("상세 페이지"), "상세_페이지");
    assert_eq!(sanitize_base_name("!!!"), "detail_page");
    assert_eq!(sanitize_base_name(""), "detail_page");
    assert_eq!(sanitize_base_name(&"x".repeat(200)).len(), 80);
}

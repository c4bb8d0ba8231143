use image::{Rgb, RgbImage};
use longpage_core::compositing::{blit_rgb, compose_long};
use longpage_core::error::LongPageError;
use longpage_core::prelude::*;

fn solid(key: &str, w: u32, h: u32, c: [u8; 3]) -> NormalizedImage {
    NormalizedImage {
        key: key.into(),
        rgb: RgbImage::from_pixel(w, h, Rgb(c)),
    }
}

#[test]
fn images_land_at_plan_offsets_over_background() {
    let images = vec![
        solid("a", 20, 5, [255, 0, 0]),
        solid("b", 20, 3, [0, 255, 0]),
    ];
    let spacing = Spacing {
        top: 2,
        bottom: 4,
        gap: 6,
    };
    let plan = LayoutPlan::for_images(&images, 20, spacing).expect("plan");
    assert_eq!(plan.offsets(), vec![2, 13]);

    let canvas = compose_long(&images, &plan, [255, 255, 255]).expect("compose");
    assert_eq!(canvas.dimensions(), (20, 2 + 5 + 6 + 3 + 4));

    let white = Rgb([255, 255, 255]);
    for y in 0..canvas.height() {
        let expected = match y {
            2..=6 => Rgb([255, 0, 0]),
            13..=15 => Rgb([0, 255, 0]),
            _ => white,
        };
        for x in 0..canvas.width() {
            assert_eq!(*canvas.get_pixel(x, y), expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn custom_background_fills_padding() {
    let images = vec![solid("a", 4, 1, [0, 0, 0])];
    let spacing = Spacing {
        top: 1,
        bottom: 1,
        gap: 0,
    };
    let plan = LayoutPlan::for_images(&images, 4, spacing).expect("plan");
    let canvas = compose_long(&images, &plan, [10, 20, 30]).expect("compose");
    assert_eq!(*canvas.get_pixel(0, 0), Rgb([10, 20, 30]));
    assert_eq!(*canvas.get_pixel(0, 1), Rgb([0, 0, 0]));
    assert_eq!(*canvas.get_pixel(3, 2), Rgb([10, 20, 30]));
}

#[test]
fn mismatched_inputs_are_rejected() {
    let images = vec![solid("a", 4, 2, [0, 0, 0])];
    let spacing = Spacing::default();

    let wrong_width = plan_layout(5, &[2], spacing).expect("plan");
    assert!(matches!(
        compose_long(&images, &wrong_width, [255; 3]),
        Err(LongPageError::InvalidInput(_))
    ));
    let wrong_count = plan_layout(4, &[2, 2], spacing).expect("plan");
    assert!(matches!(
        compose_long(&images, &wrong_count, [255; 3]),
        Err(LongPageError::InvalidInput(_))
    ));
    let empty = plan_layout(4, &[], spacing).expect("plan");
    assert!(matches!(
        compose_long(&[], &empty, [255; 3]),
        Err(LongPageError::Empty)
    ));
}

#[test]
fn blit_clips_at_canvas_edges() {
    let src = RgbImage::from_pixel(4, 4, Rgb([9, 9, 9]));
    let mut canvas = RgbImage::from_pixel(5, 5, Rgb([0, 0, 0]));
    blit_rgb(&src, &mut canvas, 3, 3);
    assert_eq!(*canvas.get_pixel(4, 4), Rgb([9, 9, 9]));
    assert_eq!(*canvas.get_pixel(2, 2), Rgb([0, 0, 0]));
    assert_eq!(canvas.pixels().filter(|p| p.0 == [9, 9, 9]).count(), 4);
}

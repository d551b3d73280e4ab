use approx::assert_relative_eq;
use ors::app::{read_map_bin, run_ors, write_map_bin, InputScale, Mode, OrsConfig};
use ors::response::ors_response_u8;
use ors::{ors_response_image, ors_response_image_unit, IntegrandMode, OrsMap, OrsParams};
use image::GrayImage;
use std::path::PathBuf;

fn make_gradient_image(w: u32, h: u32) -> GrayImage {
    let mut data = Vec::with_capacity((w * h) as usize);
    for y in 0..h {
        for x in 0..w {
            data.push(((7 * x + 3 * y * y) % 255) as u8);
        }
    }
    GrayImage::from_vec(w, h, data).expect("gradient image")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ors-api-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

#[test]
fn image_helper_matches_core_kernel() {
    let params = OrsParams::default().with_half_size(3);
    let img = make_gradient_image(24, 18);

    let helper = ors_response_image(&img, &params).unwrap();
    let core = ors_response_u8(img.as_raw(), 24, 18, &params).unwrap();

    assert_eq!((helper.w, helper.h), (core.w, core.h));
    assert_eq!(helper.data, core.data);
}

#[test]
fn unit_scale_shrinks_slopes() {
    // heights / 255 give much smaller slopes than raw levels, so the
    // normalized map is bounded by the levels map everywhere
    let params = OrsParams::default()
        .with_half_size(2)
        .with_mode(IntegrandMode::Direct);
    let img = make_gradient_image(16, 16);
    let unit = ors_response_image_unit(&img, &params).unwrap();
    let levels = ors_response_image(&img, &params).unwrap();
    for (u, l) in unit.data.iter().zip(&levels.data) {
        assert!(u <= l, "{u} > {l}");
    }
}

#[test]
fn binary_map_round_trips_at_f32_precision() {
    let dir = scratch_dir("bin");
    let path = dir.join("map.bin");
    let map = OrsMap {
        w: 3,
        h: 2,
        data: vec![0.0, 1.5, 2.25, 1e-3, 7.0, 123.456],
    };
    write_map_bin(&path, &map).unwrap();
    let back = read_map_bin(&path).unwrap();
    assert_eq!((back.w, back.h), (3, 2));
    for (a, b) in map.data.iter().zip(&back.data) {
        // stored as f32
        assert_relative_eq!(*a, *b, max_relative = 1e-6);
    }
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn run_ors_writes_summary_and_map() {
    let dir = scratch_dir("run");
    let img_path = dir.join("input.png");
    let img = make_gradient_image(30, 22);
    img.save(&img_path).unwrap();

    let mut cfg = OrsConfig::new(&img_path);
    cfg.half_size = Some(4);
    cfg.output_json = Some(dir.join("out.json"));
    cfg.output_bin = Some(dir.join("out.bin"));

    let dump = run_ors(&cfg).unwrap();
    assert_eq!((dump.width, dump.height), (30, 22));
    assert_eq!((dump.ors_width, dump.ors_height), (22, 14));
    assert_eq!(dump.mode, Mode::Catalogue);
    assert_eq!(dump.input_scale, InputScale::Levels);
    assert!(dump.stats.max >= dump.stats.mean && dump.stats.mean >= dump.stats.min);

    let written = read_map_bin(&dir.join("out.bin")).unwrap();
    let expected = ors_response_image(&img, &cfg.params().unwrap()).unwrap();
    assert_eq!((written.w, written.h), (expected.w, expected.h));
    for (a, b) in written.data.iter().zip(&expected.data) {
        // stored as f32
        assert_relative_eq!(*a, *b, max_relative = 1e-6);
    }

    let json: serde_json::Value =
        serde_json::from_reader(std::fs::File::open(dir.join("out.json")).unwrap()).unwrap();
    assert_eq!(json["mode"], "catalogue");
    assert_eq!(json["half_size"], 4);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn run_ors_rejects_image_smaller_than_window() {
    let dir = scratch_dir("small");
    let img_path = dir.join("tiny.png");
    make_gradient_image(6, 6).save(&img_path).unwrap();

    let mut cfg = OrsConfig::new(&img_path);
    cfg.half_size = Some(3);
    cfg.output_json = Some(dir.join("out.json"));
    cfg.output_bin = Some(dir.join("out.bin"));

    let err = run_ors(&cfg).unwrap_err();
    assert!(format!("{err:#}").contains("too small"));
    assert!(!dir.join("out.bin").exists());

    std::fs::remove_dir_all(&dir).ok();
}

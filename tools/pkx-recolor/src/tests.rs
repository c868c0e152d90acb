use super::*;
use image::{ColorType, ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage};
use recolor::ScaleStrategy;
use tempdir::TempDir;

/// XD-style model (bytes 0 and 0x40 differ) with colors at 0x73.
fn xd_model(color1: [u8; 4], color2: [u8; 4]) -> Vec<u8> {
    let mut data = vec![0u8; 0x100];
    data[0] = 0x01;
    data[0x40] = 0x02;
    for (i, byte) in color1.iter().enumerate() {
        data[0x73 + i * 4] = *byte;
    }
    data[0x80..0x84].copy_from_slice(&color2);
    data
}

fn write_png(path: &Path, px: [u8; 4]) {
    RgbaImage::from_pixel(2, 1, Rgba(px))
        .save(path)
        .expect("failed to write test texture");
}

fn make_roots() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new("pkx-recolor").expect("failed to create temp dir");
    let input = tmp.path().join("game");
    let output = tmp.path().join("out");
    fs::create_dir(&input).expect("failed to create input root");
    fs::create_dir(&output).expect("failed to create output root");
    (tmp, input, output)
}

fn make_asset(input: &Path, name: &str) -> PathBuf {
    let dir = input.join(name);
    fs::create_dir(&dir).expect("failed to create asset dir");
    dir
}

#[test]
fn config_defaults_match_game_layout() {
    let config = Config::default();
    assert_eq!(config.asset_prefix, "pkx_");
    assert_eq!(config.model_extension, "pkx");
    assert_eq!(config.texture_extension, "png");
    assert_eq!(config.strategy, ScaleStrategy::Fused);
    assert_eq!(config.jobs, 0);
}

#[test]
fn config_parses_partial_toml() {
    let config = Config::parse("strategy = \"sequential\"\njobs = 2\n").expect("valid config");
    assert_eq!(config.strategy, ScaleStrategy::Sequential);
    assert_eq!(config.jobs, 2);
    assert_eq!(config.asset_prefix, "pkx_");
}

#[test]
fn config_rejects_unknown_fields() {
    assert!(Config::parse("colour = 1\n").is_err());
    assert!(Config::parse("strategy = \"blend\"\n").is_err());
}

#[test]
fn config_load_reports_path() {
    let tmp = TempDir::new("pkx-recolor").expect("failed to create temp dir");
    let path = tmp.path().join("bad.toml");
    fs::write(&path, "jobs = \"many\"\n").expect("failed to write config");
    let err = Config::load(&path).unwrap_err();
    assert!(
        matches!(&err, Error::Config { path: p, .. } if p == &path),
        "unexpected error: {err:?}"
    );
}

#[test]
fn discover_assets_filters_prefix_and_sorts() {
    let (_tmp, input, _output) = make_roots();
    make_asset(&input, "pkx_b");
    make_asset(&input, "pkx_a");
    make_asset(&input, "other");
    fs::write(input.join("pkx_file"), b"not a folder").expect("failed to write file");

    let names: Vec<String> = discover_assets(&input, "pkx_")
        .expect("failed to discover")
        .into_iter()
        .map(|asset| asset.name)
        .collect();
    assert_eq!(names, vec!["pkx_a", "pkx_b"]);
}

#[test]
fn find_model_requires_exactly_one() {
    let (_tmp, input, _output) = make_roots();
    let dir = make_asset(&input, "pkx_many");
    let asset = Asset {
        name: String::from("pkx_many"),
        dir: dir.clone(),
    };

    let err = find_model(&asset, "pkx").unwrap_err();
    assert!(matches!(err, Error::AssetDiscovery { found: 0, .. }), "{err:?}");

    fs::write(dir.join("one.pkx"), b"").expect("failed to write model");
    assert_eq!(find_model(&asset, "pkx").expect("one model"), dir.join("one.pkx"));

    fs::write(dir.join("two.PKX"), b"").expect("failed to write model");
    let err = find_model(&asset, "pkx").unwrap_err();
    assert!(matches!(err, Error::AssetDiscovery { found: 2, .. }), "{err:?}");
}

#[test]
fn run_rejects_missing_roots() {
    let (tmp, input, output) = make_roots();
    let missing = tmp.path().join("missing");

    let err = run(&missing, &output, &Config::default(), None).unwrap_err();
    assert!(matches!(err, Error::Path { role: "input", .. }), "{err:?}");

    let file = tmp.path().join("file");
    fs::write(&file, b"").expect("failed to write file");
    let err = run(&input, &file, &Config::default(), None).unwrap_err();
    assert!(matches!(err, Error::Path { role: "output", .. }), "{err:?}");
}

#[test]
fn run_recolors_textures_and_skips_broken_assets() {
    let (_tmp, input, output) = make_roots();

    let good = make_asset(&input, "pkx_good");
    fs::write(good.join("model.pkx"), xd_model([1, 0, 2, 3], [0, 255, 127, 255]))
        .expect("failed to write model");
    write_png(&good.join("body.png"), [10, 20, 30, 40]);
    write_png(&good.join("eyes.png"), [200, 100, 50, 255]);
    fs::write(good.join("notes.txt"), b"ignored").expect("failed to write notes");

    let twins = make_asset(&input, "pkx_twins");
    fs::write(twins.join("a.pkx"), xd_model([0, 1, 2, 3], [0; 4])).expect("write model");
    fs::write(twins.join("b.pkx"), xd_model([0, 1, 2, 3], [0; 4])).expect("write model");

    make_asset(&input, "pkx_empty");

    let short = make_asset(&input, "pkx_short");
    fs::write(short.join("model.pkx"), [0u8; 0x10]).expect("failed to write model");

    let other = make_asset(&input, "textures");
    write_png(&other.join("skip.png"), [1, 2, 3, 4]);

    let summary = run(&input, &output, &Config::default(), None).expect("run must not fail");
    assert_eq!(
        summary,
        Summary {
            assets: 4,
            processed: 1,
            skipped: 3,
            textures: 2,
        }
    );

    let body = image::open(output.join("pkx_good").join("body.png"))
        .expect("recolored body")
        .into_rgba8();
    assert_eq!(body.get_pixel(0, 0).0, [0, 20, 30, 80]);
    assert_eq!(body.get_pixel(1, 0).0, [0, 20, 30, 80]);

    let eyes = image::open(output.join("pkx_good").join("eyes.png"))
        .expect("recolored eyes")
        .into_rgba8();
    assert_eq!(eyes.get_pixel(0, 0).0, [0, 255, 50, 255]);

    assert!(!output.join("pkx_good").join("notes.txt").exists());
    assert!(output.join("pkx_twins").is_dir());
    assert!(!output.join("textures").exists());
}

#[test]
fn load_colors_reports_truncated_model() {
    let (_tmp, input, _output) = make_roots();
    let dir = make_asset(&input, "pkx_cut");
    let model = dir.join("model.pkx");
    let mut data = xd_model([1, 2, 3, 4], [5, 6, 7, 8]);
    data.truncate(0x7C);
    fs::write(&model, data).expect("failed to write model");

    let asset = Asset {
        name: String::from("pkx_cut"),
        dir,
    };
    let err = load_colors(&asset, &model).unwrap_err();
    assert!(
        matches!(
            err,
            Error::Model {
                source: pkx::error::Error::Truncated { offset: 0x7F, .. },
                ..
            }
        ),
        "{err:?}"
    );
}

#[test]
fn sequential_strategy_writes_same_pixels() {
    let (_tmp, input, output) = make_roots();
    let dir = make_asset(&input, "pkx_seq");
    fs::write(dir.join("m.pkx"), xd_model([2, 1, 0, 3], [255, 64, 0, 255])).expect("write");
    write_png(&dir.join("t.png"), [12, 34, 56, 255]);

    let config = Config {
        strategy: ScaleStrategy::Sequential,
        jobs: 1,
        ..Config::default()
    };
    let summary = run(&input, &output, &config, None).expect("run must not fail");
    assert_eq!(summary.processed, 1);

    let texture = image::open(output.join("pkx_seq").join("t.png"))
        .expect("recolored texture")
        .into_rgba8();
    assert_eq!(texture.get_pixel(0, 0).0, [112, 17, 0, 255]);
}

#[test]
fn opaque_texture_stays_opaque_rgb() {
    let (_tmp, input, output) = make_roots();
    let dir = make_asset(&input, "pkx_opaque");
    fs::write(dir.join("m.pkx"), xd_model([0, 1, 2, 3], [255, 255, 255, 0])).expect("write");
    RgbImage::from_pixel(2, 1, Rgb([10, 20, 30]))
        .save(dir.join("t.png"))
        .expect("failed to write test texture");

    let summary = run(&input, &output, &Config::default(), None).expect("run must not fail");
    assert_eq!(summary.textures, 1);

    let texture = image::open(output.join("pkx_opaque").join("t.png")).expect("recolored texture");
    assert_eq!(texture.color(), ColorType::Rgb8);
    let texture = texture.as_rgb8().expect("rgb8 texture");
    assert_eq!(texture.get_pixel(0, 0).0, [20, 40, 60]);
    assert_eq!(texture.get_pixel(1, 0).0, [20, 40, 60]);
}

#[test]
fn sixteen_bit_texture_keeps_depth() {
    let (_tmp, input, output) = make_roots();
    let dir = make_asset(&input, "pkx_deep");
    fs::write(dir.join("m.pkx"), xd_model([1, 0, 2, 3], [255, 255, 255, 255])).expect("write");
    ImageBuffer::<Rgb<u16>, Vec<u16>>::from_pixel(1, 1, Rgb([1000, 2001, 3000]))
        .save(dir.join("t.png"))
        .expect("failed to write test texture");

    run(&input, &output, &Config::default(), None).expect("run must not fail");

    let texture = image::open(output.join("pkx_deep").join("t.png")).expect("recolored texture");
    assert_eq!(texture.color(), ColorType::Rgb16);
    let texture = texture.as_rgb16().expect("rgb16 texture");
    assert_eq!(texture.get_pixel(0, 0).0, [4002, 2000, 6000]);
}

#[test]
fn recolor_image_keeps_alpha_of_rgba_input() {
    let colors = ColorPair {
        color1: pkx::Color::new(0, 1, 2, 3),
        color2: pkx::Color::new(255, 255, 255, 0),
    };
    let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 40])));
    let image = recolor_image(source, &Recolor::new(colors));
    assert_eq!(image.color(), ColorType::Rgba8);
    assert_eq!(image.to_rgba8().get_pixel(0, 0).0, [20, 40, 60, 0]);
}

#[test]
fn skipped_asset_report_lists_every_cause() {
    let err = Error::Model {
        asset: String::from("pkx_x"),
        source: pkx::error::Error::Truncated { offset: 0x10, len: 0x8 },
    };
    let report = miette::Report::new(err);
    let causes: Vec<String> = report.chain().map(|cause| cause.to_string()).collect();
    assert_eq!(causes.len(), 2, "{causes:?}");
    assert_eq!(causes[0], "cannot read colors of pkx_x");
    assert!(causes[1].contains("0x10"), "{causes:?}");
}

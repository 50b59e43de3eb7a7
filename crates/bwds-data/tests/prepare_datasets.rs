use bwds_core::{
    BuildConfig, BwdsError, DownsampleConfig, Example, FeatureValue, ResizeFilter, Split,
};
use bwds_data::{load_rgb8, save_rgb8, Preparer, PrepareSummary, Registry};
use bwds_formats::{ByteOrder, MatValue, MatWriter, PfmWriter};
use ndarray::{Array2, Array3, ArrayD, IxDyn};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn prepare(
    registry: &Registry,
    spec: &str,
    check_shapes: bool,
) -> (PrepareSummary, BTreeMap<Split, Vec<Example>>) {
    let builder = registry.builder(spec).unwrap();
    Preparer::new(builder.as_ref(), registry.resources())
        .with_shape_checks(check_shapes)
        .collect()
        .unwrap()
}

fn write_png(path: &Path, height: usize, width: usize, seed: u8) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let image = Array3::from_shape_fn((height, width, 3), |(y, x, c)| {
        seed.wrapping_add((y * 7 + x * 3 + c) as u8)
    });
    save_rgb8(image.view(), path).unwrap();
}

fn write_scene(dir: &Path, rows: usize, cols: usize, size: usize) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join("parameters.cfg"),
        format!(
            "[intrinsics]\nfocal_length_mm = 100\n\n[extrinsics]\nnum_cams_x = {cols}\nnum_cams_y = {rows}\n"
        ),
    )
    .unwrap();
    for n in 0..rows * cols {
        write_png(&dir.join(format!("input_Cam{n:03}.png")), size, size, n as u8 * 40);
    }
}

fn tensor<'a>(example: &'a Example, field: &str) -> &'a FeatureValue {
    example
        .get(field)
        .unwrap_or_else(|| panic!("record '{}' has no field '{field}'", example.key))
}

#[test]
fn test_light_field_scene_end_to_end() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let build = BuildConfig::with_root(root.path());
    let stratified = build.manual_dir.join("hcilf/stratified");

    let scene = stratified.join("dots");
    write_scene(&scene, 2, 2, 64);
    let disparity = Array2::from_shape_fn((64, 64), |(y, x)| (y as f32 - x as f32) / 8.0);
    let mut file = fs::File::create(scene.join("gt_disp_lowres.pfm")).unwrap();
    PfmWriter::new(ByteOrder::Little)
        .write_gray(&mut file, disparity.view())
        .unwrap();
    drop(file);
    fs::write(stratified.join("license.txt"), "CC BY-NC-SA 4.0").unwrap();

    let registry = Registry::new(build).unwrap();
    let (summary, records) = prepare(&registry, "hci_lf/stratified", false);
    assert_eq!(summary.config.as_deref(), Some("stratified"));
    assert_eq!(summary.total_examples(), 1);
    assert_eq!(summary.total_failures(), 0);

    let example = &records[&Split::Test][0];
    assert_eq!(example.key, "dots");

    let FeatureValue::TensorU8(lf) = tensor(example, "lf") else {
        panic!("lf is not u8");
    };
    assert_eq!(lf.shape(), &[2, 2, 64, 64, 3]);
    let view = load_rgb8(scene.join("input_Cam001.png")).unwrap();
    let placed = lf
        .slice(ndarray::s![0, 1, .., .., ..])
        .to_owned()
        .into_dimensionality::<ndarray::Ix3>()
        .unwrap();
    assert_eq!(placed, view);

    let FeatureValue::TensorF32(depth) = tensor(example, "depth") else {
        panic!("depth is not f32");
    };
    assert_eq!(depth.shape(), &[512, 512]);
    assert!(depth.iter().all(|&v| v == 0.0));

    let FeatureValue::TensorF32(disp) = tensor(example, "disparity") else {
        panic!("disparity is not f32");
    };
    assert_eq!(disp.shape(), &[64, 64]);
    assert_eq!(disp[[10, 2]], disparity[[10, 2]]);
}

#[test]
fn test_light_field_grid_must_match_schema() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let build = BuildConfig::with_root(root.path());
    write_scene(&build.manual_dir.join("hcilf/stratified/backgammon"), 2, 2, 512);

    let registry = Registry::new(build).unwrap();
    let (summary, _) = prepare(&registry, "hci_lf/stratified", true);
    // Only a 9x9 grid matches the declared schema.
    assert_eq!(summary.total_examples(), 0);
    assert_eq!(summary.total_failures(), 1);
    assert!(matches!(
        summary.failures[0].error,
        BwdsError::ShapeMismatch { .. }
    ));
}

#[test]
fn test_scene_without_parameters_is_skipped() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let build = BuildConfig::with_root(root.path());
    let stratified = build.manual_dir.join("hcilf/stratified");
    write_scene(&stratified.join("boxes"), 1, 2, 16);
    write_scene(&stratified.join("cotton"), 1, 2, 16);
    fs::remove_file(stratified.join("boxes/parameters.cfg")).unwrap();

    let registry = Registry::new(build).unwrap();
    let (summary, records) = prepare(&registry, "hci_lf/stratified", false);
    assert_eq!(summary.total_examples(), 1);
    assert_eq!(summary.total_failures(), 1);
    assert!(matches!(summary.failures[0].error, BwdsError::Config(_)));
    assert_eq!(records[&Split::Test][0].key, "cotton");
}

#[test]
fn test_image_folder_builder() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let build = BuildConfig::with_root(root.path());
    let set5 = build.extract_dir.join("Set5");
    for (i, name) in ["woman", "baby", "head"].iter().enumerate() {
        write_png(&set5.join(format!("{name}.png")), 12, 8 + i, 0);
    }
    fs::write(set5.join("readme.txt"), "Set5").unwrap();

    let registry = Registry::new(build).unwrap();
    let (summary, records) = prepare(&registry, "set5", true);
    assert_eq!(summary.total_examples(), 3);

    let keys: Vec<&str> = records[&Split::Test].iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["baby", "head", "woman"]);
    let FeatureValue::Image(hr) = tensor(&records[&Split::Test][2], "hr") else {
        panic!("hr is not an image");
    };
    assert_eq!(hr.shape(), &[12, 8, 3]);
}

#[test]
fn test_corrupt_image_does_not_stop_builder() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let build = BuildConfig::with_root(root.path());
    let dir = build.manual_dir.join("McM");
    write_png(&dir.join("1.png"), 4, 4, 0);
    fs::rename(dir.join("1.png"), dir.join("1.tif")).unwrap();
    fs::write(dir.join("2.tif"), b"not a tiff").unwrap();
    write_png(&dir.join("3.png"), 4, 4, 9);
    fs::rename(dir.join("3.png"), dir.join("3.tif")).unwrap();

    let registry = Registry::new(build).unwrap();
    let (summary, records) = prepare(&registry, "mc_master", true);
    assert_eq!(summary.total_examples(), 2);
    assert_eq!(summary.total_failures(), 1);
    assert!(summary.failures[0].error.is_record_local());
    let keys: Vec<&str> = records[&Split::Test].iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["1", "3"]);
}

#[test]
fn test_set14_downsampling() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let build = BuildConfig {
        downsample: DownsampleConfig {
            scale: 2,
            filter: ResizeFilter::Bicubic,
        },
        ..BuildConfig::with_root(root.path())
    };
    write_png(&build.extract_dir.join("Set14/lenna.png"), 10, 7, 3);

    let registry = Registry::new(build).unwrap();
    let (_, records) = prepare(&registry, "set14", true);
    let example = &records[&Split::Test][0];
    assert_eq!(tensor(example, "hr").shape(), &[10, 6, 3]);
    assert_eq!(tensor(example, "lr").shape(), &[5, 3, 3]);
}

#[test]
fn test_bsds500_dmsp_subset() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let build = BuildConfig::with_root(root.path());
    let images = build.extract_dir.join("BSR/BSDS500/data/images");
    for split in ["train", "val", "test"] {
        fs::create_dir_all(images.join(split)).unwrap();
    }
    let val = images.join("val");
    for id in ["101085", "12345", "304074"] {
        let png = val.join(format!("{id}.png"));
        write_png(&png, 6, 6, 1);
        let img = image::open(&png).unwrap();
        img.save(val.join(format!("{id}.jpg"))).unwrap();
        fs::remove_file(png).unwrap();
    }

    let registry = Registry::new(build).unwrap();
    let (summary, records) = prepare(&registry, "bsds500/dmsp", true);
    assert_eq!(summary.splits.len(), 1);
    let keys: Vec<&str> = records[&Split::Validation]
        .iter()
        .map(|e| e.key.as_str())
        .collect();
    assert_eq!(keys, vec!["101085", "304074"]);

    let (summary, _) = prepare(&registry, "bsds500", true);
    assert_eq!(summary.splits[&Split::Validation].examples, 3);
    assert_eq!(summary.splits[&Split::Train].examples, 0);
}

#[test]
fn test_schelten_kernels_from_mat_file() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let build = BuildConfig::with_root(root.path());
    fs::create_dir_all(&build.extract_dir).unwrap();

    let kernels: Vec<MatValue> = (0..3)
        .map(|i| {
            MatValue::Single(ArrayD::from_elem(IxDyn(&[5 + i, 9]), 1.0 / 45.0))
        })
        .collect();
    MatWriter::new()
        .compressed(true)
        .add(
            "kernels",
            MatValue::Cell(ArrayD::from_shape_vec(IxDyn(&[1, 3]), kernels).unwrap()),
        )
        .write_file(build.extract_dir.join("kernels.mat"))
        .unwrap();

    let registry = Registry::new(build).unwrap();
    let (summary, records) = prepare(&registry, "schelten_kernels/all", true);
    assert_eq!(summary.total_examples(), 3);

    let example = &records[&Split::Test][2];
    assert_eq!(example.key, "2");
    assert_eq!(tensor(example, "kernel").shape(), &[191, 145]);
    let FeatureValue::TensorI32(size) = tensor(example, "size") else {
        panic!("size is not i32");
    };
    assert_eq!(size.as_slice().unwrap(), &[7, 9]);
}

#[test]
fn test_vid4_sequences() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let build = BuildConfig::with_root(root.path());
    let vid4 = build.extract_dir.join("Vid4");
    let mut list = String::new();
    for frame in 0..3 {
        let name = format!("walk/{frame:03}.png");
        write_png(&vid4.join(&name), 16, 12, frame * 10);
        list.push_str(&name);
        list.push('\n');
    }
    fs::write(vid4.join("walk.txt"), list).unwrap();

    let registry = Registry::new(build).unwrap();
    let (summary, records) = prepare(&registry, "vid4", true);
    // The other three sequences have no frame list.
    assert_eq!(summary.total_examples(), 1);
    assert_eq!(summary.total_failures(), 3);
    assert!(summary
        .failures
        .iter()
        .all(|f| matches!(f.error, BwdsError::Io(_))));

    let walk = &records[&Split::Test][0];
    assert_eq!(walk.key, "walk");
    assert_eq!(tensor(walk, "hr").shape(), &[3, 16, 12, 3]);
    assert_eq!(tensor(walk, "lr").shape(), &[3, 4, 3, 3]);
}

#[test]
fn test_missing_download_is_fatal() {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let registry = Registry::new(BuildConfig::with_root(root.path())).unwrap();
    let builder = registry.builder("kodak24").unwrap();
    let result = Preparer::new(builder.as_ref(), registry.resources()).prepare(|_, _| Ok(()));
    assert!(matches!(result, Err(BwdsError::MissingResource(_))));
}

use std::path::Path;

use image::GenericImageView;
use tempfile::tempdir;

fn assert_transparent_corners(path: &Path) {
    let image = image::open(path).unwrap_or_else(|e| panic!("failed to open {}: {e}", path.display()));
    assert!(image.color().has_alpha(), "{} has no alpha channel", path.display());
    let (width, height) = image.dimensions();
    for (x, y) in [(0, 0), (width - 1, 0), (0, height - 1), (width - 1, height - 1)] {
        assert_eq!(
            image.get_pixel(x, y)[3],
            0,
            "corner ({x}, {y}) of {} is not transparent",
            path.display()
        );
    }
}

#[test]
fn writes_both_charts_under_images() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("images")).unwrap();
    let output = assert_cmd::cargo::cargo_bin_cmd!("breakthrough_plots")
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("B_vs_V_forE.png"));
    assert!(stdout.contains("E_vs_V_forB.png"));
    assert!(stdout.contains("INFO"));

    for name in ["B_vs_V_forE.png", "E_vs_V_forB.png"] {
        let path = dir.path().join("images").join(name);
        assert!(path.is_file(), "missing {}", path.display());
        assert_transparent_corners(&path);
    }
}

#[test]
fn replaces_existing_charts() {
    let dir = tempdir().unwrap();
    let images = dir.path().join("images");
    std::fs::create_dir_all(&images).unwrap();
    std::fs::write(images.join("B_vs_V_forE.png"), b"stale").unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("breakthrough_plots")
        .current_dir(dir.path())
        .assert()
        .success();
    assert_transparent_corners(&images.join("B_vs_V_forE.png"));
}

#[test]
fn missing_images_directory_fails() {
    let dir = tempdir().unwrap();

    let output = assert_cmd::cargo::cargo_bin_cmd!("breakthrough_plots")
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(
        stderr.contains(&*Path::new("images").join("B_vs_V_forE.png").to_string_lossy()),
        "stderr does not name the chart: {stderr}"
    );
    assert!(!dir.path().join("images").exists());
}

#[test]
fn unwritable_output_fails() {
    let dir = tempdir().unwrap();
    // A file where the output directory should be.
    std::fs::write(dir.path().join("images"), b"not a directory").unwrap();

    let output = assert_cmd::cargo::cargo_bin_cmd!("breakthrough_plots")
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("images"));
}

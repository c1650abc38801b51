//! Command-line integration tests for md5-rs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use md5_model::{Md5Model, ModelBuffers, ParseOptions};
use wgl_vert::{VertexFormat, WglVertFile};

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn md5_rs() -> Command {
    Command::cargo_bin("md5-rs").unwrap()
}

#[test]
fn mesh_info_summarises_the_model() {
    md5_rs()
        .args(["mesh", "info"])
        .arg(data("strip.md5mesh"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Joints: 2"))
        .stdout(predicate::str::contains("Vertices: 6"))
        .stdout(predicate::str::contains("Triangles: 4"))
        .stdout(predicate::str::contains("strip"));
}

#[test]
fn mesh_info_detailed_lists_joints() {
    md5_rs()
        .args(["mesh", "info", "--detailed", "--strict"])
        .arg(data("strip.md5mesh"))
        .assert()
        .success()
        .stdout(predicate::str::contains("elbow"))
        .stdout(predicate::str::contains("root (#0)"));
}

#[test]
fn mesh_validate_accepts_a_consistent_pair() {
    md5_rs()
        .args(["mesh", "validate"])
        .arg(data("strip.md5mesh"))
        .arg("--anim")
        .arg(data("strip.md5anim"))
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));
}

#[test]
fn mesh_validate_reports_bad_joint_references() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.md5mesh");
    let text = fs::read_to_string(data("strip.md5mesh"))
        .unwrap()
        .replace("weight 7 1 1.0", "weight 7 5 1.0");
    fs::write(&path, text).unwrap();

    md5_rs()
        .args(["mesh", "validate"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 error(s)"))
        .stdout(predicate::str::contains("error:"));
}

#[test]
fn strict_parsing_rejects_malformed_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("malformed.md5mesh");
    let text = fs::read_to_string(data("strip.md5mesh"))
        .unwrap()
        .replace("vert 3 ( 1 0.5 ) 4 2", "vert 3 ( 1 oops ) 4 2");
    fs::write(&path, text).unwrap();

    md5_rs()
        .args(["mesh", "info"])
        .arg(&path)
        .assert()
        .success();
    md5_rs()
        .args(["mesh", "info", "--strict"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse mesh file"));
}

#[test]
fn mesh_export_writes_a_wglv_container() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("strip.wglvert");

    md5_rs()
        .args(["mesh", "export"])
        .arg(data("strip.md5mesh"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 6 vertices, 4 triangles"));

    let file = WglVertFile::open(&output).unwrap();
    assert_eq!(file.format, VertexFormat::SKINNED);
    assert_eq!(file.stride, 44);
    assert_eq!(file.vertex_count(), 6);
    assert_eq!(file.indices, vec![0, 2, 1, 1, 2, 3, 2, 4, 3, 3, 4, 5]);
    // vert 0 is rigidly bound to the root at the origin
    assert_eq!(&file.vertex_floats()[0..3], &[0.0, 0.0, 0.0]);
}

#[test]
fn mesh_export_keeps_every_mesh_in_place() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("capped.wglvert");

    md5_rs()
        .args(["mesh", "export"])
        .arg(data("capped.md5mesh"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 9 vertices, 5 triangles"));

    let file = WglVertFile::open(&output).unwrap();
    // the cap's triangle is rebased past the strip's six vertices
    assert_eq!(file.indices[12..], [6, 8, 7]);

    let text = fs::read_to_string(data("capped.md5mesh")).unwrap();
    let model = Md5Model::parse(&text, &ParseOptions::strict()).unwrap();
    let bind = ModelBuffers::from_compiled(&model.compile()).unwrap();
    let floats = file.vertex_floats();
    assert_eq!(floats.len(), bind.vertices.as_slice().len());
    for (exported, compiled) in floats.iter().zip(bind.vertices.as_slice()) {
        assert!((exported - compiled).abs() < 1e-5, "{exported} != {compiled}");
    }
}

#[test]
fn mesh_export_skins_against_an_animation_frame() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("strip.wglvert");

    md5_rs()
        .args(["mesh", "export"])
        .arg(data("strip.md5mesh"))
        .arg("-o")
        .arg(&output)
        .arg("--anim")
        .arg(data("strip.md5anim"))
        .args(["--frame", "2", "--renormalize", "--corrected-tangents"])
        .assert()
        .success();

    // frame 2 moves the root by one unit along x
    let floats = WglVertFile::open(&output).unwrap().vertex_floats();
    assert!((floats[0] - 1.0).abs() < 1e-5);
    assert!(floats[1].abs() < 1e-5);
    assert!(floats[2].abs() < 1e-5);

    md5_rs()
        .args(["vert", "info"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Vertices: 6"))
        .stdout(predicate::str::contains("Stride: 44 bytes"))
        .stdout(predicate::str::contains("TANGENT"));
}

#[test]
fn anim_info_summarises_the_clip() {
    md5_rs()
        .args(["anim", "info", "--detailed"])
        .arg(data("strip.md5anim"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Frames: 3"))
        .stdout(predicate::str::contains("Frame rate: 24 fps"))
        .stdout(predicate::str::contains("Animated components: 4"))
        .stdout(predicate::str::contains("Qx Qy Qz"));
}

#[test]
fn anim_pose_prints_json() {
    let output = md5_rs()
        .args(["anim", "pose", "--frame", "5", "--json"])
        .arg(data("strip.md5anim"))
        .output()
        .unwrap();
    assert!(output.status.success());

    // frame 5 wraps to frame 2
    let pose: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let joints = pose["joints"].as_array().unwrap();
    assert_eq!(joints.len(), 2);
    assert_eq!(joints[0]["position"][0].as_f64(), Some(1.0));
}

#[test]
fn vert_info_rejects_other_files() {
    md5_rs()
        .args(["vert", "info"])
        .arg(data("strip.md5mesh"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse wglv file"));
}

#[test]
fn missing_input_is_reported() {
    md5_rs()
        .args(["mesh", "info", "does-not-exist.md5mesh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read mesh file"));
}

#[test]
fn completions_are_generated() {
    md5_rs()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("md5-rs"));
}

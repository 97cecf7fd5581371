//! End-to-end tests of the newton binary: roots go in on stdin, a PPM
//! comes out on disk.

extern crate assert_cmd;
extern crate predicates;
extern crate tempfile;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;

#[test]
fn renders_a_quadratic_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let outfile = dir.path().join("newton.ppm");
    Command::cargo_bin("newton")
        .unwrap()
        .arg("--output")
        .arg(&outfile)
        .arg("--size")
        .arg("40x30")
        .arg("--workers")
        .arg("2")
        .arg("--tracks")
        .arg("8")
        .with_stdin()
        .buffer("1\n-1\ndone\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Welcome to Newton-Raphson iteration-based fractal viewer.",
        ))
        .stdout(predicate::str::contains("Fractal written to"));
    // A 40x30 binary pixmap: header plus 3 bytes per pixel.
    let written = fs::metadata(&outfile).unwrap().len();
    assert!(written > 40 * 30 * 3, "suspiciously small image: {}", written);
}

#[test]
fn a_single_root_is_refused() {
    Command::cargo_bin("newton")
        .unwrap()
        .arg("--output")
        .arg("unused.ppm")
        .with_stdin()
        .buffer("1\ndone\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("At least two roots"));
}

#[test]
fn a_malformed_root_is_fatal() {
    Command::cargo_bin("newton")
        .unwrap()
        .arg("--output")
        .arg("unused.ppm")
        .with_stdin()
        .buffer("1\nnot-a-number\ndone\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot parse"));
}

#[test]
fn a_bad_worker_count_is_refused_by_the_parser() {
    Command::cargo_bin("newton")
        .unwrap()
        .arg("--output")
        .arg("unused.ppm")
        .arg("--workers")
        .arg("0")
        .with_stdin()
        .buffer("1\n-1\ndone\n")
        .assert()
        .failure();
}

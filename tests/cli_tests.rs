//! End-to-end tests of the contam-screen binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PANEL: &str = "id\treference_kmers\nphiX\t100\necoli\t200\n";

const HITS_R1: &str = "\
read_id\tkmers_loaded\thits\tunique_hits
r1\t12\t12,0\t12,0
r2\t3\t1,2\t0,2
r3\t0\t0,0\t0,0
r4\t25\t0,25\t0,25
";

const HITS_R2: &str = "\
read_id\tkmers_loaded\thits\tunique_hits
r1\t11\t11,0\t11,0
r2\t0\t0,0\t0,0
r3\t1\t0,1\t0,1
r4\t9\t0,9\t0,9
";

const MEMBERSHIP: &str = "kmer\tmembers\tobserved\nAAAA\t0\t1\nCCCC\t0,1\t1,2\nGGGG\t1\t2\n";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in [
            ("panel.tsv", PANEL),
            ("r1.tsv", HITS_R1),
            ("r2.tsv", HITS_R2),
            ("kmers.tsv", MEMBERSHIP),
        ] {
            fs::write(dir.path().join(name), content).unwrap();
        }
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn prefix(&self) -> String {
        format!("{}/", self.dir.path().display())
    }
}

fn cmd() -> Command {
    Command::cargo_bin("contam-screen").unwrap()
}

fn screen(fx: &Fixture) -> Command {
    let mut cmd = cmd();
    cmd.arg("screen")
        .arg("--panel")
        .arg(fx.path("panel.tsv"))
        .arg("--hits1")
        .arg(fx.path("r1.tsv"))
        .args(["--threads", "2"]);
    cmd
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_paired_screen_report() {
    let fx = Fixture::new();

    screen(&fx)
        .arg("--hits2")
        .arg(fx.path("r2.tsv"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Threshold: at least 10 kmers in each read and at least 20 in pair",
        ))
        .stdout(predicate::str::contains("========== Statistics for Read 2 ==========="))
        .stdout(predicate::str::contains("========== Statistics for both reads ==========="))
        .stdout(predicate::str::contains("Reads meeting threshold (all kmers): 1\t25.00 %"))
        .stdout(predicate::str::contains("Remaining reads with at least 1 kmer in each: 1\t25.00 %"))
        .stdout(predicate::str::contains("Remaining reads with at least 1 kmer in either: 2\t50.00 %"))
        .stdout(predicate::str::contains("Pairs retained: 1"));
}

#[test]
fn test_single_end_screen() {
    let fx = Fixture::new();

    screen(&fx)
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of reads: 4"))
        .stdout(predicate::str::contains("Number of reads with 1+ kmer contamination: 3\t75.00 %"))
        .stdout(predicate::str::contains("Number of reads with 10+ kmer contamination: 2\t50.00 %"))
        .stdout(predicate::str::contains("Statistics for both reads").not())
        .stdout(predicate::str::contains("Pairs retained").not());
}

#[test]
fn test_membership_adds_similarity_files() {
    let fx = Fixture::new();

    screen(&fx)
        .arg("--hits2")
        .arg(fx.path("r2.tsv"))
        .arg("--membership")
        .arg(fx.path("kmers.tsv"))
        .arg("--output-prefix")
        .arg(fx.prefix())
        .assert()
        .success();

    assert_eq!(
        read(&fx.path("kmer_similarity_absolute.txt")),
        "Contaminant\tphiX\tecoli\nphiX\t2\t1\necoli\t1\t2\n"
    );
    assert_eq!(read(&fx.path("kmer_unique_absolute.txt")), "phiX\tecoli\n1\t1\n");
    assert!(fx.path("kmer_similarity_pc.txt").exists());
    assert!(fx.path("kmer_unique_pc.txt").exists());
}

#[test]
fn test_json_output() {
    let fx = Fixture::new();

    let output = screen(&fx)
        .arg("--hits2")
        .arg(fx.path("r2.tsv"))
        .arg("--membership")
        .arg(fx.path("kmers.tsv"))
        .arg("--output-prefix")
        .arg(fx.prefix())
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["retained_pairs"], 1);
    assert_eq!(json["thresholds"]["read"], 10);
    assert_eq!(json["stats"]["reads"].as_array().unwrap().len(), 2);
    assert_eq!(json["stats"]["pairs"]["number_of_pairs"], 4);
    // phiX reference k-mers observed in read 1: AAAA and CCCC
    assert_eq!(
        json["stats"]["reads"][0]["contaminants"][0]["kmers_observed"]["count"],
        2
    );
    assert_eq!(
        json["similarity"]["shared"],
        serde_json::json!([[2, 1], [1, 2]])
    );
}

#[test]
fn test_progress_snapshots() {
    let fx = Fixture::new();
    let progress = fx.path("progress");
    fs::create_dir(&progress).unwrap();

    screen(&fx)
        .arg("--hits2")
        .arg(fx.path("r2.tsv"))
        .arg("--progress-dir")
        .arg(&progress)
        .args(["--progress-every", "2"])
        .assert()
        .success();

    assert_eq!(
        read(&progress.join("largest_contaminant_r1.txt")),
        "name\tvalue\nphiX\t1\necoli\t2\nUnclassified\t1\n"
    );
    assert!(read(&progress.join("data_overall_r2.txt")).contains("Number with k10 contaminants\t1\n"));
}

#[test]
fn test_missing_progress_dir_is_not_fatal() {
    let fx = Fixture::new();

    screen(&fx)
        .arg("--progress-dir")
        .arg(fx.path("does-not-exist"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of reads: 4"));
}

#[test]
fn test_mismatched_mates_fail() {
    let fx = Fixture::new();
    fs::write(fx.path("short.tsv"), "r1\t11\t11,0\t11,0\n").unwrap();

    screen(&fx)
        .arg("--hits2")
        .arg(fx.path("short.tsv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("input ended after 1 records"));
}

#[test]
fn test_zero_threshold_rejected() {
    let fx = Fixture::new();

    screen(&fx).args(["--threshold-read", "0"]).assert().failure();
}

#[test]
fn test_missing_panel_fails() {
    let fx = Fixture::new();

    cmd()
        .arg("screen")
        .arg("--panel")
        .arg(fx.path("nope.tsv"))
        .arg("--hits1")
        .arg(fx.path("r1.tsv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load panel"));
}

#[test]
fn test_hit_count_mismatch_fails() {
    let fx = Fixture::new();
    fs::write(fx.path("bad.tsv"), "r1\t3\t1,1,1\t0,0,0\n").unwrap();

    cmd()
        .arg("screen")
        .arg("--panel")
        .arg(fx.path("panel.tsv"))
        .arg("--hits1")
        .arg(fx.path("bad.tsv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 2 per-contaminant values, found 3"));
}

#[test]
fn test_similarity_command() {
    let fx = Fixture::new();

    cmd()
        .arg("similarity")
        .arg("--panel")
        .arg(fx.path("panel.tsv"))
        .arg("--membership")
        .arg(fx.path("kmers.tsv"))
        .arg("--output-prefix")
        .arg(fx.prefix())
        .assert()
        .success()
        .stdout(predicate::str::contains("phiX"));

    assert_eq!(read(&fx.path("kmer_unique_pc.txt")), "phiX\tecoli\n1.00\t0.50\n");
}

#[test]
fn test_similarity_skipped_for_single_contaminant() {
    let fx = Fixture::new();
    fs::write(fx.path("one.tsv"), "phiX\t100\n").unwrap();
    fs::write(fx.path("one_kmers.tsv"), "AAAA\t0\t-\n").unwrap();

    cmd()
        .arg("similarity")
        .arg("--panel")
        .arg(fx.path("one.tsv"))
        .arg("--membership")
        .arg(fx.path("one_kmers.tsv"))
        .arg("--output-prefix")
        .arg(fx.prefix())
        .assert()
        .success();

    assert!(!fx.path("kmer_similarity_absolute.txt").exists());
}

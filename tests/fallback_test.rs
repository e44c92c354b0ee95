#![cfg(not(feature = "storage-rocksdb"))]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

/// Without the storage feature, `--db-path` warns and runs in memory.
#[test]
fn test_db_path_falls_back_to_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.csv");
    fs::write(
        &input,
        "op,actor_kind,actor,target,amount,description\n\
         deposit,client,1,,100.0,\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("escrowd").unwrap();
    cmd.arg(&input)
        .arg("--db-path")
        .arg(dir.path().join("ledger-db"))
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage.",
        ))
        .stdout(predicate::str::contains("client,1,100"));
}

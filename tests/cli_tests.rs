//! CLI integration tests for ctfgrab.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn ctfgrab_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ctfgrab"))
}

fn minimal_elf() -> Vec<u8> {
    let mut data = vec![0u8; 64];
    data[0..4].copy_from_slice(&[0x7F, b'E', b'L', b'F']);
    data[4] = 2;
    data[5] = 1;
    data
}

#[test]
fn test_cli_help() {
    let output = ctfgrab_cmd()
        .arg("--help")
        .output()
        .expect("Failed to execute ctfgrab");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ctfgrab"));
    assert!(stdout.contains("rank"));
    assert!(stdout.contains("preserve"));
    assert!(stdout.contains("tags"));
}

#[test]
fn test_cli_version() {
    let output = ctfgrab_cmd()
        .arg("--version")
        .output()
        .expect("Failed to execute ctfgrab");

    assert!(output.status.success());
}

#[test]
fn test_cli_tags_nonexistent_file() {
    let output = ctfgrab_cmd()
        .args(["tags", "/nonexistent/file/path"])
        .output()
        .expect("Failed to execute ctfgrab");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"));
}

#[test]
fn test_cli_tags_elf_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("pwnme.elf");
    fs::write(&path, minimal_elf()).unwrap();

    let output = ctfgrab_cmd()
        .arg("tags")
        .arg(&path)
        .output()
        .expect("Failed to execute ctfgrab");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    // One tag per line, runtime tag before magic tag, no extension tag for .elf
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["unmanaged", "elf"]);
}

#[test]
fn test_cli_tags_source_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("exploit.py");
    fs::write(&path, b"print('pwned')\n").unwrap();

    let output = ctfgrab_cmd()
        .arg("tags")
        .arg(&path)
        .output()
        .expect("Failed to execute ctfgrab");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "source");
}

#[test]
fn test_cli_rank_missing_marker() {
    let tmp = TempDir::new().unwrap();

    let output = ctfgrab_cmd()
        .arg("rank")
        .arg(tmp.path())
        .arg("elf")
        .output()
        .expect("Failed to execute ctfgrab");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("instance.json"));
}

#[test]
fn test_cli_rank_unknown_preference_tag() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("instance.json"), b"{}").unwrap();

    let output = ctfgrab_cmd()
        .arg("rank")
        .arg(tmp.path())
        .arg("elf,warez")
        .output()
        .expect("Failed to execute ctfgrab");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown tag"));
    assert!(stderr.contains("valid tags"));
}

#[test]
fn test_cli_rank_end_to_end() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("instance.json"), b"{\"name\":\"test\"}").unwrap();

    let pwn = tmp.path().join("pwn/boffy");
    fs::create_dir_all(&pwn).unwrap();
    fs::write(pwn.join("boffy.elf"), minimal_elf()).unwrap();
    fs::write(pwn.join("description"), b"overflow me").unwrap();

    let rev = tmp.path().join("rev/cracker");
    fs::create_dir_all(&rev).unwrap();
    fs::write(rev.join("cracker.c"), b"int main() {}\n").unwrap();
    fs::write(rev.join("cracker.exe"), [0x4D, 0x5A, 0x90, 0x00]).unwrap();

    let output = ctfgrab_cmd()
        .arg("rank")
        .arg(tmp.path())
        .arg("elf,source")
        .output()
        .expect("Failed to execute ctfgrab");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);

    // boffy {unmanaged, elf} = (0+2)/2, cracker {source, unmanaged, dos} = 1/3
    assert!(lines[0].starts_with("[1.00] pwn/boffy"));
    assert!(lines[1].starts_with("[0.33] rev/cracker"));
    assert!(lines[0].contains("(unmanaged, elf)"));
    assert!(lines[1].contains("(source, unmanaged, dos)"));
}

#[test]
fn test_cli_rank_exclusion_demoted_in_plain_output() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("instance.json"), b"{}").unwrap();

    let misc = tmp.path().join("misc/zipped");
    fs::create_dir_all(&misc).unwrap();
    fs::write(misc.join("dump.zip"), [0x50, 0x4B, 0x03, 0x04]).unwrap();

    let output = ctfgrab_cmd()
        .args(["rank", "--no-color"])
        .arg(tmp.path())
        .arg("*archive")
        .output()
        .expect("Failed to execute ctfgrab");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[0.00] misc/zipped [excluded] (archive)"));
}

#[test]
fn test_cli_info_without_login() {
    let tmp = TempDir::new().unwrap();

    let output = ctfgrab_cmd()
        .arg("info")
        .env("CTFGRAB_CONFIG", tmp.path().join("state.json"))
        .output()
        .expect("Failed to execute ctfgrab");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("log in"));
}

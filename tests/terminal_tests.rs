mod common;

use std::fs;

use common::MockFtpServer;
use rax_ftp_transfer::terminal::Terminal;

fn args(words: &[&str]) -> Vec<String> {
    words.iter().map(|word| word.to_string()).collect()
}

#[test]
fn test_put_directory_without_remote_lands_at_root() {
    let server = MockFtpServer::start();
    let local = tempfile::tempdir().unwrap();
    let reports = local.path().join("reports");
    fs::create_dir_all(reports.join("2024")).unwrap();
    fs::write(reports.join("index.txt"), b"index").unwrap();
    fs::write(reports.join("2024/q1.csv"), b"1,2").unwrap();

    let source = reports.to_string_lossy().into_owned();
    Terminal::new(server.client())
        .run_once(&args(&["put", &source]))
        .unwrap();

    assert_eq!(server.file("reports/index.txt").unwrap(), b"index");
    assert_eq!(server.file("reports/2024/q1.csv").unwrap(), b"1,2");
    assert!(!server.has_dir("reports/reports"));
    assert_eq!(server.count_commands("QUIT"), 1);
}

#[test]
fn test_put_directory_into_remote() {
    let server = MockFtpServer::start();
    let local = tempfile::tempdir().unwrap();
    let site = local.path().join("site");
    fs::create_dir_all(&site).unwrap();
    fs::write(site.join("index.html"), b"<html></html>").unwrap();

    let source = site.to_string_lossy().into_owned();
    Terminal::new(server.client())
        .run_once(&args(&["put", &source, "www"]))
        .unwrap();

    assert_eq!(server.file("www/site/index.html").unwrap(), b"<html></html>");
}

#[test]
fn test_put_file_without_remote_keeps_its_name() {
    let server = MockFtpServer::start();
    let local = tempfile::tempdir().unwrap();
    let notes = local.path().join("notes.txt");
    fs::write(&notes, b"remember").unwrap();

    let source = notes.to_string_lossy().into_owned();
    Terminal::new(server.client())
        .run_once(&args(&["put", &source]))
        .unwrap();

    assert_eq!(server.file("notes.txt").unwrap(), b"remember");
}

#[test]
fn test_get_directory_into_local_dir() {
    let server = MockFtpServer::start();
    server.add_dir("docs");
    server.add_dir("docs/old");
    server.add_file("docs/readme.txt", b"read me");
    server.add_file("docs/old/v1.txt", b"v1");
    let local = tempfile::tempdir().unwrap();

    let target = local.path().to_string_lossy().into_owned();
    Terminal::new(server.client())
        .run_once(&args(&["get", "docs", &target]))
        .unwrap();

    assert_eq!(
        fs::read(local.path().join("docs/readme.txt")).unwrap(),
        b"read me"
    );
    assert_eq!(fs::read(local.path().join("docs/old/v1.txt")).unwrap(), b"v1");
}

#[test]
fn test_failed_command_still_logs_out() {
    let server = MockFtpServer::start();
    let local = tempfile::tempdir().unwrap();
    let target = local.path().to_string_lossy().into_owned();

    let result = Terminal::new(server.client()).run_once(&args(&["get", "absent", &target]));

    assert!(result.is_err());
    assert_eq!(server.count_commands("QUIT"), 1);
}

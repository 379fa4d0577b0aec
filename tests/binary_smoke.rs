use std::fs;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::tempdir;

fn write_config(path: &Path, downloads: &Path, music: &Path) {
    let xml = format!(
        "<config>
  <downloads_path>{}</downloads_path>
  <music_path>{}</music_path>
  <audio_extensions>.flac .mp3</audio_extensions>
  <log_level>quiet</log_level>
</config>",
        downloads.display(),
        music.display()
    );
    fs::write(path, xml).unwrap();
}

fn run(config: &Path, args: &[&str]) -> Output {
    let me = assert_cmd::cargo::cargo_bin!("tune_transporter");
    Command::new(me)
        .args(args)
        .env("TUNE_TRANSPORTER_CONFIG", config)
        .env_remove("TUNE_TRANSPORTER_DOWNLOADS_PATH")
        .env_remove("TUNE_TRANSPORTER_MUSIC_PATH")
        .env_remove("SLSKD_SCRIPT_DATA")
        .stdin(Stdio::null())
        .output()
        .expect("spawn binary")
}

#[test]
fn binary_print_config_succeeds() {
    let td = tempdir().unwrap();
    let cfg = td.path().join("config.xml");
    let out = run(&cfg, &["--print-config"]);
    assert!(out.status.success(), "binary should succeed with --print-config");
    assert!(String::from_utf8_lossy(&out.stdout).contains("config.xml"));
    assert!(!cfg.exists(), "--print-config must not create the file");
}

#[test]
fn unset_roots_fail() {
    let td = tempdir().unwrap();
    let cfg = td.path().join("config.xml");
    fs::write(&cfg, "<config><downloads_path></downloads_path><music_path></music_path></config>").unwrap();
    let out = run(&cfg, &[]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn malformed_event_fails() {
    let td = tempdir().unwrap();
    let downloads = td.path().join("downloads");
    let music = td.path().join("music");
    fs::create_dir_all(&downloads).unwrap();
    let cfg = td.path().join("config.xml");
    write_config(&cfg, &downloads, &music);

    let out = run(&cfg, &["--event", "{not json"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn interactive_without_input_exits_cleanly() {
    let td = tempdir().unwrap();
    let downloads = td.path().join("downloads");
    let music = td.path().join("music");
    fs::create_dir_all(downloads.join("Some Album")).unwrap();
    let cfg = td.path().join("config.xml");
    write_config(&cfg, &downloads, &music);

    let out = run(&cfg, &[]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("(0) Some Album"));
    assert!(downloads.join("Some Album").exists());
}

#[test]
fn explicit_source_without_audio_fails_and_keeps_files() {
    let td = tempdir().unwrap();
    let downloads = td.path().join("downloads");
    let music = td.path().join("music");
    let src = downloads.join("Scans");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("cover.jpg"), b"x").unwrap();
    let cfg = td.path().join("config.xml");
    write_config(&cfg, &downloads, &music);

    let out = run(&cfg, &["--source", src.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(src.join("cover.jpg").exists());
}

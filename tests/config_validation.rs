use assert_fs::TempDir;
use std::fs;
use tune_transporter::config::{validate_and_normalize, AudioExtensions, Config};
use tune_transporter::TransporterError;

fn exts() -> AudioExtensions {
    AudioExtensions::parse_list(".flac")
}

#[test]
fn music_path_is_created_when_missing() {
    let td = TempDir::new().unwrap();
    let root = dunce::canonicalize(td.path()).unwrap();
    let downloads = root.join("downloads");
    fs::create_dir_all(&downloads).unwrap();
    let music = root.join("music_missing");

    let mut cfg = Config::new(&downloads, &music, exts());
    validate_and_normalize(&mut cfg).expect("validation creates music_path");
    assert!(music.is_dir());
    assert_eq!(cfg.music_path, music);
}

#[test]
fn dry_run_does_not_create_music_path() {
    let td = TempDir::new().unwrap();
    let root = dunce::canonicalize(td.path()).unwrap();
    let downloads = root.join("downloads");
    fs::create_dir_all(&downloads).unwrap();
    let music = root.join("music_missing");

    let mut cfg = Config::new(&downloads, &music, exts());
    cfg.dry_run = true;
    validate_and_normalize(&mut cfg).unwrap();
    assert!(!music.exists());
}

#[test]
fn missing_downloads_path_is_invalid() {
    let td = TempDir::new().unwrap();
    let root = dunce::canonicalize(td.path()).unwrap();
    let mut cfg = Config::new(root.join("nope"), root.join("music"), exts());
    let err = validate_and_normalize(&mut cfg).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TransporterError>(),
        Some(TransporterError::InvalidConfig(_))
    ));
    assert!(format!("{err}").contains("downloads_path does not exist"));
}

#[test]
fn empty_extension_list_is_rejected() {
    let td = TempDir::new().unwrap();
    let root = dunce::canonicalize(td.path()).unwrap();
    let mut cfg = Config::new(root.join("a"), root.join("b"), AudioExtensions::parse_list(" , "));
    let err = validate_and_normalize(&mut cfg).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TransporterError>(),
        Some(TransporterError::NoAudioExtensions)
    ));
}

#[test]
fn disallow_equal_paths() {
    let td = TempDir::new().unwrap();
    let root = dunce::canonicalize(td.path()).unwrap();
    let base = root.join("same");
    fs::create_dir_all(&base).unwrap();
    let mut cfg = Config::new(&base, &base, exts());
    let err = validate_and_normalize(&mut cfg).unwrap_err();
    assert!(format!("{err}").contains("resolve to the same"));
}

#[test]
fn disallow_downloads_inside_music() {
    let td = TempDir::new().unwrap();
    let root = dunce::canonicalize(td.path()).unwrap();
    let music = root.join("music");
    let downloads = music.join("incoming");
    fs::create_dir_all(&downloads).unwrap();
    let mut cfg = Config::new(&downloads, &music, exts());
    let err = validate_and_normalize(&mut cfg).unwrap_err();
    assert!(format!("{err}").contains("must not be inside music_path"));
}

#[test]
fn disallow_music_inside_downloads() {
    let td = TempDir::new().unwrap();
    let root = dunce::canonicalize(td.path()).unwrap();
    let downloads = root.join("downloads");
    let music = downloads.join("library");
    fs::create_dir_all(&music).unwrap();
    let mut cfg = Config::new(&downloads, &music, exts());
    let err = validate_and_normalize(&mut cfg).unwrap_err();
    assert!(format!("{err}").contains("must not be inside downloads_path"));
}

#[cfg(unix)]
#[test]
fn roots_are_canonicalized() {
    use std::os::unix::fs as unix_fs;
    let td = TempDir::new().unwrap();
    let root = dunce::canonicalize(td.path()).unwrap();
    let real = root.join("real");
    fs::create_dir_all(real.join("downloads")).unwrap();
    fs::create_dir_all(real.join("music")).unwrap();
    let link = root.join("link");
    unix_fs::symlink(&real, &link).unwrap();

    let mut cfg = Config::new(link.join("downloads"), link.join("music"), exts());
    validate_and_normalize(&mut cfg).unwrap();
    assert_eq!(cfg.downloads_path, real.join("downloads"));
    assert_eq!(cfg.music_path, real.join("music"));
}

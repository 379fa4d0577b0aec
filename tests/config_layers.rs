use clap::Parser;
use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

use tune_transporter::cli::Args;
use tune_transporter::config::{
    default_config_path, layer_from_env, load_layer_from_xml_path, load_or_init, LoadResult,
    CONFIG_ENV, DOWNLOADS_PATH_ENV, MUSIC_PATH_ENV,
};
use tune_transporter::LogLevel;

fn clear_env() {
    unsafe {
        std::env::remove_var(CONFIG_ENV);
        std::env::remove_var(DOWNLOADS_PATH_ENV);
        std::env::remove_var(MUSIC_PATH_ENV);
    }
}

#[test]
#[serial]
fn cli_beats_env_beats_xml() {
    clear_env();
    let td = tempdir().unwrap();
    let xml = td.path().join("config.xml");
    fs::write(
        &xml,
        "<config>
            <downloads_path>/xml/downloads</downloads_path>
            <music_path>/xml/music</music_path>
            <audio_extensions>.flac</audio_extensions>
            <log_level>quiet</log_level>
        </config>",
    )
    .unwrap();

    unsafe {
        std::env::set_var(DOWNLOADS_PATH_ENV, "/env/downloads");
        std::env::set_var(MUSIC_PATH_ENV, "/env/music");
    }
    let env_layer = layer_from_env();
    clear_env();

    let args = Args::try_parse_from(["tune_transporter", "--music-path", "/cli/music"]).unwrap();
    let cfg = load_layer_from_xml_path(&xml)
        .unwrap()
        .overlay(env_layer)
        .overlay(args.to_layer())
        .resolve()
        .unwrap();

    assert_eq!(cfg.downloads_path, PathBuf::from("/env/downloads"));
    assert_eq!(cfg.music_path, PathBuf::from("/cli/music"));
    assert_eq!(cfg.audio_extensions.to_string(), ".flac");
    assert_eq!(cfg.log_level, LogLevel::Quiet);
}

#[test]
#[serial]
fn config_env_pointing_at_directory_uses_config_xml() {
    clear_env();
    let td = tempdir().unwrap();
    unsafe { std::env::set_var(CONFIG_ENV, td.path()) };
    let p = default_config_path().unwrap();
    clear_env();
    assert_eq!(p, td.path().join("config.xml"));
}

#[test]
#[serial]
fn explicit_missing_config_is_not_created() {
    clear_env();
    let td = tempdir().unwrap();
    let cfg = td.path().join("absent.xml");
    unsafe { std::env::set_var(CONFIG_ENV, &cfg) };
    let res = load_or_init().unwrap();
    clear_env();
    assert!(matches!(res, LoadResult::Missing(p) if p == cfg));
    assert!(!cfg.exists());
}

#[test]
#[serial]
fn explicit_config_is_loaded() {
    clear_env();
    let td = tempdir().unwrap();
    let cfg = td.path().join("tt.xml");
    fs::write(&cfg, "<config><music_path>/srv/music</music_path></config>").unwrap();
    unsafe { std::env::set_var(CONFIG_ENV, &cfg) };
    let res = load_or_init().unwrap();
    clear_env();
    match res {
        LoadResult::Loaded { path, layer } => {
            assert_eq!(path, cfg);
            assert_eq!(layer.music_path, Some(PathBuf::from("/srv/music")));
        }
        other => panic!("unexpected {other:?}"),
    }
}

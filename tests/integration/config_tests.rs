use clap::Parser;
use dupsweep::cli::Cli;
use dupsweep::config::Config;
use dupsweep::duplicates::ReadErrorPolicy;
use dupsweep::scanner::HashAlgorithm;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.io_threads, 4);
    assert!(config.move_folder.is_none());
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
io_threads = 8
algorithm = "blake3"
on_read_error = "skip"
report_file = "/tmp/dupes.txt"
move_folder = "dupes"
trash = true
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert_eq!(config.io_threads, 8);
    assert_eq!(config.algorithm, HashAlgorithm::Blake3);
    assert_eq!(config.on_read_error, ReadErrorPolicy::Skip);
    assert_eq!(config.report_file, PathBuf::from("/tmp/dupes.txt"));
    assert_eq!(config.move_folder.as_deref(), Some("dupes"));
    assert!(config.trash);
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = 1\n").unwrap();

    let config = Config::load(Some(config_path.as_path())).unwrap();

    assert_eq!(config.io_threads, 1);
    assert_eq!(config.algorithm, HashAlgorithm::Md5);
    assert_eq!(config.report_file, PathBuf::from("results.txt"));
}

#[test]
fn test_invalid_toml_value_is_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "algorithm = \"sha1024\"\n").unwrap();

    assert!(Config::load(Some(config_path.as_path())).is_err());
}

#[test]
fn test_env_overrides_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = 8\nmove_folder = \"from-file\"\n").unwrap();

    std::env::set_var("DUPSWEEP_CFGTEST_IO_THREADS", "16");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed("DUPSWEEP_CFGTEST_"))
        .extract()
        .unwrap();

    assert_eq!(config.io_threads, 16);
    assert_eq!(config.move_folder.as_deref(), Some("from-file"));

    std::env::remove_var("DUPSWEEP_CFGTEST_IO_THREADS");
}

#[test]
fn test_cli_overrides_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = 8\nalgorithm = \"blake3\"\n").unwrap();

    let cli = Cli::try_parse_from([
        "dupsweep",
        "--config",
        config_path.to_str().unwrap(),
        "--io-threads",
        "2",
        "list",
        ".",
    ])
    .unwrap();

    let mut config = Config::load(cli.config.as_deref()).unwrap();
    config.apply_cli(&cli);

    assert_eq!(config.io_threads, 2);
    assert_eq!(config.algorithm, HashAlgorithm::Blake3);
}

#[test]
fn test_missing_config_file_is_error() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("missing.toml");

    assert!(Config::load(Some(missing.as_path())).is_err());
}

#[test]
fn test_save_writes_loadable_toml() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("saved.toml");
    let config = Config {
        algorithm: HashAlgorithm::Blake3,
        on_read_error: ReadErrorPolicy::Skip,
        ..Config::default()
    };

    config.save_to(&path).unwrap();
    assert_eq!(Config::load(Some(path.as_path())).unwrap(), config);
}

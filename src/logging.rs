use indoc::indoc;
use tempdir::TempDir;

const DEFAULT_CONFIG: &'static str = indoc! {r#"
appenders:
  stdout:
    kind: console
    encoder:
      pattern: "{h({d(%Y-%m-%d %H:%M:%S)(utc)} - {l} - {f}:{L} - {m}{n})}"
  file_logger:
    kind: rolling_file
    path: "logs/camtrack-rs.log"
    encoder:
      pattern: "{d(%Y-%m-%d %H:%M:%S)(utc)} - {l} - {f}:{L} - {m}{n}"
    policy:
      trigger:
        kind: size
        limit: 1Mb
      roller:
        kind: fixed_window
        base: 1
        count: 3
        pattern: "logs/camtrack-rs_{}.log"
root:
  level: info
  appenders:
    - stdout
    - file_logger
"#};

/// Init log4rs from a `log4rs.yaml` next to the executable when present,
/// otherwise from the embedded default config. The default is written to
/// a temp dir first since the application directory may be read-only.
pub fn setup_logging() {
    let mut config_path = std::env::current_exe().expect("Failed to locate executable");
    config_path.pop();
    config_path.push("log4rs.yaml");

    if !config_path.exists() {
        let tmp_dir = TempDir::new("camtrack-rs").expect("Failed to create tmp log configuration");
        let tmp_config = tmp_dir.path().join("log4rs.yaml");
        std::fs::write(&tmp_config, DEFAULT_CONFIG).expect("Unable to write default log config");
        log4rs::init_file(tmp_config, Default::default()).expect("Failed to init logging");
        return;
    }

    log4rs::init_file(config_path, Default::default()).expect("Failed to init logging");
}

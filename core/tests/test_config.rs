use runtrack_core::{load_config, save_config, TrackerConfig};
use std::fs;

#[test]
fn missing_file_yields_defaults() {
    let cfg = load_config("tests/no_such_config.json").expect("load_config feilet");
    assert_eq!(cfg.accuracy_limit_m, 20.0);
    assert_eq!(cfg.min_movement_m, 2.0);
    assert_eq!(cfg.block_size, 64);
    assert_eq!(cfg.smoothing_window, 10);
    assert!(cfg.block_size.is_power_of_two());
}

#[test]
fn save_and_load_roundtrip() {
    let path = "tests/tmp_config.json";
    let _ = fs::remove_file(path);

    let mut cfg = TrackerConfig::default();
    cfg.accuracy_limit_m = 15.0;
    cfg.noise_floor = 0.25;
    cfg.calories.running = 70.0;

    save_config(&cfg, path).expect("kunne ikke lagre konfigurasjonen");
    let loaded = load_config(path).expect("kunne ikke laste konfigurasjonen");

    assert_eq!(loaded.accuracy_limit_m, 15.0);
    assert_eq!(loaded.noise_floor, 0.25);
    assert_eq!(loaded.calories.running, 70.0);
    // felter som ikke ble rørt beholder default
    assert_eq!(loaded.max_speed_ms, 44.7);

    fs::remove_file(path).ok();
}

#[test]
fn partial_config_file_is_filled_with_defaults() {
    let path = "tests/tmp_config_partial.json";
    fs::write(path, r#"{ "accuracy_limit_m": 10.0 }"#).expect("kunne ikke skrive testfil");

    let loaded = load_config(path).expect("load_config feilet");
    assert_eq!(loaded.accuracy_limit_m, 10.0);
    assert_eq!(loaded.min_movement_m, 2.0);

    fs::remove_file(path).ok();
}

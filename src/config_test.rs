use std::collections::HashMap;

use super::*;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn empty_lookup_gives_defaults() {
    let cfg = EngineConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(cfg, EngineConfig::default());
    assert!(cfg.binding_enabled);
    assert_eq!(cfg.bound_text_padding, 5.0);
    assert_eq!(cfg.elbow_base_padding, 40.0);
    assert_eq!(cfg.point_handle_size, 10.0);
}

#[test]
fn overrides_are_applied() {
    let cfg = EngineConfig::from_lookup(lookup(&[
        ("SCENE_BINDING_ENABLED", "false"),
        ("SCENE_NUDGE_STEP", "2"),
        ("SCENE_DEFAULT_FONT_SIZE", " 16 "),
    ]))
    .unwrap();
    assert!(!cfg.binding_enabled);
    assert_eq!(cfg.nudge_step, 2.0);
    assert_eq!(cfg.default_font_size, 16.0);
    assert_eq!(cfg.nudge_step_large, DEFAULT_NUDGE_STEP_LARGE);
}

#[test]
fn numeric_bool_is_accepted() {
    let cfg = EngineConfig::from_lookup(lookup(&[("SCENE_BINDING_ENABLED", "0")])).unwrap();
    assert!(!cfg.binding_enabled);
}

#[test]
fn malformed_number_falls_back_to_default() {
    let cfg = EngineConfig::from_lookup(lookup(&[
        ("SCENE_POINT_HANDLE_SIZE", "big"),
        ("SCENE_NUDGE_STEP", "-3"),
        ("SCENE_ELBOW_BASE_PADDING", "NaN"),
    ]))
    .unwrap();
    assert_eq!(cfg.point_handle_size, DEFAULT_POINT_HANDLE_SIZE);
    assert_eq!(cfg.nudge_step, DEFAULT_NUDGE_STEP);
    assert_eq!(cfg.elbow_base_padding, BASE_PADDING);
}

#[test]
fn malformed_bool_is_config_error() {
    let err = EngineConfig::from_lookup(lookup(&[("SCENE_BINDING_ENABLED", "maybe")])).unwrap_err();
    assert!(matches!(err, SceneError::Config(msg) if msg.contains("maybe")));
}

#[test]
fn deserializes_partial_json() {
    let cfg: EngineConfig = serde_json::from_str(r#"{ "nudge_step": 3.0 }"#).unwrap();
    assert_eq!(cfg.nudge_step, 3.0);
    assert!(cfg.binding_enabled);
}

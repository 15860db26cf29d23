use super::*;

#[test]
fn partial_json_keeps_defaults() {
    let cfg = SceneConfig::from_json_str(r#"{"fps": 30, "star_count": 10}"#).unwrap();
    assert_eq!(cfg.fps, 30.0);
    assert_eq!(cfg.star_count, 10);
    assert!(cfg.seasonal_snow);
    assert_eq!(cfg.night_overlay_alpha, 0.5);
    assert_eq!(cfg.overlay_fade_ms, 2000.0);
}

#[test]
fn invalid_values_are_rejected() {
    let err = SceneConfig::from_json_str(r#"{"fps": 0}"#).unwrap_err();
    assert!(matches!(err, WeatherscapeError::Configuration(_)));

    let err = SceneConfig::from_json_str(r#"{"night_overlay_alpha": 1.5}"#).unwrap_err();
    assert!(matches!(err, WeatherscapeError::Configuration(_)));

    let err = SceneConfig::from_json_str("{not json").unwrap_err();
    assert!(matches!(err, WeatherscapeError::Serde(_)));
}

#[test]
fn from_path_reports_missing_file() {
    let err = SceneConfig::from_path(Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(matches!(err, WeatherscapeError::Other(_)));
}

#[test]
fn default_validates() {
    SceneConfig::default().validate().unwrap();
}

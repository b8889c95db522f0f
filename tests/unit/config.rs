use std::collections::HashMap;

use super::*;
use crate::{foundation::core::Rgba8, foundation::error::CaptionError};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn empty_object_gives_reset_defaults() {
    let cfg = StyleConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, StyleConfig::default());
    assert_eq!(cfg.subtitle.color, Rgba8::WHITE);
    assert_eq!(cfg.subtitle.stroke_color, Rgba8::BLACK);
    assert_eq!(cfg.subtitle.stroke_width, 4.0);
    assert_eq!(cfg.watermark.color, Rgba8::WHITE);
    assert_eq!(cfg.watermark.opacity, 0.8);
    assert_eq!(cfg.font, None);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let cfg = StyleConfig::from_json_str(
        r##"{ "subtitle": { "color": "#ffff00" }, "watermark": { "opacity": 0.25 } }"##,
    )
    .unwrap();
    assert_eq!(cfg.subtitle.color, Rgba8::rgb(255, 255, 0));
    assert_eq!(cfg.subtitle.stroke_width, 4.0);
    assert_eq!(cfg.watermark.opacity, 0.25);
    assert_eq!(cfg.watermark.color, Rgba8::WHITE);
}

#[test]
fn colors_accept_byte_arrays() {
    let cfg = StyleConfig::from_json_str(r#"{ "subtitle": { "stroke_color": [1, 2, 3] } }"#)
        .unwrap();
    assert_eq!(cfg.subtitle.stroke_color, Rgba8::rgb(1, 2, 3));
}

#[test]
fn unknown_fields_are_rejected() {
    let err = StyleConfig::from_json_str(r##"{ "subtitle": { "colour": "#fff" } }"##).unwrap_err();
    assert!(matches!(err, CaptionError::Other(_)));
}

#[test]
fn negative_stroke_is_a_style_error() {
    let err = StyleConfig::from_json_str(r#"{ "subtitle": { "stroke_width": -1 } }"#).unwrap_err();
    assert!(matches!(err, CaptionError::InvalidStyleParameter(_)));
}

#[test]
fn relative_font_resolves_against_config_dir() {
    let dir = std::path::PathBuf::from("target").join("unit_config");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("style.json");
    std::fs::write(
        &path,
        r#"{ "font": "fonts/a.ttf", "bold_font": "fonts/a-bold.ttf" }"#,
    )
    .unwrap();

    let cfg = StyleConfig::from_path(&path).unwrap();
    assert_eq!(cfg.font, Some(dir.join("fonts/a.ttf")));
    assert_eq!(cfg.bold_font, Some(dir.join("fonts/a-bold.ttf")));
}

#[test]
fn missing_config_file_mentions_path() {
    let err = StyleConfig::from_path(Path::new("target/does/not/exist.json")).unwrap_err();
    assert!(err.to_string().contains("exist.json"));
}

#[test]
fn env_overrides_parse_and_filter() {
    let env = EnvOverrides::from_lookup(lookup(&[
        (FONT_ENV, "/fonts/x.otf"),
        (BOLD_FONT_ENV, "/fonts/x-bold.otf"),
        (MAX_IMAGE_BYTES_ENV, "2048"),
    ]));
    assert_eq!(env.font, Some(PathBuf::from("/fonts/x.otf")));
    assert_eq!(env.bold_font, Some(PathBuf::from("/fonts/x-bold.otf")));
    assert_eq!(env.max_image_bytes_or_default(), 2048);

    let env = EnvOverrides::from_lookup(lookup(&[(FONT_ENV, "  "), (MAX_IMAGE_BYTES_ENV, "0")]));
    assert_eq!(env, EnvOverrides::default());
    assert_eq!(env.max_image_bytes_or_default(), DEFAULT_MAX_IMAGE_BYTES);

    let env = EnvOverrides::from_lookup(lookup(&[(MAX_IMAGE_BYTES_ENV, "ten")]));
    assert_eq!(env.max_image_bytes, None);
}

#[test]
fn env_font_wins_over_file() {
    let mut cfg = StyleConfig {
        font: Some(PathBuf::from("file.ttf")),
        ..StyleConfig::default()
    };
    cfg.apply_env(&EnvOverrides::default());
    assert_eq!(cfg.font, Some(PathBuf::from("file.ttf")));

    cfg.apply_env(&EnvOverrides {
        font: Some(PathBuf::from("env.ttf")),
        bold_font: Some(PathBuf::from("env-bold.ttf")),
        max_image_bytes: None,
    });
    assert_eq!(cfg.font, Some(PathBuf::from("env.ttf")));
    assert_eq!(cfg.bold_font, Some(PathBuf::from("env-bold.ttf")));
}

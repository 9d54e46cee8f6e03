//! End-to-end pipeline tests over real temporary packages.

use enumgen_core::config::Config;
use enumgen_core::error::EnumgenError;
use enumgen_core::generate::generate;
use enumgen_core::shaper::Transform;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn package_with(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for (name, contents) in files {
        fs::write(dir.path().join(name), contents).expect("write source");
    }
    dir
}

fn config_for(dir: &Path) -> Config {
    Config {
        source_root: dir.to_path_buf(),
        ..Config::default()
    }
}

const COLORS: &str = r#"
/// A widget color.
///
/// enumgen:enum
pub struct Color(pub u8);

/// The primary color red.
pub const Red: Color = Color(0);
pub const Green: Color = Color(1);
pub const Blue: Color = Color(2);
"#;

#[test]
fn basic_package_generates_the_full_surface() {
    let dir = package_with(&[("color.rs", COLORS)]);
    let report = generate(&config_for(dir.path())).expect("generation should succeed");

    assert_eq!(report.type_count, 1);
    assert_eq!(report.value_count, 3);
    let output = report.output.expect("an output path");
    assert_eq!(output, dir.path().join("enumgen.rs"));

    let contents = fs::read_to_string(&output).expect("read output");
    assert!(contents.starts_with("// Code generated by \"enumgen\"; DO NOT EDIT.\n"));
    assert!(contents.contains("pub const ColorN: i64 = 3;"));
    assert!(contents.contains("static _ColorName: &str = \"RedGreenBlue\";"));
    assert!(contents.contains("static _ColorIndex: [usize; 4] = [0, 3, 8, 12];"));
    assert!(contents.contains("static _ColorValues: [Color; 3] = [Red, Green, Blue];"));
    assert!(contents.contains("map.insert(\"Red\", Red);"));
    assert!(contents.contains("map.entry(0i64).or_insert(\"The primary color red.\");"));
    assert!(contents.contains("impl std::fmt::Display for Color"));
    assert!(contents.contains("impl std::str::FromStr for Color"));
    // The compile-time numbering guard names every value.
    assert!(contents.contains("(((Blue).0)) as i64 - (2)"));
}

#[test]
fn generation_is_deterministic_and_skips_its_own_output() {
    let dir = package_with(&[("color.rs", COLORS)]);
    let config = config_for(dir.path());

    let first = generate(&config).expect("first run");
    let first_bytes = fs::read(first.output.as_ref().expect("path")).expect("read");

    let second = generate(&config).expect("second run");
    assert_eq!(second.type_count, 1);
    let second_bytes = fs::read(second.output.as_ref().expect("path")).expect("read");
    assert_eq!(first_bytes, second_bytes);
}

#[test]
fn shaping_trims_prefixes_and_transforms_labels() {
    let source = r#"
/// enumgen:enum
pub struct Color(pub u8);

pub const WidgetRed: Color = Color(0);
pub const WidgetDarkBlue: Color = Color(1);
"#;
    let dir = package_with(&[("color.rs", source)]);
    let config = Config {
        trim_prefixes: vec!["Widget".into()],
        transform: Some(Transform::Kebab),
        ..config_for(dir.path())
    };
    let report = generate(&config).expect("generation should succeed");

    let contents = fs::read_to_string(report.output.expect("path")).expect("read");
    assert!(contents.contains("static _ColorName: &str = \"reddark-blue\";"));
    assert!(contents.contains("map.insert(\"red\", WidgetRed);"));
    assert!(contents.contains("map.insert(\"dark-blue\", WidgetDarkBlue);"));
}

#[test]
fn aliases_count_but_share_one_label_slot() {
    let source = r#"
/// enumgen:enum
pub struct Color(pub u8);

pub const Red: Color = Color(0);
pub const Crimson: Color = Red;
pub const Green: Color = Color(1);
"#;
    let dir = package_with(&[("color.rs", source)]);
    let report = generate(&config_for(dir.path())).expect("generation should succeed");
    assert_eq!(report.value_count, 3);

    let contents = fs::read_to_string(report.output.expect("path")).expect("read");
    assert!(contents.contains("pub const ColorN: i64 = 3;"));
    assert!(contents.contains("static _ColorValues: [Color; 3] = [Red, Crimson, Green];"));
    // First declaration wins the label table; both names resolve back.
    assert!(contents.contains("static _ColorName: &str = \"RedGreen\";"));
    assert!(contents.contains("map.insert(\"Crimson\", Crimson);"));
}

#[test]
fn signal_markers_are_invisible_in_the_output() {
    let source = r#"
/// enumgen:enum
pub struct Color(pub u8);

pub const Red: Color = Color(0);
pub const Green: Color = Color(1);
const _: Color = Color(2);
"#;
    let dir = package_with(&[("color.rs", source)]);
    let report = generate(&config_for(dir.path())).expect("generation should succeed");
    assert_eq!(report.value_count, 2);

    let contents = fs::read_to_string(report.output.expect("path")).expect("read");
    assert!(contents.contains("pub const ColorN: i64 = 2;"));
    assert!(!contents.contains("__signal"));
}

#[test]
fn skip_directive_suppresses_a_constant() {
    let source = r#"
/// enumgen:enum
pub struct Color(pub u8);

pub const Red: Color = Color(0);
/// enumgen:skip
pub const Sentinel: Color = Color(255);
"#;
    let dir = package_with(&[("color.rs", source)]);
    let report = generate(&config_for(dir.path())).expect("generation should succeed");
    assert_eq!(report.value_count, 1);

    let contents = fs::read_to_string(report.output.expect("path")).expect("read");
    assert!(!contents.contains("Sentinel"));
}

#[test]
fn line_comments_override_display_labels() {
    let source = r#"
/// enumgen:enum
pub struct Color(pub u8);

pub const Red: Color = Color(0); // bright red
pub const Green: Color = Color(1);
"#;
    let dir = package_with(&[("color.rs", source)]);
    let config = Config {
        use_line_comment: true,
        ..config_for(dir.path())
    };
    let report = generate(&config).expect("generation should succeed");

    let contents = fs::read_to_string(report.output.expect("path")).expect("read");
    assert!(contents.contains("static _ColorName: &str = \"bright redGreen\";"));
    assert!(contents.contains("map.insert(\"Red\", Red);"));
    assert!(contents.contains("map.insert(\"bright red\", Red);"));
}

#[test]
fn extension_emits_delegating_lookups() {
    let basic = r#"
/// enumgen:enum
pub struct Basic(pub i64);

pub const Low: Basic = Basic(0);
pub const High: Basic = Basic(1);
"#;
    let more = r#"
/// enumgen:enum
pub struct More(pub Basic);

pub const Extra: More = More(Basic(4));
"#;
    let dir = package_with(&[("basic.rs", basic), ("more.rs", more)]);
    let config = Config {
        allow_extend: true,
        ..config_for(dir.path())
    };
    let report = generate(&config).expect("generation should succeed");
    assert_eq!(report.type_count, 2);

    let contents = fs::read_to_string(report.output.expect("path")).expect("read");
    assert!(contents.contains("return self.0.string();"));
    assert!(contents.contains("let mut base = Basic(0);"));
    assert!(contents.contains("*self = More(base);"));
    assert!(contents.contains("does not belong to More values"));
    // Extension depth shows up in the numbering guard's field chain.
    assert!(contents.contains("((((Extra).0).0)) as i64 - (4)"));
}

#[test]
fn extension_without_the_flag_is_rejected() {
    let source = r#"
/// enumgen:enum
pub struct Basic(pub i64);

pub const Low: Basic = Basic(0);

/// enumgen:enum
pub struct More(pub Basic);

pub const Extra: More = More(Basic(4));
"#;
    let dir = package_with(&[("types.rs", source)]);
    let err = generate(&config_for(dir.path())).unwrap_err();
    assert!(matches!(err, EnumgenError::UnsupportedBase { .. }));
}

#[test]
fn bitflag_package_gets_the_atomic_surface() {
    let source = r#"
/// enumgen:bitflag
pub struct Abilities(pub i64);

pub const Editable: Abilities = Abilities(0);
pub const Selectable: Abilities = Abilities(1);
pub const Draggable: Abilities = Abilities(2);
"#;
    let dir = package_with(&[("abilities.rs", source)]);
    let report = generate(&config_for(dir.path())).expect("generation should succeed");

    let contents = fs::read_to_string(report.output.expect("path")).expect("read");
    assert!(contents.contains("use std::sync::atomic::{AtomicI64, Ordering};"));
    assert!(contents.contains("pub fn has_flag(bits: &AtomicI64, f: Abilities) -> bool"));
    assert!(contents.contains("pub fn set_flag(bits: &AtomicI64, on: bool, flags: &[Abilities])"));
    assert!(contents.contains("pub fn bit_index_string(self) -> String"));
    assert!(contents.contains("pub fn set_string_or(&mut self, s: &str)"));
}

#[test]
fn extended_bitflag_strings_render_base_bits() {
    let abilities = r#"
/// enumgen:bitflag
pub struct Abilities(pub i64);

pub const Editable: Abilities = Abilities(0);
pub const Selectable: Abilities = Abilities(1);
"#;
    let more = r#"
/// enumgen:bitflag
pub struct MoreAbilities(pub Abilities);

pub const Resizable: MoreAbilities = MoreAbilities(Abilities(8));
"#;
    let dir = package_with(&[("abilities.rs", abilities), ("more.rs", more)]);
    let config = Config {
        allow_extend: true,
        ..config_for(dir.path())
    };
    let report = generate(&config).expect("generation should succeed");
    assert_eq!(report.type_count, 2);

    let contents = fs::read_to_string(report.output.expect("path")).expect("read");
    // The composite rendering starts from the base's view of the mask,
    // mirroring how set_string_or accepts base labels.
    assert!(contents.contains("base.set_int64(bits);"));
    assert!(contents.contains("let mut out = base.string();"));
    assert!(contents.contains("if base.set_string_or(part).is_ok()"));
}

#[test]
fn bit_indexes_outside_the_mask_width_are_rejected() {
    let source = r#"
/// enumgen:bitflag
pub struct Abilities(pub i64);

pub const Editable: Abilities = Abilities(0);
pub const Broken: Abilities = Abilities(64);
"#;
    let dir = package_with(&[("abilities.rs", source)]);
    let err = generate(&config_for(dir.path())).unwrap_err();
    match err {
        EnumgenError::InvalidBitIndex {
            type_name,
            value_name,
            numeric,
        } => {
            assert_eq!(type_name, "Abilities");
            assert_eq!(value_name, "Broken");
            assert_eq!(numeric, 64);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dir.path().join("enumgen.rs").exists());
}

#[test]
fn bitflag_requires_a_signed_64_bit_base() {
    let source = r#"
/// enumgen:bitflag
pub struct Abilities(pub u8);

pub const Editable: Abilities = Abilities(0);
"#;
    let dir = package_with(&[("abilities.rs", source)]);
    let err = generate(&config_for(dir.path())).unwrap_err();
    assert!(matches!(err, EnumgenError::UnsupportedBase { .. }));
}

#[test]
fn label_collisions_fail_without_touching_the_output() {
    let source = r#"
/// enumgen:enum
pub struct Color(pub u8);

pub const Red: Color = Color(0);
pub const RED: Color = Color(1);
"#;
    let dir = package_with(&[("color.rs", source)]);
    let config = Config {
        transform: Some(Transform::Lower),
        ..config_for(dir.path())
    };
    let err = generate(&config).unwrap_err();
    assert!(matches!(err, EnumgenError::LabelCollision { .. }));
    assert!(!dir.path().join("enumgen.rs").exists());
}

#[test]
fn override_shadowing_a_label_fails_generation() {
    let source = r#"
/// enumgen:enum
pub struct Color(pub u8);

pub const Red: Color = Color(0); // Green
pub const Green: Color = Color(1);
"#;
    let dir = package_with(&[("color.rs", source)]);
    let config = Config {
        use_line_comment: true,
        ..config_for(dir.path())
    };
    let err = generate(&config).unwrap_err();
    assert!(matches!(err, EnumgenError::LabelCollision { .. }));
    assert!(!dir.path().join("enumgen.rs").exists());
}

#[test]
fn unknown_directives_are_reported_with_their_declaration() {
    let source = r#"
/// enumgen:enumerate
pub struct Color(pub u8);

pub const Red: Color = Color(0);
"#;
    let dir = package_with(&[("color.rs", source)]);
    let err = generate(&config_for(dir.path())).unwrap_err();
    match err {
        EnumgenError::InvalidDirective { directive, decl, .. } => {
            assert_eq!(directive, "enumgen:enumerate");
            assert_eq!(decl, "Color");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_directory_is_not_a_package() {
    let dir = TempDir::new().expect("temp dir");
    let err = generate(&config_for(dir.path())).unwrap_err();
    assert!(matches!(err, EnumgenError::NoPackage { .. }));
}

#[test]
fn annotated_types_without_values_are_an_error() {
    let source = r#"
/// enumgen:enum
pub struct Color(pub u8);
"#;
    let dir = package_with(&[("color.rs", source)]);
    let err = generate(&config_for(dir.path())).unwrap_err();
    assert!(matches!(err, EnumgenError::NoValues { .. }));
}

#[test]
fn optional_layers_and_header_comment_appear_on_request() {
    let dir = package_with(&[("color.rs", COLORS)]);
    let config = Config {
        emit_json: true,
        emit_sql: true,
        comment_header: Some("widget colors".into()),
        ..config_for(dir.path())
    };
    let report = generate(&config).expect("generation should succeed");

    let contents = fs::read_to_string(report.output.expect("path")).expect("read");
    assert!(contents.contains("// widget colors\n"));
    assert!(contents.contains("impl serde::Serialize for Color"));
    assert!(contents.contains("impl<'de> serde::Deserialize<'de> for Color"));
    assert!(contents.contains("pub fn sql_scan(&mut self, value: &[u8])"));
    assert!(!contents.contains("marshal_yaml"));
}

#[test]
fn scattered_values_emit_per_run_tables() {
    let source = r#"
/// enumgen:enum
pub struct Code(pub i64);

pub const A: Code = Code(0);
pub const B: Code = Code(1);
pub const C: Code = Code(5);
pub const D: Code = Code(6);
pub const E: Code = Code(9);
"#;
    let dir = package_with(&[("code.rs", source)]);
    let report = generate(&config_for(dir.path())).expect("generation should succeed");

    let contents = fs::read_to_string(report.output.expect("path")).expect("read");
    assert!(contents.contains("static _CodeName_0: &str = \"AB\";"));
    assert!(contents.contains("static _CodeName_1: &str = \"CD\";"));
    // A singleton run carries only its label.
    assert!(contents.contains("static _CodeName_2: &str = \"E\";"));
    assert!(!contents.contains("_CodeIndex_2"));
    assert!(contents.contains("9 => _CodeName_2.to_string(),"));
}

#[test]
fn many_runs_fall_back_to_a_map() {
    let mut source = String::from("/// enumgen:enum\npub struct Code(pub i64);\n\n");
    for i in 0..12 {
        source.push_str(&format!("pub const V{i}: Code = Code({});\n", i * 2));
    }
    let dir = package_with(&[("code.rs", &source)]);
    let report = generate(&config_for(dir.path())).expect("generation should succeed");

    let contents = fs::read_to_string(report.output.expect("path")).expect("read");
    assert!(contents.contains("static _CodeMap: LazyLock<HashMap<i64, &'static str>>"));
    assert!(contents.contains("map.insert(22i64, \"V11\");"));
    assert!(!contents.contains("_CodeName_0"));
}

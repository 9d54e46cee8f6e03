//! The emitter: renders the generated source file for one package.
//!
//! Rendering is plain text assembly. The assembled body is validated and
//! normalised through `syn` + `prettyplease` (the strict formatter), the
//! stable tool header is prepended afterwards (the formatter drops line
//! comments), and the result lands on disk through a temp-file rename so
//! a failed run leaves no partial output.

mod bitflag;
mod core;
mod marshal;

use crate::config::Config;
use crate::error::{EnumgenError, Result};
use crate::partition::partition;
use crate::value::{EnumType, Package};
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Renders, formats, and writes the package's generated file.
/// Returns the output path and the number of bytes written.
pub fn emit_package(pkg: &Package, config: &Config) -> Result<(PathBuf, usize)> {
    let body = render_package(pkg, config);
    let formatted = format_source(&body)?;
    let output = format!("{}{}", header(config), formatted);

    let path = output_path(pkg, config);
    write_atomic(&path, output.as_bytes())?;
    info!("Wrote {} bytes to {:?}", output.len(), path);
    Ok((path, output.len()))
}

/// Assembles the unformatted body for every type in the package.
/// Exposed within the crate so tests can inspect the raw emission.
pub(crate) fn render_package(pkg: &Package, config: &Config) -> String {
    let mut buf = String::new();

    let _ = writeln!(buf, "//! Enum support for the `{}` package.", pkg.name);
    buf.push_str("//!\n");
    buf.push_str("//! Annotated types are expected to derive `Clone` and `Copy`.\n");
    buf.push_str("#![allow(dead_code, non_upper_case_globals, clippy::all)]\n\n");
    buf.push_str("use super::*;\n\n");
    buf.push_str("use std::collections::HashMap;\n");
    buf.push_str("use std::sync::LazyLock;\n");
    if pkg.types.iter().any(|t| t.is_bit_flag) {
        buf.push_str("use std::sync::atomic::{AtomicI64, Ordering};\n");
    }
    buf.push('\n');

    for ty in &pkg.types {
        debug!("Emitting type {}", ty.name);
        let part = partition(ty);
        core::emit_tables(&mut buf, ty, &part, config);
        if ty.is_bit_flag {
            bitflag::emit_impl(&mut buf, ty, &part, pkg, config);
        } else {
            core::emit_impl(&mut buf, ty, &part, pkg, config);
        }
        core::emit_order_detector(&mut buf, ty, pkg);
        marshal::emit_layers(&mut buf, ty, pkg, config);
    }
    buf
}

/// Runs the body through the target language's formatter.
fn format_source(body: &str) -> Result<String> {
    let ast = syn::parse_file(body).map_err(|err| EnumgenError::emit_format(err.to_string()))?;
    Ok(prettyplease::unparse(&ast))
}

/// The stable tool header plus the configured free-form comment.
fn header(config: &Config) -> String {
    let mut head = String::from("// Code generated by \"enumgen\"; DO NOT EDIT.\n");
    if let Some(comment) = &config.comment_header {
        for line in comment.lines() {
            if line.is_empty() {
                head.push_str("//\n");
            } else {
                let _ = writeln!(head, "// {line}");
            }
        }
    }
    head.push('\n');
    head
}

/// Resolves the output path relative to the discovered package.
pub(crate) fn output_path(pkg: &Package, config: &Config) -> PathBuf {
    match &config.output_path {
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => pkg.dir.join(path),
        None => pkg.dir.join("enumgen.rs"),
    }
}

/// Writes through a sibling temp file renamed onto the target on success.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|err| EnumgenError::write(path, err.to_string()))?;
    tmp.write_all(bytes)
        .map_err(|err| EnumgenError::write(path, err.to_string()))?;
    tmp.persist(path)
        .map_err(|err| EnumgenError::write(path, err.to_string()))?;
    Ok(())
}

/// Renders a string as a Rust string literal.
pub(crate) fn quoted(s: &str) -> String {
    format!("{s:?}")
}

/// Constructor expression for the zero value of `ty`, following the
/// extension chain down to the root primitive.
pub(crate) fn zero_expr(ty: &EnumType, pkg: &Package) -> String {
    match ty.extends.as_deref().and_then(|base| pkg.find_type(base)) {
        Some(base) => format!("{}({})", ty.name, zero_expr(base, pkg)),
        None => format!("{}(0)", ty.name),
    }
}

/// Field access chain reaching the primitive inside a value of `ty`,
/// e.g. `((ExtraVal).0).0` for a type one extension level deep.
pub(crate) fn primitive_access(ty: &EnumType, pkg: &Package, value_ident: &str) -> String {
    let mut expr = format!("({value_ident})");
    for _ in 0..pkg.extension_depth(ty) {
        expr = format!("({expr}.0)");
    }
    expr
}

/// The base type this one extends, when extension is in play.
pub(crate) fn base_type<'a>(ty: &EnumType, pkg: &'a Package) -> Option<&'a EnumType> {
    ty.extends.as_deref().and_then(|base| pkg.find_type(base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Repr, Value};
    use pretty_assertions::assert_eq;

    fn value(name: &str, numeric: i64) -> Value {
        Value {
            original_name: name.to_string(),
            label: name.to_string(),
            numeric,
            doc_string: String::new(),
            display_override: None,
            is_signal_only: false,
        }
    }

    fn package() -> Package {
        let basic = EnumType {
            name: "Basic".into(),
            extends: None,
            is_bit_flag: false,
            doc_string: String::new(),
            source_file: "basic.rs".into(),
            repr: Repr::I64,
            values: vec![value("Low", 0), value("High", 1)],
        };
        let more = EnumType {
            name: "More".into(),
            extends: Some("Basic".into()),
            is_bit_flag: false,
            doc_string: String::new(),
            source_file: "more.rs".into(),
            repr: Repr::I64,
            values: vec![value("Extra", 4)],
        };
        Package {
            name: "levels".into(),
            dir: "levels".into(),
            types: vec![basic, more],
        }
    }

    #[test]
    fn zero_expr_follows_the_extension_chain() {
        let pkg = package();
        assert_eq!(zero_expr(&pkg.types[0], &pkg), "Basic(0)");
        assert_eq!(zero_expr(&pkg.types[1], &pkg), "More(Basic(0))");
    }

    #[test]
    fn primitive_access_matches_extension_depth() {
        let pkg = package();
        assert_eq!(primitive_access(&pkg.types[0], &pkg, "Low"), "((Low).0)");
        assert_eq!(
            primitive_access(&pkg.types[1], &pkg, "Extra"),
            "(((Extra).0).0)"
        );
    }

    #[test]
    fn header_includes_tool_marker_and_comment() {
        let config = Config {
            comment_header: Some("hand over the wheel\nto the machines".into()),
            ..Config::default()
        };
        let head = header(&config);
        assert!(head.starts_with("// Code generated by \"enumgen\"; DO NOT EDIT.\n"));
        assert!(head.contains("// hand over the wheel\n"));
        assert!(head.contains("// to the machines\n"));
    }

    #[test]
    fn rendered_package_formats_cleanly() {
        let pkg = package();
        let config = Config {
            allow_extend: true,
            ..Config::default()
        };
        let body = render_package(&pkg, &config);
        let formatted = format_source(&body).expect("emitted body should parse");
        assert!(formatted.contains("_BasicNameToValueMap"));
        assert!(formatted.contains("_MoreNameToValueMap"));
        assert!(formatted.contains("pub const BasicN: i64 = 2;"));
    }

    #[test]
    fn output_path_defaults_into_the_package() {
        let pkg = package();
        assert_eq!(
            output_path(&pkg, &Config::default()),
            PathBuf::from("levels/enumgen.rs")
        );
        let config = Config {
            output_path: Some("generated.rs".into()),
            ..Config::default()
        };
        assert_eq!(
            output_path(&pkg, &config),
            PathBuf::from("levels/generated.rs")
        );
    }
}

//! The inspector: walks the declaration tree of one package and builds
//! the enum type model.
//!
//! A package is one directory of Rust source files, scanned
//! non-recursively in lexicographic file order. A candidate type is a
//! one-field tuple struct whose doc comment contains an `enumgen:enum`
//! or `enumgen:bitflag` directive line; its values are the top-level
//! constants declared with that type.

use crate::config::Config;
use crate::error::{EnumgenError, Result};
use crate::value::{EnumType, Package, Repr, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use syn::spanned::Spanned;
use tracing::{debug, info, trace};
use walkdir::WalkDir;

/// Recognised directive verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    Enum,
    BitFlag,
    Skip,
}

const DIRECTIVE_PREFIX: &str = "enumgen:";

/// Generated files open with this marker and are never rescanned.
const GENERATED_MARKER: &str = "// Code generated";

struct ParsedFile {
    path: PathBuf,
    source: String,
    ast: syn::File,
}

/// Scans the configured source root and produces the package model.
pub fn scan_package(config: &Config) -> Result<Package> {
    let root = &config.source_root;
    info!("Scanning package at {:?}", root);

    let mut errors = Vec::new();
    let files = load_files(root, &mut errors)?;
    if files.is_empty() {
        return Err(EnumgenError::NoPackage { root: root.clone() });
    }

    let name = root
        .canonicalize()
        .unwrap_or_else(|_| root.clone())
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "package".to_string());

    let mut types = collect_types(&files, config, &mut errors);
    resolve_bases(&mut types, config, &mut errors);
    collect_values(&files, &mut types, config, &mut errors);

    for ty in &types {
        if ty.value_count() == 0 {
            errors.push(EnumgenError::NoValues {
                type_name: ty.name.clone(),
            });
        }
        if ty.is_bit_flag {
            // Bit-flag constants are shift amounts into an i64 mask.
            for v in ty.enumerated_values() {
                if !(0..=63).contains(&v.numeric) {
                    errors.push(EnumgenError::InvalidBitIndex {
                        type_name: ty.name.clone(),
                        value_name: v.original_name.clone(),
                        numeric: v.numeric,
                    });
                }
            }
        }
    }

    EnumgenError::collect(errors)?;

    info!(
        "Found {} enum types in package {}",
        types.len(),
        name
    );
    Ok(Package {
        name,
        dir: root.clone(),
        types,
    })
}

/// Reads and parses every Rust source file directly inside `root`.
fn load_files(root: &Path, errors: &mut Vec<EnumgenError>) -> Result<Vec<ParsedFile>> {
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "rs"))
        .collect();
    paths.sort();

    let mut files = Vec::new();
    for path in paths {
        let source = fs::read_to_string(&path)?;
        if source.starts_with(GENERATED_MARKER) {
            trace!("Skipping generated file {:?}", path);
            continue;
        }
        match syn::parse_file(&source) {
            Ok(ast) => {
                trace!("Parsed {} items from {:?}", ast.items.len(), path);
                files.push(ParsedFile { path, source, ast });
            }
            Err(err) => {
                errors.push(EnumgenError::parse(&path, err.to_string()));
            }
        }
    }
    Ok(files)
}

/// Extracts the doc comment lines from an attribute list.
fn doc_lines(attrs: &[syn::Attribute]) -> Vec<String> {
    let mut lines = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        if let syn::Meta::NameValue(nv) = &attr.meta
            && let syn::Expr::Lit(expr) = &nv.value
            && let syn::Lit::Str(lit) = &expr.lit
        {
            lines.push(lit.value().trim().to_string());
        }
    }
    lines
}

/// Finds the directive in a doc block. Unknown `enumgen:` verbs are an
/// error; the first recognised directive wins.
fn find_directive(
    docs: &[String],
    decl: &str,
    path: &Path,
) -> std::result::Result<Option<Directive>, EnumgenError> {
    for line in docs {
        if !line.starts_with(DIRECTIVE_PREFIX) {
            continue;
        }
        return match line.as_str() {
            "enumgen:enum" => Ok(Some(Directive::Enum)),
            "enumgen:bitflag" => Ok(Some(Directive::BitFlag)),
            "enumgen:skip" => Ok(Some(Directive::Skip)),
            other => Err(EnumgenError::InvalidDirective {
                directive: other.to_string(),
                decl: decl.to_string(),
                file: path.to_path_buf(),
            }),
        };
    }
    Ok(None)
}

/// The doc string with directive lines removed and blank edges trimmed.
fn doc_string(docs: &[String]) -> String {
    let kept: Vec<&str> = docs
        .iter()
        .filter(|line| !line.starts_with(DIRECTIVE_PREFIX))
        .map(|line| line.as_str())
        .collect();
    kept.join(" ").trim().to_string()
}

/// The single unnamed field's type identifier, for candidate structs.
fn tuple_base_ident(item: &syn::ItemStruct) -> Option<String> {
    let syn::Fields::Unnamed(fields) = &item.fields else {
        return None;
    };
    if fields.unnamed.len() != 1 {
        return None;
    }
    match &fields.unnamed[0].ty {
        syn::Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        _ => None,
    }
}

/// First pass: candidate types, in directive occurrence order. The base
/// identifier is parked in `extends` until `resolve_bases` runs.
fn collect_types(
    files: &[ParsedFile],
    _config: &Config,
    errors: &mut Vec<EnumgenError>,
) -> Vec<EnumType> {
    let mut types = Vec::new();
    for file in files {
        for item in &file.ast.items {
            let syn::Item::Struct(item_struct) = item else {
                continue;
            };
            let docs = doc_lines(&item_struct.attrs);
            let name = item_struct.ident.to_string();
            let directive = match find_directive(&docs, &name, &file.path) {
                Ok(directive) => directive,
                Err(err) => {
                    errors.push(err);
                    continue;
                }
            };
            let is_bit_flag = match directive {
                Some(Directive::Enum) => false,
                Some(Directive::BitFlag) => true,
                Some(Directive::Skip) | None => continue,
            };

            let Some(base) = tuple_base_ident(item_struct) else {
                errors.push(EnumgenError::UnsupportedBase {
                    type_name: name,
                    base: "non-integer".to_string(),
                });
                continue;
            };

            debug!("Found enum type {} (base {})", name, base);
            types.push(EnumType {
                name,
                extends: Some(base),
                is_bit_flag,
                doc_string: doc_string(&docs),
                source_file: file.path.clone(),
                repr: Repr::I64,
                values: Vec::new(),
            });
        }
    }
    types
}

/// Second pass over the collected candidates: classify each base as a
/// primitive repr or an extension of another candidate.
fn resolve_bases(types: &mut [EnumType], config: &Config, errors: &mut Vec<EnumgenError>) {
    let names: Vec<String> = types.iter().map(|t| t.name.clone()).collect();
    let bases: HashMap<String, String> = types
        .iter()
        .map(|t| (t.name.clone(), t.extends.clone().unwrap_or_default()))
        .collect();

    for ty in types.iter_mut() {
        let base = ty.extends.take().unwrap_or_default();

        if let Some(repr) = Repr::from_ident(&base) {
            if ty.is_bit_flag && repr != Repr::I64 {
                errors.push(EnumgenError::UnsupportedBase {
                    type_name: ty.name.clone(),
                    base,
                });
                continue;
            }
            ty.repr = repr;
            continue;
        }

        if !config.allow_extend {
            errors.push(EnumgenError::UnsupportedBase {
                type_name: ty.name.clone(),
                base,
            });
            continue;
        }
        if !names.contains(&base) {
            errors.push(EnumgenError::UnknownBase {
                type_name: ty.name.clone(),
                base,
            });
            continue;
        }

        // Follow the parent chain to the root repr, guarding against a
        // declared cycle.
        let mut current = base.clone();
        let mut seen = vec![ty.name.clone()];
        let repr = loop {
            if seen.contains(&current) {
                break None;
            }
            seen.push(current.clone());
            let parent_base = bases.get(&current).cloned().unwrap_or_default();
            if let Some(repr) = Repr::from_ident(&parent_base) {
                break Some(repr);
            }
            if !names.contains(&parent_base) {
                // The parent itself is broken; its own entry reports it.
                break Some(Repr::I64);
            }
            current = parent_base;
        };

        match repr {
            Some(repr) => {
                ty.repr = repr;
                ty.extends = Some(base);
            }
            None => {
                errors.push(EnumgenError::UnknownBase {
                    type_name: ty.name.clone(),
                    base,
                });
            }
        }
    }
}

/// Evaluates the constant expression forms the front-end resolves:
/// integer literals, unary minus, `<< | & + - *`, parentheses, casts,
/// single-argument constructor calls, field access, and references to
/// previously evaluated constants.
fn eval_const_expr(
    expr: &syn::Expr,
    symbols: &HashMap<String, i64>,
) -> std::result::Result<i64, String> {
    match expr {
        syn::Expr::Lit(lit) => match &lit.lit {
            syn::Lit::Int(int) => int.base10_parse::<i64>().map_err(|e| e.to_string()),
            other => Err(format!("unsupported literal: {other:?}")),
        },
        syn::Expr::Unary(unary) => match unary.op {
            syn::UnOp::Neg(_) => Ok(-eval_const_expr(&unary.expr, symbols)?),
            _ => Err("unsupported unary operator".to_string()),
        },
        syn::Expr::Binary(binary) => {
            let lhs = eval_const_expr(&binary.left, symbols)?;
            let rhs = eval_const_expr(&binary.right, symbols)?;
            match binary.op {
                syn::BinOp::Shl(_) => Ok(lhs << rhs),
                syn::BinOp::BitOr(_) => Ok(lhs | rhs),
                syn::BinOp::BitAnd(_) => Ok(lhs & rhs),
                syn::BinOp::Add(_) => Ok(lhs + rhs),
                syn::BinOp::Sub(_) => Ok(lhs - rhs),
                syn::BinOp::Mul(_) => Ok(lhs * rhs),
                _ => Err("unsupported binary operator".to_string()),
            }
        }
        syn::Expr::Paren(paren) => eval_const_expr(&paren.expr, symbols),
        syn::Expr::Group(group) => eval_const_expr(&group.expr, symbols),
        syn::Expr::Cast(cast) => eval_const_expr(&cast.expr, symbols),
        syn::Expr::Call(call) => {
            if call.args.len() == 1 {
                eval_const_expr(&call.args[0], symbols)
            } else {
                Err("unsupported constructor arity".to_string())
            }
        }
        syn::Expr::Field(field) => eval_const_expr(&field.base, symbols),
        syn::Expr::Path(path) => {
            let ident = path
                .path
                .segments
                .last()
                .map(|segment| segment.ident.to_string())
                .unwrap_or_default();
            symbols
                .get(&ident)
                .copied()
                .ok_or_else(|| format!("unknown constant {ident}"))
        }
        _ => Err("unsupported constant expression".to_string()),
    }
}

/// The type identifier a constant is declared at.
fn const_type_ident(ty: &syn::Type) -> Option<String> {
    match ty {
        syn::Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        _ => None,
    }
}

/// Recovers a trailing `// ...` comment from the constant's source line.
/// syn drops line comments, so this goes back to the text using the
/// semicolon's span location.
fn trailing_line_comment(source: &str, item: &syn::ItemConst) -> Option<String> {
    let location = item.semi_token.span().start();
    let line = source.lines().nth(location.line.checked_sub(1)?)?;
    // Span columns count characters; the slice below needs bytes.
    let byte_offset = line
        .char_indices()
        .nth(location.column)
        .map_or(line.len(), |(offset, _)| offset);
    let after_semi = line.get(byte_offset..)?;
    let comment = after_semi.split_once("//")?.1.trim();
    if comment.is_empty() {
        None
    } else {
        Some(comment.to_string())
    }
}

/// Re-parses a `const _` item that syn surfaces as verbatim tokens.
fn parse_underscore_const(tokens: &proc_macro2::TokenStream) -> Option<syn::ItemConst> {
    let text = tokens.to_string();
    if !(text.starts_with("const _") || text.starts_with("pub const _")) {
        return None;
    }
    let patched = text.replacen('_', "__signal", 1);
    syn::parse_str::<syn::ItemConst>(&patched).ok()
}

/// Third pass: collect constants for every candidate type, in
/// declaration order, threading the evaluator's symbol table through the
/// package in source order.
fn collect_values(
    files: &[ParsedFile],
    types: &mut [EnumType],
    config: &Config,
    errors: &mut Vec<EnumgenError>,
) {
    let mut symbols: HashMap<String, i64> = HashMap::new();

    for file in files {
        for item in &file.ast.items {
            let (item_const, is_signal) = match item {
                syn::Item::Const(c) if c.ident == "_" => (c.clone(), true),
                syn::Item::Const(c) => (c.clone(), false),
                syn::Item::Verbatim(tokens) => match parse_underscore_const(tokens) {
                    Some(c) => (c, true),
                    None => continue,
                },
                _ => continue,
            };

            let Some(type_ident) = const_type_ident(&item_const.ty) else {
                continue;
            };
            let Some(ty) = types.iter_mut().find(|t| t.name == type_ident) else {
                continue;
            };

            let docs = doc_lines(&item_const.attrs);
            let const_name = item_const.ident.to_string();
            match find_directive(&docs, &const_name, &file.path) {
                Ok(Some(Directive::Skip)) => {
                    trace!("Skipping const {}", const_name);
                    continue;
                }
                Ok(Some(_)) => {
                    errors.push(EnumgenError::InvalidDirective {
                        directive: "enum directive on a constant".to_string(),
                        decl: const_name,
                        file: file.path.clone(),
                    });
                    continue;
                }
                Ok(None) => {}
                Err(err) => {
                    errors.push(err);
                    continue;
                }
            }

            let numeric = match eval_const_expr(&item_const.expr, &symbols) {
                Ok(numeric) => numeric,
                Err(message) => {
                    errors.push(EnumgenError::parse(
                        &file.path,
                        format!("constant {const_name}: {message}"),
                    ));
                    continue;
                }
            };
            if !is_signal {
                symbols.insert(const_name.clone(), numeric);
            }

            let display_override = if config.use_line_comment && !is_signal {
                trailing_line_comment(&file.source, &item_const)
            } else {
                None
            };

            trace!(
                "Found value {}::{} = {}",
                type_ident, const_name, numeric
            );
            ty.values.push(Value {
                label: const_name.clone(),
                original_name: const_name,
                numeric,
                doc_string: doc_string(&docs),
                display_override,
                is_signal_only: is_signal,
            });
        }
    }
}

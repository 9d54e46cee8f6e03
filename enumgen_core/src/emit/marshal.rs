//! Marshalling layer emission. Every layer routes through the same two
//! primitives (`string` and `set_string`) so the strategy tables stay
//! the single source of truth.

use super::zero_expr;
use crate::config::Config;
use crate::value::{EnumType, Package};
use std::fmt::Write as _;

pub(super) fn emit_layers(buf: &mut String, ty: &EnumType, pkg: &Package, config: &Config) {
    if config.emit_text {
        emit_text(buf, ty, pkg);
    }
    if config.emit_json {
        emit_json(buf, ty, pkg);
    }
    if config.emit_yaml {
        emit_yaml(buf, ty);
    }
    if config.emit_sql {
        emit_sql(buf, ty);
    }
    if config.emit_graphql {
        emit_graphql(buf, ty);
    }
}

fn emit_text(buf: &mut String, ty: &EnumType, pkg: &Package) {
    let t = &ty.name;

    let _ = writeln!(buf, "impl std::fmt::Display for {t} {{");
    buf.push_str("fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {\n");
    buf.push_str("f.write_str(&self.string())\n");
    buf.push_str("}\n}\n\n");

    let _ = writeln!(buf, "impl std::str::FromStr for {t} {{");
    buf.push_str("type Err = String;\n\n");
    buf.push_str("fn from_str(s: &str) -> Result<Self, Self::Err> {\n");
    let _ = writeln!(buf, "let mut v = {};", zero_expr(ty, pkg));
    buf.push_str("v.set_string(s)?;\n");
    buf.push_str("Ok(v)\n");
    buf.push_str("}\n}\n\n");

    let _ = writeln!(buf, "impl {t} {{");
    buf.push_str("pub fn marshal_text(self) -> Vec<u8> {\n");
    buf.push_str("self.string().into_bytes()\n");
    buf.push_str("}\n\n");
    buf.push_str("pub fn unmarshal_text(&mut self, text: &[u8]) -> Result<(), String> {\n");
    buf.push_str("let s = std::str::from_utf8(text).map_err(|e| e.to_string())?;\n");
    buf.push_str("self.set_string(s)\n");
    buf.push_str("}\n}\n\n");
}

fn emit_json(buf: &mut String, ty: &EnumType, pkg: &Package) {
    let t = &ty.name;

    let _ = writeln!(buf, "impl serde::Serialize for {t} {{");
    buf.push_str("fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>\n");
    buf.push_str("where\nS: serde::Serializer,\n{\n");
    buf.push_str("serializer.serialize_str(&self.string())\n");
    buf.push_str("}\n}\n\n");

    let _ = writeln!(buf, "impl<'de> serde::Deserialize<'de> for {t} {{");
    buf.push_str("fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>\n");
    buf.push_str("where\nD: serde::Deserializer<'de>,\n{\n");
    buf.push_str("let s = <String as serde::Deserialize>::deserialize(deserializer)?;\n");
    let _ = writeln!(buf, "let mut v = {};", zero_expr(ty, pkg));
    buf.push_str("v.set_string(&s).map_err(serde::de::Error::custom)?;\n");
    buf.push_str("Ok(v)\n");
    buf.push_str("}\n}\n\n");
}

fn emit_yaml(buf: &mut String, ty: &EnumType) {
    let t = &ty.name;

    let _ = writeln!(buf, "impl {t} {{");
    buf.push_str("pub fn marshal_yaml(self) -> String {\n");
    buf.push_str("self.string()\n");
    buf.push_str("}\n\n");
    buf.push_str("/// Decodes a scalar node. A label mismatch is reported on stderr\n");
    buf.push_str("/// and leaves the value unchanged.\n");
    buf.push_str("pub fn unmarshal_yaml(&mut self, node: &str) {\n");
    buf.push_str("let scalar = node.trim().trim_matches(|c| c == '\"' || c == '\\'');\n");
    buf.push_str("if let Err(err) = self.set_string(scalar) {\n");
    buf.push_str("eprintln!(\"{}\", err);\n");
    buf.push_str("}\n}\n}\n\n");
}

fn emit_sql(buf: &mut String, ty: &EnumType) {
    let t = &ty.name;

    let _ = writeln!(buf, "impl {t} {{");
    buf.push_str("pub fn sql_value(self) -> String {\n");
    buf.push_str("self.string()\n");
    buf.push_str("}\n\n");
    buf.push_str("pub fn sql_scan(&mut self, value: &[u8]) -> Result<(), String> {\n");
    buf.push_str("let s = std::str::from_utf8(value).map_err(|e| e.to_string())?;\n");
    buf.push_str("self.set_string(s.trim())\n");
    buf.push_str("}\n}\n\n");
}

fn emit_graphql(buf: &mut String, ty: &EnumType) {
    let t = &ty.name;

    let _ = writeln!(buf, "impl {t} {{");
    buf.push_str("pub fn marshal_gql<W: std::fmt::Write>(self, w: &mut W) -> std::fmt::Result {\n");
    buf.push_str("write!(w, \"{:?}\", self.string())\n");
    buf.push_str("}\n\n");
    buf.push_str("pub fn unmarshal_gql(&mut self, value: &str) -> Result<(), String> {\n");
    buf.push_str("self.set_string(value.trim().trim_matches('\"'))\n");
    buf.push_str("}\n}\n\n");
}

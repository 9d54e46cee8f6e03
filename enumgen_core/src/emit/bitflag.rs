//! Method emission for bit-flag types. Constants hold bit indexes;
//! masks live in caller-owned `AtomicI64` storage and the composite
//! string form joins set-bit labels with `|`.

use super::{base_type, zero_expr};
use crate::config::Config;
use crate::partition::Partition;
use crate::value::{EnumType, Package};
use std::fmt::Write as _;

pub(super) fn emit_impl(
    buf: &mut String,
    ty: &EnumType,
    part: &Partition,
    pkg: &Package,
    config: &Config,
) {
    let t = &ty.name;
    let base = base_type(ty, pkg);

    let miss = match base {
        Some(_) => "self.0.bit_index_string()".to_string(),
        None => "self.int64().to_string()".to_string(),
    };

    let _ = writeln!(buf, "impl {t} {{");

    buf.push_str("/// Returns whether the bit indexed by `f` is set in `bits`.\n");
    let _ = writeln!(buf, "pub fn has_flag(bits: &AtomicI64, f: {t}) -> bool {{");
    buf.push_str("bits.load(Ordering::SeqCst) & (1 << f.int64()) != 0\n");
    buf.push_str("}\n\n");

    buf.push_str("/// Sets or clears the bits indexed by `flags` with one store.\n");
    buf.push_str("/// Publication only; concurrent callers may overwrite each other.\n");
    let _ = writeln!(
        buf,
        "pub fn set_flag(bits: &AtomicI64, on: bool, flags: &[{t}]) {{"
    );
    buf.push_str("let mut mask = 0i64;\n");
    buf.push_str("for f in flags {\nmask |= 1 << f.int64();\n}\n");
    buf.push_str("let old = bits.load(Ordering::SeqCst);\n");
    buf.push_str("let new = if on { old | mask } else { old & !mask };\n");
    buf.push_str("bits.store(new, Ordering::SeqCst);\n");
    buf.push_str("}\n\n");

    buf.push_str("/// Renders a mask as the `|`-joined labels of its set bits, in\n");
    buf.push_str("/// declaration order, base flags first.\n");
    buf.push_str("pub fn string(self) -> String {\n");
    buf.push_str("let bits = self.int64();\n");
    match base {
        Some(base_ty) => {
            let _ = writeln!(buf, "let mut base = {};", zero_expr(base_ty, pkg));
            buf.push_str("base.set_int64(bits);\n");
            buf.push_str("let mut out = base.string();\n");
        }
        None => buf.push_str("let mut out = String::new();\n"),
    }
    buf.push_str("for f in Self::values() {\n");
    buf.push_str("if bits & (1 << f.int64()) != 0 {\n");
    buf.push_str("if !out.is_empty() {\nout.push('|');\n}\n");
    buf.push_str("out.push_str(&f.bit_index_string());\n");
    buf.push_str("}\n}\nout\n}\n\n");

    buf.push_str("/// Returns the label of a single bit index.\n");
    buf.push_str("pub fn bit_index_string(self) -> String {\n");
    buf.push_str(&super::core::scalar_string_body(t, part, &miss));
    buf.push_str("}\n\n");

    buf.push_str("/// Replaces the mask with the bits named in `s`.\n");
    buf.push_str("pub fn set_string(&mut self, s: &str) -> Result<(), String> {\n");
    buf.push_str("self.set_int64(0);\n");
    buf.push_str("self.set_string_or(s)\n");
    buf.push_str("}\n\n");

    buf.push_str("/// Sets the bits named in `s` on top of the existing mask.\n");
    buf.push_str("pub fn set_string_or(&mut self, s: &str) -> Result<(), String> {\n");
    buf.push_str("for part in s.split('|') {\n");
    buf.push_str("if part.is_empty() {\ncontinue;\n}\n");
    emit_flag_lookup(buf, ty, pkg, config);
    buf.push_str("}\nOk(())\n}\n\n");

    buf.push_str("pub fn int64(self) -> i64 {\n");
    match base {
        Some(_) => buf.push_str("self.0.int64()\n"),
        None => buf.push_str("self.0 as i64\n"),
    }
    buf.push_str("}\n\n");

    buf.push_str("pub fn set_int64(&mut self, v: i64) {\n");
    match base {
        Some(_) => buf.push_str("self.0.set_int64(v);\n"),
        None => {
            let _ = writeln!(buf, "self.0 = v as {};", ty.repr.as_str());
        }
    }
    buf.push_str("}\n\n");

    super::core::emit_shared_tail(buf, ty);
    buf.push_str("}\n\n");
}

/// Resolution of one `|`-separated segment inside `set_string_or`.
fn emit_flag_lookup(buf: &mut String, ty: &EnumType, pkg: &Package, config: &Config) {
    let t = &ty.name;
    let _ = writeln!(buf, "if let Some(f) = _{t}NameToValueMap.get(part) {{");
    buf.push_str("self.set_int64(self.int64() | (1 << f.int64()));\n");
    buf.push_str("continue;\n}\n");
    if config.accept_lower {
        let _ = writeln!(
            buf,
            "if let Some(f) = _{t}NameToValueMap.get(part.to_lowercase().as_str()) {{"
        );
        buf.push_str("self.set_int64(self.int64() | (1 << f.int64()));\n");
        buf.push_str("continue;\n}\n");
    }
    if let Some(base) = base_type(ty, pkg) {
        let _ = writeln!(buf, "let mut base = {};", zero_expr(base, pkg));
        buf.push_str("if base.set_string_or(part).is_ok() {\n");
        buf.push_str("self.set_int64(self.int64() | base.int64());\n");
        buf.push_str("continue;\n}\n");
    }
    let _ = writeln!(
        buf,
        "return Err(format!(\"{{}} does not belong to {t} values\", part));"
    );
}

//! Table and method emission for scalar enum types, plus the pieces
//! shared with bit-flag emission (label stores, the order-change
//! detector).

use super::{base_type, primitive_access, quoted};
use crate::config::Config;
use crate::partition::{Partition, Strategy};
use crate::value::{EnumType, Package, Value};
use std::fmt::Write as _;

/// Emits the per-type data stores: the value table, the strategy's label
/// store, the name lookup map, and the description map.
pub(super) fn emit_tables(buf: &mut String, ty: &EnumType, part: &Partition, config: &Config) {
    let t = &ty.name;

    let _ = writeln!(buf, "/// Number of enumerated {t} values.");
    let _ = writeln!(buf, "pub const {t}N: i64 = {};", ty.value_count());

    let idents: Vec<&str> = ty
        .enumerated_values()
        .map(|v| v.original_name.as_str())
        .collect();
    let _ = writeln!(
        buf,
        "static _{t}Values: [{t}; {}] = [{}];",
        idents.len(),
        idents.join(", ")
    );

    match part.strategy {
        Strategy::OneRun => {
            emit_run_store(buf, t, &part.values, None);
        }
        Strategy::MultiRun => {
            for (k, run) in part.runs.iter().enumerate() {
                let values = &part.values[run.start..run.end];
                if values.len() == 1 {
                    let _ = writeln!(
                        buf,
                        "static _{t}Name_{k}: &str = {};",
                        quoted(values[0].display())
                    );
                } else {
                    emit_run_store(buf, t, values, Some(k));
                }
            }
        }
        Strategy::Map => {
            let _ = writeln!(
                buf,
                "static _{t}Map: LazyLock<HashMap<i64, &'static str>> = LazyLock::new(|| {{"
            );
            buf.push_str("let mut map = HashMap::new();\n");
            for v in &part.values {
                let _ = writeln!(buf, "map.insert({}i64, {});", v.numeric, quoted(v.display()));
            }
            buf.push_str("map\n});\n");
        }
    }

    emit_name_to_value_map(buf, ty, config);
    emit_desc_map(buf, ty);
    buf.push('\n');
}

/// One run's label store: the concatenated label buffer and the byte
/// offset table slicing it.
fn emit_run_store(buf: &mut String, t: &str, values: &[Value], run_index: Option<usize>) {
    let suffix = run_index.map(|k| format!("_{k}")).unwrap_or_default();

    let mut labels = String::new();
    let mut offsets = vec![0usize];
    for v in values {
        labels.push_str(v.display());
        offsets.push(labels.len());
    }

    let _ = writeln!(buf, "static _{t}Name{suffix}: &str = {};", quoted(&labels));
    let entries = offsets
        .iter()
        .map(|o| o.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(
        buf,
        "static _{t}Index{suffix}: [usize; {}] = [{entries}];",
        offsets.len()
    );
}

fn emit_name_to_value_map(buf: &mut String, ty: &EnumType, config: &Config) {
    let t = &ty.name;
    let _ = writeln!(
        buf,
        "static _{t}NameToValueMap: LazyLock<HashMap<&'static str, {t}>> = LazyLock::new(|| {{"
    );
    buf.push_str("let mut map = HashMap::new();\n");
    for v in ty.enumerated_values() {
        let _ = writeln!(buf, "map.insert({}, {});", quoted(&v.label), v.original_name);
        if let Some(display) = &v.display_override
            && display != &v.label
        {
            let _ = writeln!(buf, "map.insert({}, {});", quoted(display), v.original_name);
        }
    }
    if config.accept_lower {
        // Lowercased aliases, inserted second so exact labels win.
        for v in ty.enumerated_values() {
            let lower = v.label.to_lowercase();
            if lower != v.label {
                let _ = writeln!(
                    buf,
                    "map.entry({}).or_insert({});",
                    quoted(&lower),
                    v.original_name
                );
            }
        }
    }
    buf.push_str("map\n});\n");
}

fn emit_desc_map(buf: &mut String, ty: &EnumType) {
    let t = &ty.name;
    let documented: Vec<&Value> = ty
        .enumerated_values()
        .filter(|v| !v.doc_string.is_empty())
        .collect();

    if documented.is_empty() {
        let _ = writeln!(
            buf,
            "static _{t}DescMap: LazyLock<HashMap<i64, &'static str>> = LazyLock::new(HashMap::new);"
        );
        return;
    }

    let _ = writeln!(
        buf,
        "static _{t}DescMap: LazyLock<HashMap<i64, &'static str>> = LazyLock::new(|| {{"
    );
    buf.push_str("let mut map = HashMap::new();\n");
    for v in documented {
        let _ = writeln!(
            buf,
            "map.entry({}i64).or_insert({});",
            v.numeric,
            quoted(&v.doc_string)
        );
    }
    buf.push_str("map\n});\n");
}

/// The strategy-specific body of the scalar label lookup. `miss` is the
/// expression evaluated when the value is outside the enumeration: the
/// decimal rendering for root types, delegation for extended ones.
pub(super) fn scalar_string_body(t: &str, part: &Partition, miss: &str) -> String {
    let mut body = String::new();
    match part.strategy {
        Strategy::OneRun => {
            let Some(run) = part.runs.first() else {
                return format!("{miss}\n");
            };
            body.push_str("let v = self.int64();\n");
            let _ = writeln!(body, "if v < {} || v > {} {{", run.lo, run.hi);
            let _ = writeln!(body, "return {miss};");
            body.push_str("}\n");
            let _ = writeln!(body, "let i = (v - {}) as usize;", run.lo);
            let _ = writeln!(body, "_{t}Name[_{t}Index[i].._{t}Index[i + 1]].to_string()");
        }
        Strategy::MultiRun => {
            body.push_str("let v = self.int64();\n");
            body.push_str("match v {\n");
            for (k, run) in part.runs.iter().enumerate() {
                if run.len() == 1 {
                    let _ = writeln!(body, "{} => _{t}Name_{k}.to_string(),", run.lo);
                } else {
                    let _ = writeln!(body, "{}..={} => {{", run.lo, run.hi);
                    let _ = writeln!(body, "let i = (v - {}) as usize;", run.lo);
                    let _ = writeln!(
                        body,
                        "_{t}Name_{k}[_{t}Index_{k}[i].._{t}Index_{k}[i + 1]].to_string()"
                    );
                    body.push_str("}\n");
                }
            }
            let _ = writeln!(body, "_ => {miss},");
            body.push_str("}\n");
        }
        Strategy::Map => {
            let _ = writeln!(body, "match _{t}Map.get(&self.int64()) {{");
            body.push_str("Some(name) => (*name).to_string(),\n");
            let _ = writeln!(body, "None => {miss},");
            body.push_str("}\n");
        }
    }
    body
}

/// The label lookup miss arm and the numeric accessors depend on whether
/// the type extends another enumeration.
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
        Some(_) => "self.0.string()".to_string(),
        None => "self.int64().to_string()".to_string(),
    };

    let _ = writeln!(buf, "impl {t} {{");

    buf.push_str("/// Returns the label for this value, or the decimal rendering\n");
    buf.push_str("/// when the value is not part of the enumeration.\n");
    buf.push_str("pub fn string(self) -> String {\n");
    buf.push_str(&scalar_string_body(t, part, &miss));
    buf.push_str("}\n\n");

    buf.push_str("/// Sets this value from a label. Fails with a message naming the\n");
    let _ = writeln!(buf, "/// type when no {t} value carries the label.");
    buf.push_str("pub fn set_string(&mut self, s: &str) -> Result<(), String> {\n");
    emit_scalar_lookup(buf, ty, pkg, config);
    buf.push_str("}\n\n");

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

    emit_shared_tail(buf, ty);
    buf.push_str("}\n\n");
}

/// Label resolution for `set_string`: exact lookup, optional lowercase
/// retry, optional delegation to the base type.
fn emit_scalar_lookup(buf: &mut String, ty: &EnumType, pkg: &Package, config: &Config) {
    let t = &ty.name;
    let _ = writeln!(buf, "if let Some(v) = _{t}NameToValueMap.get(s) {{");
    buf.push_str("*self = *v;\nreturn Ok(());\n}\n");
    if config.accept_lower {
        let _ = writeln!(
            buf,
            "if let Some(v) = _{t}NameToValueMap.get(s.to_lowercase().as_str()) {{"
        );
        buf.push_str("*self = *v;\nreturn Ok(());\n}\n");
    }
    if let Some(base) = base_type(ty, pkg) {
        let _ = writeln!(buf, "let mut base = {};", super::zero_expr(base, pkg));
        buf.push_str("if base.set_string(s).is_ok() {\n");
        let _ = writeln!(buf, "*self = {t}(base);");
        buf.push_str("return Ok(());\n}\n");
    }
    let _ = writeln!(
        buf,
        "Err(format!(\"{{}} does not belong to {t} values\", s))"
    );
}

/// `desc`, `values`, and `is_valid` are identical for scalar and
/// bit-flag types.
pub(super) fn emit_shared_tail(buf: &mut String, ty: &EnumType) {
    let t = &ty.name;

    buf.push_str("/// Returns the doc string registered for this value, falling back\n");
    buf.push_str("/// to its label.\n");
    buf.push_str("pub fn desc(self) -> String {\n");
    let _ = writeln!(buf, "if let Some(desc) = _{t}DescMap.get(&self.int64()) {{");
    buf.push_str("return (*desc).to_string();\n}\n");
    buf.push_str("self.string()\n}\n\n");

    let _ = writeln!(buf, "/// All enumerated {t} values, in declaration order.");
    let _ = writeln!(buf, "pub fn values() -> &'static [{t}] {{");
    let _ = writeln!(buf, "&_{t}Values");
    buf.push_str("}\n\n");

    buf.push_str("pub fn is_valid(self) -> bool {\n");
    buf.push_str("let v = self.int64();\n");
    let _ = writeln!(buf, "_{t}Values.iter().any(|candidate| candidate.int64() == v)");
    buf.push_str("}\n");
}

/// A constant block that fails compilation when a declared value's
/// numeric no longer matches the numbering the file was generated from.
pub(super) fn emit_order_detector(buf: &mut String, ty: &EnumType, pkg: &Package) {
    buf.push_str("/// Compile-time guard: regenerate this file when values are\n");
    buf.push_str("/// renumbered or reordered.\n");
    buf.push_str("const _: () = {\n");
    for v in ty.enumerated_values() {
        let access = primitive_access(ty, pkg, &v.original_name);
        let _ = writeln!(
            buf,
            "let _ = [(); 1][(({access}) as i64 - ({})) as usize];",
            v.numeric
        );
    }
    buf.push_str("};\n\n");
}

//! The value model: one recognised type and its declared constants.

use std::path::PathBuf;

/// Base primitive kind of a root enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repr {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
}

impl Repr {
    /// Parses a primitive integer type name.
    pub fn from_ident(ident: &str) -> Option<Repr> {
        Some(match ident {
            "i8" => Repr::I8,
            "i16" => Repr::I16,
            "i32" => Repr::I32,
            "i64" => Repr::I64,
            "isize" => Repr::Isize,
            "u8" => Repr::U8,
            "u16" => Repr::U16,
            "u32" => Repr::U32,
            "u64" => Repr::U64,
            "usize" => Repr::Usize,
            _ => return None,
        })
    }

    /// The Rust spelling of the primitive, as used in emitted casts.
    pub fn as_str(self) -> &'static str {
        match self {
            Repr::I8 => "i8",
            Repr::I16 => "i16",
            Repr::I32 => "i32",
            Repr::I64 => "i64",
            Repr::Isize => "isize",
            Repr::U8 => "u8",
            Repr::U16 => "u16",
            Repr::U32 => "u32",
            Repr::U64 => "u64",
            Repr::Usize => "usize",
        }
    }
}

/// One recognised constant of an enum type.
#[derive(Debug, Clone)]
pub struct Value {
    /// Name as declared in the source.
    pub original_name: String,
    /// Externally visible label, computed by the identifier shaper.
    pub label: String,
    /// Numeric value, widened to 64-bit signed throughout.
    pub numeric: i64,
    /// Doc comment attached to the constant, if any.
    pub doc_string: String,
    /// Trailing line comment, recorded only when `use_line_comment` is set.
    pub display_override: Option<String>,
    /// True for `const _` pseudo-values that mark group boundaries.
    pub is_signal_only: bool,
}

impl Value {
    /// The string stored in the emitted label buffers: the display override
    /// when present, the shaped label otherwise.
    pub fn display(&self) -> &str {
        self.display_override.as_deref().unwrap_or(&self.label)
    }
}

/// One recognised enum type and its declared values.
#[derive(Debug, Clone)]
pub struct EnumType {
    pub name: String,
    /// Base enum type this one extends, stored by identifier and resolved
    /// with a lookup step (never an owning reference).
    pub extends: Option<String>,
    pub is_bit_flag: bool,
    pub doc_string: String,
    pub source_file: PathBuf,
    /// Base primitive. For extended types this is the root ancestor's repr.
    pub repr: Repr,
    /// Values in declaration order, signals included.
    pub values: Vec<Value>,
}

impl EnumType {
    /// Declaration-ordered non-signal values.
    pub fn enumerated_values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().filter(|v| !v.is_signal_only)
    }

    pub fn value_count(&self) -> usize {
        self.enumerated_values().count()
    }
}

/// One scanned package: a directory of Rust source files.
#[derive(Debug, Clone)]
pub struct Package {
    /// Package name, the directory's file stem.
    pub name: String,
    pub dir: PathBuf,
    /// Types in directive occurrence order.
    pub types: Vec<EnumType>,
}

impl Package {
    pub fn find_type(&self, name: &str) -> Option<&EnumType> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Depth of the extension chain below `ty`, counting `ty` itself.
    /// A root type has depth 1.
    pub fn extension_depth(&self, ty: &EnumType) -> usize {
        let mut depth = 1;
        let mut current = ty;
        while let Some(base) = current
            .extends
            .as_deref()
            .and_then(|name| self.find_type(name))
        {
            depth += 1;
            current = base;
        }
        depth
    }
}

//! The identifier shaper: turns declared constant names into the
//! externally visible labels used by the emitted operations.
//!
//! Shaping is a pure function: trim the longest matching prefix, prepend
//! the configured prefix, then apply one transform from a closed set.
//! ASCII case only; no locale is involved.

use crate::config::Config;
use crate::error::{EnumgenError, Result};
use crate::value::EnumType;
use convert_case::{Case, Casing};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::trace;

/// The closed set of identifier transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Upper,
    Lower,
    Snake,
    SnakeUpper,
    Kebab,
    KebabUpper,
    Camel,
    CamelLower,
    Title,
    TitleLower,
    First,
    FirstUpper,
    FirstLower,
    Whitespace,
}

impl FromStr for Transform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "upper" => Transform::Upper,
            "lower" => Transform::Lower,
            "snake" => Transform::Snake,
            "snake-upper" => Transform::SnakeUpper,
            "kebab" => Transform::Kebab,
            "kebab-upper" => Transform::KebabUpper,
            "camel" => Transform::Camel,
            "camel-lower" => Transform::CamelLower,
            "title" => Transform::Title,
            "title-lower" => Transform::TitleLower,
            "first" => Transform::First,
            "first-upper" => Transform::FirstUpper,
            "first-lower" => Transform::FirstLower,
            "whitespace" => Transform::Whitespace,
            other => return Err(format!("unknown transform {other:?}")),
        })
    }
}

impl Transform {
    /// Applies this transform to an identifier.
    pub fn apply(self, ident: &str) -> String {
        match self {
            Transform::Upper => ident.to_case(Case::UpperFlat),
            Transform::Lower => ident.to_case(Case::Flat),
            Transform::Snake => ident.to_case(Case::Snake),
            Transform::SnakeUpper => ident.to_case(Case::UpperSnake),
            Transform::Kebab => ident.to_case(Case::Kebab),
            Transform::KebabUpper => ident.to_case(Case::UpperKebab),
            Transform::Camel => ident.to_case(Case::UpperCamel),
            Transform::CamelLower => ident.to_case(Case::Camel),
            Transform::Title => ident.to_case(Case::Title),
            Transform::TitleLower => ident.to_case(Case::Lower),
            Transform::First => first_char(ident, None),
            Transform::FirstUpper => first_char(ident, Some(true)),
            Transform::FirstLower => first_char(ident, Some(false)),
            Transform::Whitespace => segment(ident).join(" "),
        }
    }
}

fn first_char(ident: &str, upper: Option<bool>) -> String {
    match ident.chars().next() {
        Some(c) => match upper {
            None => c.to_string(),
            Some(true) => c.to_ascii_uppercase().to_string(),
            Some(false) => c.to_ascii_lowercase().to_string(),
        },
        None => String::new(),
    }
}

/// Splits an identifier into tokens at case and digit boundaries,
/// keeping acronym runs together ("HTTPServer" -> ["HTTP", "Server"]).
/// Underscores, hyphens, and spaces also separate tokens.
pub fn segment(ident: &str) -> Vec<String> {
    let chars: Vec<char> = ident.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }

        let boundary = if current.is_empty() {
            false
        } else {
            let prev = chars[i - 1];
            let upper_after_lower = c.is_ascii_uppercase() && prev.is_ascii_lowercase();
            // Last upper of an acronym run starts a new token when a
            // lowercase letter follows it: HTTPServer -> HTTP | Server.
            let acronym_end = c.is_ascii_uppercase()
                && prev.is_ascii_uppercase()
                && chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let digit_edge = c.is_ascii_digit() != prev.is_ascii_digit();
            upper_after_lower || acronym_end || digit_edge
        };

        if boundary {
            tokens.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Computes the label for one declared name under the configured rules.
pub fn shape_name(original: &str, config: &Config) -> String {
    let mut name = original;
    let mut trimmed_len = 0usize;
    for prefix in &config.trim_prefixes {
        if prefix.len() > trimmed_len && original.starts_with(prefix.as_str()) {
            trimmed_len = prefix.len();
        }
    }
    if trimmed_len > 0 {
        name = &original[trimmed_len..];
    }

    let mut label = match &config.add_prefix {
        Some(prefix) => format!("{prefix}{name}"),
        None => name.to_string(),
    };

    if let Some(transform) = config.transform {
        label = transform.apply(&label);
    }
    label
}

/// Shapes every non-signal value of `ty` and rejects duplicate labels.
pub fn shape_type(ty: &mut EnumType, config: &Config) -> Result<()> {
    let type_name = ty.name.clone();
    let mut seen: HashMap<String, String> = HashMap::new();

    for value in ty.values.iter_mut().filter(|v| !v.is_signal_only) {
        value.label = shape_name(&value.original_name, config);
        trace!(
            "Shaped {}::{} -> {:?}",
            type_name, value.original_name, value.label
        );

        if let Some(first) = seen.get(&value.label) {
            return Err(EnumgenError::LabelCollision {
                type_name,
                label: value.label.clone(),
                first: first.clone(),
                second: value.original_name.clone(),
            });
        }
        seen.insert(value.label.clone(), value.original_name.clone());
    }

    // Display overrides join the lookup map and collide like labels.
    for value in ty.values.iter().filter(|v| !v.is_signal_only) {
        let Some(display) = &value.display_override else {
            continue;
        };
        if display == &value.label {
            continue;
        }
        if let Some(first) = seen.get(display) {
            return Err(EnumgenError::LabelCollision {
                type_name,
                label: display.clone(),
                first: first.clone(),
                second: value.original_name.clone(),
            });
        }
        seen.insert(display.clone(), value.original_name.clone());
    }
    Ok(())
}

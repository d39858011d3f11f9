//! Normalizer
//!
//! Facet-specific semantic repair applied to output that has already passed
//! structural validation and the truncation check. Repairs are logged and
//! never surfaced as errors, and the whole pass is idempotent: running it on
//! already-normalized output changes nothing.
//!
//! Three layers, in order:
//! 1. whitespace trimming of every string leaf;
//! 2. enum coercion for fields the schema declares coercible: an
//!    out-of-vocabulary value is remapped to a declared one via case
//!    folding, then a synonym table, then a fixed priority order, instead
//!    of failing validation;
//! 3. the tone facet's sentiment/emotion consistency repair.

mod tone;

use serde_json::Value;
use tracing::warn;

use draft_lens_core::AnalysisFacet;

use crate::schema::{FacetSchema, FieldSpec, ValueKind};

/// Fixed remappings for severity- and register-style vocabulary the model
/// tends to invent.
const SYNONYMS: &[(&str, &str)] = &[
    // levels
    ("critical", "high"),
    ("severe", "high"),
    ("urgent", "high"),
    ("strong", "high"),
    ("extreme", "high"),
    ("elevated", "high"),
    ("moderate", "medium"),
    ("normal", "medium"),
    ("average", "medium"),
    ("mild", "low"),
    ("minor", "low"),
    ("slight", "low"),
    ("trivial", "low"),
    ("minimal", "low"),
    ("none", "low"),
    // registers
    ("professional", "formal"),
    ("business", "formal"),
    ("polite", "formal"),
    ("informal", "casual"),
    ("friendly", "casual"),
    ("relaxed", "casual"),
    ("conversational", "casual"),
    ("plain", "neutral"),
    ("standard", "neutral"),
    ("balanced", "neutral"),
];

/// Fallback order when neither case folding nor a synonym resolves a value.
/// The first entry present in the field's declared set wins.
const COERCION_PRIORITY: &[&str] = &["medium", "neutral", "high", "formal", "low", "casual"];

/// Normalize a validated value in place.
pub fn normalize(schema: &FacetSchema, value: &mut Value) {
    trim_string_leaves(value);
    coerce_fields(&schema.fields, value, "$");
    if schema.facet == AnalysisFacet::Tone {
        tone::repair(value);
    }
}

// ---------------------------------------------------------------------------
// Whitespace trimming
// ---------------------------------------------------------------------------

fn trim_string_leaves(value: &mut Value) {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.len() != s.len() {
                *s = trimmed.to_string();
            }
        }
        Value::Array(items) => {
            for item in items {
                trim_string_leaves(item);
            }
        }
        Value::Object(map) => {
            for (_, item) in map.iter_mut() {
                trim_string_leaves(item);
            }
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Enum coercion
// ---------------------------------------------------------------------------

fn coerce_fields(fields: &[FieldSpec], value: &mut Value, path: &str) {
    let Some(object) = value.as_object_mut() else {
        return;
    };

    for field in fields {
        let Some(field_value) = object.get_mut(field.name) else {
            continue;
        };
        let field_path = if path == "$" {
            field.name.to_string()
        } else {
            format!("{}.{}", path, field.name)
        };
        coerce_kind(&field.kind, field_value, &field_path);
    }
}

fn coerce_kind(kind: &ValueKind, value: &mut Value, path: &str) {
    match kind {
        ValueKind::Enum {
            allowed,
            coerce: true,
        } => {
            let Some(raw) = value.as_str() else {
                return;
            };
            if allowed.contains(&raw) {
                return;
            }
            let replacement = coerce_enum_value(raw, allowed);
            warn!(
                path = %path,
                from = %raw,
                to = %replacement,
                "normalizer: coerced out-of-vocabulary enum value"
            );
            *value = Value::String(replacement.to_string());
        }
        ValueKind::Array { items, .. } => {
            if let Some(array) = value.as_array_mut() {
                for (index, item) in array.iter_mut().enumerate() {
                    coerce_kind(items, item, &format!("{}[{}]", path, index));
                }
            }
        }
        ValueKind::Object { fields } => coerce_fields(fields, value, path),
        _ => {}
    }
}

/// Pick a declared value for an out-of-vocabulary one. Deterministic; the
/// result is always in `allowed`, which makes re-running the pass a no-op.
fn coerce_enum_value(raw: &str, allowed: &[&'static str]) -> &'static str {
    let folded = raw.trim().to_lowercase();

    if let Some(exact) = allowed.iter().copied().find(|a| *a == folded) {
        return exact;
    }

    if let Some((_, target)) = SYNONYMS.iter().find(|(from, _)| *from == folded) {
        if let Some(declared) = allowed.iter().copied().find(|a| a == target) {
            return declared;
        }
    }

    for candidate in COERCION_PRIORITY {
        if let Some(declared) = allowed.iter().copied().find(|a| a == candidate) {
            return declared;
        }
    }

    allowed[0]
}

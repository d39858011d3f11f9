//! Schema Registry
//!
//! Declares, per analysis facet, the expected output shape and derives two
//! artifacts from the same declaration:
//!
//! - a constrained-decoding grammar (a JSON Schema value handed to the model
//!   layer), which enforces declared keys, value types, and enumerated value
//!   sets at decode time;
//! - a structural validator run against the parsed value, which additionally
//!   enforces the semantic minimums the grammar deliberately omits (minimum
//!   string lengths, minimum array sizes, numeric ranges); constrained
//!   decoders do not express "at least one item" robustly.
//!
//! Enum fields may be declared coercible: the grammar still constrains them,
//! the validator only type-checks them, and the normalizer owns membership
//! repair. Strict enum fields fail validation on undeclared values.

pub mod facets;

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use draft_lens_core::{AnalysisFacet, SchemaViolationKind, ValidationFailure};

/// One declared field of a facet's output object.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: ValueKind,
    pub required: bool,
}

impl FieldSpec {
    pub fn required(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub fn optional(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// The kind of value a field may hold.
#[derive(Debug, Clone)]
pub enum ValueKind {
    /// A string with a minimum trimmed length (validator-enforced).
    String { min_len: usize },
    /// A number with an optional inclusive range (validator-enforced).
    Number { min: Option<f64>, max: Option<f64> },
    Boolean,
    /// A string drawn from a declared value set. `coerce` hands membership
    /// enforcement to the normalizer instead of the validator.
    Enum {
        allowed: &'static [&'static str],
        coerce: bool,
    },
    /// An array with a minimum item count (validator-enforced; default 1).
    Array { items: Box<ValueKind>, min_items: usize },
    /// A nested object with its own field declarations.
    Object { fields: Vec<FieldSpec> },
}

/// The declared output shape of one facet.
#[derive(Debug, Clone)]
pub struct FacetSchema {
    pub facet: AnalysisFacet,
    pub fields: Vec<FieldSpec>,
}

impl FacetSchema {
    /// Derive the constrained-decoding grammar for this facet.
    ///
    /// Only structural constraints appear here: declared keys
    /// (`additionalProperties: false`), per-field types, and enum value
    /// sets. Semantic minimums are left to [`FacetSchema::validate`].
    pub fn grammar(&self) -> Value {
        object_grammar(&self.fields)
    }

    /// Validate a parsed value against the full declaration, including the
    /// semantic minimums the grammar omits.
    ///
    /// Returns the first offender's kind and path, with every violation
    /// listed in the detail string.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationFailure> {
        let mut violations = Vec::new();
        check_object(&self.fields, value, "$", &mut violations);

        match violations.first() {
            None => Ok(()),
            Some(first) => Err(ValidationFailure::SchemaViolation {
                violation: first.kind,
                path: first.path.clone(),
                detail: violations
                    .iter()
                    .map(|v| v.message.clone())
                    .collect::<Vec<_>>()
                    .join("; "),
            }),
        }
    }
}

/// Registry of facet schemas.
///
/// Total over the closed facet set; every facet is registered at
/// construction, so a missing entry is a programmer error, not a runtime
/// condition.
pub struct SchemaRegistry {
    schemas: HashMap<AnalysisFacet, FacetSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        let mut schemas = HashMap::new();
        schemas.insert(AnalysisFacet::Intent, facets::intent_schema());
        schemas.insert(AnalysisFacet::Tone, facets::tone_schema());
        schemas.insert(AnalysisFacet::Impact, facets::impact_schema());
        schemas.insert(AnalysisFacet::Alternatives, facets::alternatives_schema());
        Self { schemas }
    }

    /// The full declaration for a facet.
    pub fn schema_for(&self, facet: AnalysisFacet) -> &FacetSchema {
        self.schemas
            .get(&facet)
            .expect("every facet is registered at construction")
    }

    /// The constrained-decoding grammar for a facet.
    pub fn grammar_for(&self, facet: AnalysisFacet) -> Value {
        self.schema_for(facet).grammar()
    }

    /// Validate a parsed value against a facet's declaration.
    pub fn validate(&self, facet: AnalysisFacet, value: &Value) -> Result<(), ValidationFailure> {
        self.schema_for(facet).validate(value)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Grammar derivation
// ---------------------------------------------------------------------------

fn object_grammar(fields: &[FieldSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in fields {
        properties.insert(field.name.to_string(), kind_grammar(&field.kind));
        if field.required {
            required.push(Value::String(field.name.to_string()));
        }
    }

    json!({
        "type": "object",
        "required": required,
        "properties": properties,
        "additionalProperties": false
    })
}

fn kind_grammar(kind: &ValueKind) -> Value {
    match kind {
        ValueKind::String { .. } => json!({"type": "string"}),
        ValueKind::Number { .. } => json!({"type": "number"}),
        ValueKind::Boolean => json!({"type": "boolean"}),
        ValueKind::Enum { allowed, .. } => json!({"type": "string", "enum": allowed}),
        ValueKind::Array { items, .. } => json!({"type": "array", "items": kind_grammar(items)}),
        ValueKind::Object { fields } => object_grammar(fields),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

struct Violation {
    kind: SchemaViolationKind,
    path: String,
    message: String,
}

fn check_object(fields: &[FieldSpec], value: &Value, path: &str, out: &mut Vec<Violation>) {
    let Some(object) = value.as_object() else {
        out.push(Violation {
            kind: SchemaViolationKind::TypeMismatch,
            path: path.to_string(),
            message: format!(
                "type mismatch at '{}': expected object, got {}",
                path,
                json_type_name(value)
            ),
        });
        return;
    };

    for field in fields {
        let field_path = join_path(path, field.name);
        match object.get(field.name) {
            None => {
                if field.required {
                    out.push(Violation {
                        kind: SchemaViolationKind::MissingField,
                        path: field_path.clone(),
                        message: format!("missing required field '{}'", field_path),
                    });
                }
            }
            Some(field_value) => check_kind(&field.kind, field_value, &field_path, out),
        }
    }
}

fn check_kind(kind: &ValueKind, value: &Value, path: &str, out: &mut Vec<Violation>) {
    match kind {
        ValueKind::String { min_len } => match value.as_str() {
            None => out.push(type_mismatch(path, "string", value)),
            Some(s) => {
                if s.trim().len() < *min_len {
                    out.push(Violation {
                        kind: SchemaViolationKind::TooShort,
                        path: path.to_string(),
                        message: format!(
                            "string too short at '{}': length {} < minimum {}",
                            path,
                            s.trim().len(),
                            min_len
                        ),
                    });
                }
            }
        },
        ValueKind::Number { min, max } => match value.as_f64() {
            None => out.push(type_mismatch(path, "number", value)),
            Some(n) => {
                let below = min.map(|m| n < m).unwrap_or(false);
                let above = max.map(|m| n > m).unwrap_or(false);
                if below || above {
                    out.push(Violation {
                        kind: SchemaViolationKind::OutOfRange,
                        path: path.to_string(),
                        message: format!("value out of range at '{}': {}", path, n),
                    });
                }
            }
        },
        ValueKind::Boolean => {
            if !value.is_boolean() {
                out.push(type_mismatch(path, "boolean", value));
            }
        }
        ValueKind::Enum { allowed, coerce } => match value.as_str() {
            None => out.push(type_mismatch(path, "string", value)),
            Some(s) => {
                // Coercible enums are the normalizer's to repair.
                if !coerce && !allowed.contains(&s) {
                    out.push(Violation {
                        kind: SchemaViolationKind::EnumMismatch,
                        path: path.to_string(),
                        message: format!(
                            "value '{}' at '{}' is not one of the allowed values [{}]",
                            s,
                            path,
                            allowed.join(", ")
                        ),
                    });
                }
            }
        },
        ValueKind::Array { items, min_items } => match value.as_array() {
            None => out.push(type_mismatch(path, "array", value)),
            Some(array) => {
                if array.len() < *min_items {
                    out.push(Violation {
                        kind: SchemaViolationKind::TooFew,
                        path: path.to_string(),
                        message: format!(
                            "array too small at '{}': {} items < minimum {}",
                            path,
                            array.len(),
                            min_items
                        ),
                    });
                }
                for (index, item) in array.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, index);
                    check_kind(items, item, &item_path, out);
                }
            }
        },
        ValueKind::Object { fields } => check_object(fields, value, path, out),
    }
}

fn type_mismatch(path: &str, expected: &str, value: &Value) -> Violation {
    Violation {
        kind: SchemaViolationKind::TypeMismatch,
        path: path.to_string(),
        message: format!(
            "type mismatch at '{}': expected {}, got {}",
            path,
            expected,
            json_type_name(value)
        ),
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent == "$" {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

/// Get the JSON Schema type name for a serde_json::Value.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

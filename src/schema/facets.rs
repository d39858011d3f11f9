//! Built-in facet schemas
//!
//! One declaration per analysis facet. The grammar, the validator, and the
//! normalizer's coercion pass are all derived from these.

use draft_lens_core::AnalysisFacet;

use super::{FacetSchema, FieldSpec, ValueKind};

/// Severity-style levels shared by the impact facet's fields.
pub const LEVELS: &[&str] = &["low", "medium", "high"];

/// Speech registers reported by the tone facet.
pub const REGISTERS: &[&str] = &["formal", "neutral", "casual"];

pub fn intent_schema() -> FacetSchema {
    FacetSchema {
        facet: AnalysisFacet::Intent,
        fields: vec![
            FieldSpec::required("primary", ValueKind::String { min_len: 1 }),
            FieldSpec::optional(
                "secondary",
                ValueKind::Array {
                    items: Box::new(ValueKind::String { min_len: 1 }),
                    min_items: 0,
                },
            ),
            FieldSpec::required(
                "confidence",
                ValueKind::Number {
                    min: Some(0.0),
                    max: Some(1.0),
                },
            ),
        ],
    }
}

pub fn tone_schema() -> FacetSchema {
    FacetSchema {
        facet: AnalysisFacet::Tone,
        fields: vec![
            FieldSpec::required(
                "overall_sentiment",
                ValueKind::Number {
                    min: Some(-1.0),
                    max: Some(1.0),
                },
            ),
            FieldSpec::required(
                "emotions",
                ValueKind::Array {
                    items: Box::new(ValueKind::Object {
                        fields: vec![
                            FieldSpec::required("label", ValueKind::String { min_len: 1 }),
                            FieldSpec::required(
                                "intensity",
                                ValueKind::Number {
                                    min: Some(0.0),
                                    max: Some(1.0),
                                },
                            ),
                        ],
                    }),
                    min_items: 1,
                },
            ),
            FieldSpec::required(
                "register",
                ValueKind::Enum {
                    allowed: REGISTERS,
                    coerce: true,
                },
            ),
        ],
    }
}

pub fn impact_schema() -> FacetSchema {
    let level = || ValueKind::Enum {
        allowed: LEVELS,
        coerce: true,
    };
    FacetSchema {
        facet: AnalysisFacet::Impact,
        fields: vec![
            FieldSpec::required("urgency", level()),
            FieldSpec::required("pressure", level()),
            FieldSpec::required("clarity", level()),
            FieldSpec::required("summary", ValueKind::String { min_len: 1 }),
        ],
    }
}

pub fn alternatives_schema() -> FacetSchema {
    FacetSchema {
        facet: AnalysisFacet::Alternatives,
        fields: vec![FieldSpec::required(
            "variants",
            ValueKind::Array {
                items: Box::new(ValueKind::Object {
                    fields: vec![
                        FieldSpec::required("text", ValueKind::String { min_len: 1 }),
                        FieldSpec::required(
                            "tags",
                            ValueKind::Array {
                                items: Box::new(ValueKind::String { min_len: 1 }),
                                min_items: 1,
                            },
                        ),
                    ],
                }),
                min_items: 1,
            },
        )],
    }
}

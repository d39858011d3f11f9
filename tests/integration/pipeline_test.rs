//! Full-pipeline scenarios
//!
//! Drives `AnalysisEngine::analyze_batch` end to end against scripted
//! providers: clean resolution, corrective retry, enum coercion, the
//! attempt cap, and all-or-nothing batch failure.

use std::sync::Arc;

use draft_lens::{
    prompts, AnalysisEngine, AnalysisFacet, EngineConfig, FacetError, Level, ParsedResult,
    ValidationFailure,
};

use crate::mock_provider::{
    all_valid, ScriptedProvider, VALID_ALTERNATIVES, VALID_IMPACT, VALID_INTENT, VALID_TONE,
};

fn engine(provider: Arc<ScriptedProvider>) -> AnalysisEngine {
    AnalysisEngine::with_provider(EngineConfig::default(), provider)
}

// ============================================================================
// Clean batch
// ============================================================================

#[tokio::test]
async fn test_clean_message_resolves_all_four_facets_on_attempt_one() {
    let provider = Arc::new(all_valid());
    let batch = engine(provider.clone())
        .analyze_batch("Can you send the document?", None)
        .await
        .unwrap();

    assert!(batch.is_complete());
    assert_eq!(batch.len(), 4);
    assert_eq!(provider.call_count(), 4);

    for facet in AnalysisFacet::ALL {
        let outcome = batch.get(facet).unwrap();
        assert_eq!(outcome.attempts, 1, "{} should resolve on attempt 1", facet);
    }

    match &batch.get(AnalysisFacet::Intent).unwrap().result {
        ParsedResult::Intent(intent) => {
            assert_eq!(intent.primary, "request the document");
            assert!((intent.confidence - 0.86).abs() < f64::EPSILON);
        }
        other => panic!("Expected Intent payload, got {:?}", other),
    }

    match &batch.get(AnalysisFacet::Alternatives).unwrap().result {
        ParsedResult::Alternatives(set) => assert_eq!(set.variants.len(), 2),
        other => panic!("Expected Alternatives payload, got {:?}", other),
    }
}

#[tokio::test]
async fn test_analysis_proceeds_without_context() {
    let provider = Arc::new(all_valid());
    engine(provider.clone())
        .analyze_batch("Can you send the document?", None)
        .await
        .unwrap();

    for call in provider.calls_for(AnalysisFacet::Tone) {
        assert!(!call.user_message.contains("Earlier turns"));
        assert!(call.user_message.contains("Can you send the document?"));
    }
}

#[tokio::test]
async fn test_context_blob_passes_through_opaquely() {
    let provider = Arc::new(all_valid());
    engine(provider.clone())
        .analyze_batch(
            "Can you send the document?",
            Some("Alice: I asked about this last week."),
        )
        .await
        .unwrap();

    assert_eq!(provider.call_count(), 4);
    for facet in AnalysisFacet::ALL {
        let calls = provider.calls_for(facet);
        assert_eq!(calls.len(), 1);
        assert!(
            calls[0]
                .user_message
                .contains("Alice: I asked about this last week."),
            "{} call should carry the context blob",
            facet
        );
    }
}

// ============================================================================
// Corrective retry
// ============================================================================

#[tokio::test]
async fn test_empty_primary_triggers_corrective_retry() {
    let empty_primary = r#"{"primary": "", "secondary": [], "confidence": 0.8}"#;
    let provider = Arc::new(ScriptedProvider::new(&[
        (AnalysisFacet::Intent, &[empty_primary, VALID_INTENT]),
        (AnalysisFacet::Tone, &[VALID_TONE]),
        (AnalysisFacet::Impact, &[VALID_IMPACT]),
        (AnalysisFacet::Alternatives, &[VALID_ALTERNATIVES]),
    ]));

    let batch = engine(provider.clone())
        .analyze_batch("Can you finally send the document today?", None)
        .await
        .unwrap();

    assert!(batch.is_complete());
    assert_eq!(batch.get(AnalysisFacet::Intent).unwrap().attempts, 2);
    assert_eq!(provider.call_count(), 5);

    let intent_calls = provider.calls_for(AnalysisFacet::Intent);
    assert_eq!(intent_calls.len(), 2);

    let base = prompts::system_prompt(AnalysisFacet::Intent);
    assert_eq!(intent_calls[0].system_prompt, base);
    // The retry prompt is the base prompt plus a note specific to the
    // min-length failure, not a generic "try again".
    assert!(intent_calls[1].system_prompt.starts_with(base));
    assert!(intent_calls[1].system_prompt.contains("empty"));
    assert!(intent_calls[1].system_prompt.contains("'primary'"));
}

#[tokio::test]
async fn test_truncation_failure_gets_finish_sentences_note() {
    let truncated_tone = r#"{"overall_sentiment": -0.3, "emotions": [{"label": "frustratio[", "intensity": 0.7}], "register": "neutral"}"#;
    let provider = Arc::new(ScriptedProvider::new(&[
        (AnalysisFacet::Intent, &[VALID_INTENT]),
        (AnalysisFacet::Tone, &[truncated_tone, VALID_TONE]),
        (AnalysisFacet::Impact, &[VALID_IMPACT]),
        (AnalysisFacet::Alternatives, &[VALID_ALTERNATIVES]),
    ]));

    let batch = engine(provider.clone())
        .analyze_batch("Where is the document you promised?", None)
        .await
        .unwrap();

    assert_eq!(batch.get(AnalysisFacet::Tone).unwrap().attempts, 2);
    let tone_calls = provider.calls_for(AnalysisFacet::Tone);
    assert!(tone_calls[1].system_prompt.contains("close every bracket"));
    assert!(tone_calls[1]
        .system_prompt
        .contains("emotions[0].label"));
}

#[tokio::test]
async fn test_enum_invention_coerced_not_retried() {
    let invented_impact = r#"{"urgency": "critical", "pressure": "moderate", "clarity": "high", "summary": "Reads as a sharp escalation."}"#;
    let provider = Arc::new(ScriptedProvider::new(&[
        (AnalysisFacet::Intent, &[VALID_INTENT]),
        (AnalysisFacet::Tone, &[VALID_TONE]),
        (AnalysisFacet::Impact, &[invented_impact]),
        (AnalysisFacet::Alternatives, &[VALID_ALTERNATIVES]),
    ]));

    let batch = engine(provider.clone())
        .analyze_batch("Send it now.", None)
        .await
        .unwrap();

    // Coercion is a silent repair: no retry, outcome valid.
    let outcome = batch.get(AnalysisFacet::Impact).unwrap();
    assert_eq!(outcome.attempts, 1);
    match &outcome.result {
        ParsedResult::Impact(impact) => {
            assert_eq!(impact.urgency, Level::High);
            assert_eq!(impact.pressure, Level::Medium);
        }
        other => panic!("Expected Impact payload, got {:?}", other),
    }
}

// ============================================================================
// Exhaustion and batch failure
// ============================================================================

#[tokio::test]
async fn test_double_failure_fails_batch_without_partial_results() {
    let provider = Arc::new(ScriptedProvider::new(&[
        (AnalysisFacet::Intent, &[VALID_INTENT]),
        (AnalysisFacet::Tone, &[VALID_TONE]),
        (
            AnalysisFacet::Impact,
            &[
                r#"{"urgency": "high"}"#,
                "no json here",
            ],
        ),
        (AnalysisFacet::Alternatives, &[VALID_ALTERNATIVES]),
    ]));

    let err = engine(provider.clone())
        .analyze_batch("Can you send the document?", None)
        .await
        .unwrap_err();

    // The other three facets ran to completion; their results are simply
    // not part of any response.
    assert_eq!(provider.call_count(), 5);
    assert_eq!(err.failed_facets(), vec![AnalysisFacet::Impact]);

    match &err.failures[0] {
        FacetError::Exhausted { facet, failures } => {
            assert_eq!(*facet, AnalysisFacet::Impact);
            assert_eq!(failures.len(), 2);
            assert!(matches!(
                failures[0],
                ValidationFailure::SchemaViolation { .. }
            ));
            assert!(matches!(failures[1], ValidationFailure::Unparseable { .. }));
        }
        other => panic!("Expected Exhausted, got {:?}", other),
    }

    // The batch error's display names the facet and both reasons.
    let text = err.to_string();
    assert!(text.contains("impact"));
    assert!(text.contains("attempt 1"));
    assert!(text.contains("attempt 2"));
}

#[tokio::test]
async fn test_attempt_cap_holds_under_repeated_failure() {
    let provider = Arc::new(ScriptedProvider::new(&[
        (AnalysisFacet::Intent, &["bad", "bad", "bad", "bad", "bad"]),
        (AnalysisFacet::Tone, &[VALID_TONE]),
        (AnalysisFacet::Impact, &[VALID_IMPACT]),
        (AnalysisFacet::Alternatives, &[VALID_ALTERNATIVES]),
    ]));

    let err = engine(provider.clone())
        .analyze_batch("Can you send the document?", None)
        .await
        .unwrap_err();

    assert_eq!(err.failed_facets(), vec![AnalysisFacet::Intent]);
    // Two attempts, never more, no matter how much script remains.
    assert_eq!(provider.calls_for(AnalysisFacet::Intent).len(), 2);
}

#[tokio::test]
async fn test_session_id_is_correlation_only() {
    let provider_a = Arc::new(all_valid());
    let provider_b = Arc::new(all_valid());

    let batch_a = engine(provider_a)
        .analyze_batch_for_session("Can you send the document?", None, "session-1")
        .await
        .unwrap();
    let batch_b = engine(provider_b)
        .analyze_batch_for_session("Can you send the document?", None, "session-2")
        .await
        .unwrap();

    // Identical inputs with different session ids produce identical results.
    for facet in AnalysisFacet::ALL {
        assert_eq!(
            batch_a.get(facet).unwrap().result,
            batch_b.get(facet).unwrap().result
        );
    }
}

//! Integration Tests Module
//!
//! End-to-end tests for the Draft Lens engine: the full pipeline runs
//! against scripted providers, covering clean batch assembly, the
//! corrective-retry path, the attempt cap, and all-or-nothing failure
//! reporting.

// Scripted provider shared by the pipeline tests
mod mock_provider;

// Full-batch pipeline scenarios
mod pipeline_test;

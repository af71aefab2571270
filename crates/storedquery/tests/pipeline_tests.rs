//! GetFolderAndContents pipeline integration tests.
//!
//! These tests drive the full guard, validate, parse and execute sequence
//! with a recording execution step so the step's call count can be checked.

mod common;

use std::sync::Arc;

use helios_storedquery::codes::CodedValue;
use helios_storedquery::error::{BackendError, InternalError, StoredQueryError, ViolatedRule};
use helios_storedquery::metadata::{self, param};
use helios_storedquery::variants::ObjectRef;
use helios_storedquery::{Combinator, ParameterBag};

use common::{FOLDER_UUID, RecordingStep, folder_pipeline};

// ============================================================================
// Successful Runs
// ============================================================================

#[tokio::test]
async fn test_folder_uuid_only_defaults_to_stable_documents() {
    let step = Arc::new(RecordingStep::new());
    let pipeline = folder_pipeline(Arc::clone(&step));
    let mut bag = ParameterBag::new().with(param::FOLDER_ENTRY_UUID, [FOLDER_UUID]);

    pipeline.run(&mut bag).await.unwrap();

    assert!(!bag.has_errors());
    assert_eq!(step.call_count(), 1);
    let params = step.last_call().unwrap();
    assert_eq!(params.folder, ObjectRef::EntryUuid(FOLDER_UUID.to_string()));
    assert_eq!(params.object_types, vec![metadata::DOCUMENT_ENTRY_STABLE]);
    assert!(params.format_codes.is_none());
    assert!(params.confidentiality_codes.is_none());
}

#[tokio::test]
async fn test_explicit_document_types_replace_default() {
    let step = Arc::new(RecordingStep::new());
    let pipeline = folder_pipeline(Arc::clone(&step));
    let mut bag = ParameterBag::new()
        .with(param::FOLDER_UNIQUE_ID, ["1.2.3"])
        .with(
            param::DOCUMENT_ENTRY_TYPE,
            [metadata::DOCUMENT_ENTRY_STABLE, metadata::DOCUMENT_ENTRY_ON_DEMAND],
        );

    pipeline.run(&mut bag).await.unwrap();

    let params = step.last_call().unwrap();
    assert_eq!(params.folder, ObjectRef::UniqueId("1.2.3".to_string()));
    assert_eq!(params.object_types.len(), 2);
}

#[tokio::test]
async fn test_or_allowed_on_confidentiality_code() {
    let step = Arc::new(RecordingStep::new());
    let pipeline = folder_pipeline(Arc::clone(&step));
    let mut bag = ParameterBag::new()
        .with(param::FOLDER_UNIQUE_ID, ["1.2.3"])
        .with_or(param::DOCUMENT_ENTRY_CONFIDENTIALITY_CODE, ["R", "N"]);

    pipeline.run(&mut bag).await.unwrap();

    let filter = step.last_call().unwrap().confidentiality_codes.unwrap();
    assert_eq!(filter.combinator, Combinator::Or);
    assert_eq!(
        filter.codes,
        vec![CodedValue::unqualified("R"), CodedValue::unqualified("N")]
    );
}

#[tokio::test]
async fn test_both_folder_identifiers_accepted() {
    let step = Arc::new(RecordingStep::new());
    let pipeline = folder_pipeline(Arc::clone(&step));
    let mut bag = ParameterBag::new()
        .with(param::FOLDER_ENTRY_UUID, [FOLDER_UUID])
        .with(param::FOLDER_UNIQUE_ID, ["1.2.3"]);

    pipeline.run(&mut bag).await.unwrap();

    assert_eq!(
        step.last_call().unwrap().folder,
        ObjectRef::EntryUuid(FOLDER_UUID.to_string())
    );
}

// ============================================================================
// Guard Failures
// ============================================================================

#[tokio::test]
async fn test_missing_folder_identity_is_internal_error() {
    let step = Arc::new(RecordingStep::new());
    let pipeline = folder_pipeline(Arc::clone(&step));
    let mut bag =
        ParameterBag::new().with(param::DOCUMENT_ENTRY_FORMAT_CODE, ["urn:ihe:pcc:xphr:2007"]);

    let err = pipeline.run(&mut bag).await.unwrap_err();

    match err {
        StoredQueryError::Internal(InternalError::UnresolvableIdentity { query, parameters }) => {
            assert_eq!(query, "GetFolderAndContents");
            assert!(parameters.iter().any(|p| p == param::FOLDER_ENTRY_UUID));
            assert!(parameters.iter().any(|p| p == param::FOLDER_UNIQUE_ID));
        }
        other => panic!("Expected identity failure, got {:?}", other),
    }
    assert_eq!(step.call_count(), 0);
}

#[tokio::test]
async fn test_folder_identity_with_no_values_is_internal_error() {
    let step = Arc::new(RecordingStep::new());
    let pipeline = folder_pipeline(Arc::clone(&step));
    let mut bag = ParameterBag::new().with(param::FOLDER_ENTRY_UUID, Vec::<String>::new());

    let err = pipeline.run(&mut bag).await.unwrap_err();

    assert!(matches!(err, StoredQueryError::Internal(_)));
    assert!(!err.is_caller_error());
    assert_eq!(step.call_count(), 0);
}

// ============================================================================
// Validation Failures
// ============================================================================

#[tokio::test]
async fn test_or_on_format_code_rejected() {
    let step = Arc::new(RecordingStep::new());
    let pipeline = folder_pipeline(Arc::clone(&step));
    let mut bag = ParameterBag::new()
        .with(param::FOLDER_UNIQUE_ID, ["1.2.3"])
        .with_or(param::DOCUMENT_ENTRY_FORMAT_CODE, ["a^^^s", "b^^^s"]);

    let err = pipeline.run(&mut bag).await.unwrap_err();

    let violations = err.violations().unwrap();
    assert_eq!(violations.len(), 1);
    let violation = violations.iter().next().unwrap();
    assert_eq!(violation.parameter, param::DOCUMENT_ENTRY_FORMAT_CODE);
    assert_eq!(violation.rule, ViolatedRule::Combinator);
    assert!(bag.has_errors());
    assert_eq!(step.call_count(), 0);
}

#[tokio::test]
async fn test_single_valued_parameter_with_two_values() {
    let step = Arc::new(RecordingStep::new());
    let pipeline = folder_pipeline(Arc::clone(&step));
    let mut bag =
        ParameterBag::new().with(param::FOLDER_ENTRY_UUID, ["urn:uuid:1", "urn:uuid:2"]);

    let err = pipeline.run(&mut bag).await.unwrap_err();

    assert!(err.is_caller_error());
    assert_eq!(err.error_code(), "XDSStoredQueryParamNumber");
    let violations = err.violations().unwrap();
    assert!(violations.contains_rule(ViolatedRule::Cardinality));
    assert_eq!(
        violations.for_parameter(param::FOLDER_ENTRY_UUID).count(),
        1
    );
    assert_eq!(step.call_count(), 0);
}

#[tokio::test]
async fn test_validation_reports_every_violation() {
    let step = Arc::new(RecordingStep::new());
    let pipeline = folder_pipeline(Arc::clone(&step));
    let mut bag = ParameterBag::new()
        .with(param::FOLDER_UNIQUE_ID, ["1.2.3", "1.2.4"])
        .with_or(param::DOCUMENT_ENTRY_FORMAT_CODE, ["a^^^s", "b^^^s"])
        .with(param::DOCUMENT_ENTRY_CONFIDENTIALITY_CODE, ["^^^broken"]);

    let err = pipeline.run(&mut bag).await.unwrap_err();

    let violations = err.violations().unwrap();
    assert!(violations.len() >= 3);
    assert!(violations.contains_rule(ViolatedRule::Cardinality));
    assert!(violations.contains_rule(ViolatedRule::Combinator));
    assert!(violations.contains_rule(ViolatedRule::CodedValue));
    assert_eq!(bag.errors(), violations);
    assert_eq!(step.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_coded_value_rejected() {
    let step = Arc::new(RecordingStep::new());
    let pipeline = folder_pipeline(Arc::clone(&step));
    let mut bag = ParameterBag::new()
        .with(param::FOLDER_ENTRY_UUID, [FOLDER_UUID])
        .with(param::DOCUMENT_ENTRY_FORMAT_CODE, ["pdf^^^"]);

    let err = pipeline.run(&mut bag).await.unwrap_err();

    assert!(err.violations().unwrap().contains_rule(ViolatedRule::CodedValue));
    assert_eq!(step.call_count(), 0);
}

// ============================================================================
// Execution Failures
// ============================================================================

#[tokio::test]
async fn test_backend_error_propagated_unchanged() {
    let step = Arc::new(RecordingStep::failing("registry table locked"));
    let pipeline = folder_pipeline(Arc::clone(&step));
    let mut bag = ParameterBag::new().with(param::FOLDER_ENTRY_UUID, [FOLDER_UUID]);

    let err = pipeline.run(&mut bag).await.unwrap_err();

    match err {
        StoredQueryError::Backend(BackendError::QueryError { message }) => {
            assert_eq!(message, "registry table locked");
        }
        other => panic!("Expected backend error, got {:?}", other),
    }
    assert!(!bag.has_errors());
    assert_eq!(step.call_count(), 1);
}

#[tokio::test]
async fn test_pipeline_is_reusable_across_requests() {
    let step = Arc::new(RecordingStep::new());
    let pipeline = folder_pipeline(Arc::clone(&step));

    let mut bad = ParameterBag::new().with(param::FOLDER_ENTRY_UUID, ["urn:uuid:1", "urn:uuid:2"]);
    assert!(pipeline.run(&mut bad).await.is_err());

    let mut good = ParameterBag::new().with(param::FOLDER_ENTRY_UUID, [FOLDER_UUID]);
    assert!(pipeline.run(&mut good).await.is_ok());
    assert!(!good.has_errors());
    assert_eq!(step.call_count(), 1);
}

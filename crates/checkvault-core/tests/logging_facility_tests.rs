#![allow(clippy::unwrap_used, clippy::expect_used)]

use checkvault_core::errors::{ExError, ExErrorKind};
use checkvault_core::logging_facility::test_capture::init_test_capture;
use checkvault_core::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use checkvault_core::{log_op_end, log_op_error, log_op_start};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, tick_id = "tick-1");

    let starts: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_START))
        .collect();

    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].field("tick_id"), Some("tick-1"));
    assert!(starts[0]
        .component
        .as_deref()
        .unwrap()
        .contains("logging_facility_tests"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42, deleted = 2usize);

    let ends: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();

    assert_eq!(ends.len(), 1);
    assert_eq!(ends[0].field("duration_ms"), Some("42"));
    assert_eq!(ends[0].field("deleted"), Some("2"));
}

#[test]
fn test_log_op_error_includes_kind_and_message() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = ExError::new(ExErrorKind::StoreUnreachable)
        .with_op("store_connect")
        .with_message("unable to open database file");
    log_op_error!(op_name, err, duration_ms = 10);

    let errors: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field("err.code"), Some("ERR_STORE_UNREACHABLE"));
    assert_eq!(errors[0].field("err.kind"), Some("StoreUnreachable"));
    assert!(errors[0]
        .field("err.message")
        .unwrap()
        .contains("unable to open database file"));
}

#[test]
fn test_boundary_pair_single_start_end() {
    let capture = init_test_capture();
    let op_name = "test_boundary_pair_unique_4";

    log_op_start!(op_name);
    log_op_end!(op_name, duration_ms = 1);

    capture.assert_event_exists(op_name, EVENT_START);
    capture.assert_event_exists(op_name, EVENT_END);
    assert_eq!(
        capture.count_events(|e| e.op.as_deref() == Some(op_name)),
        2
    );
}

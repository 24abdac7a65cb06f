//! Canonical logging macros
//!
//! Every boundary event carries `component`, `op`, and `event`; a tick is
//! followed through the log by operation name and `tick_id`.

#[doc(hidden)]
#[macro_export]
macro_rules! __op_event {
    ($level:ident, $event:expr, $op:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $event,
            $($($field)*)?
        );
    };
}

/// Log the start of an operation
///
/// ```
/// # use checkvault_core::log_op_start;
/// log_op_start!("backup_tick");
/// log_op_start!("backup_tick", tick_id = "0190");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__op_event!(info, $crate::schema::EVENT_START, $op $(, $($field)*)?)
    };
}

/// Log the successful end of an operation; `duration_ms` is mandatory
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__op_event!(
            info,
            $crate::schema::EVENT_END,
            $op,
            duration_ms = $duration
            $(, $($field)*)?
        )
    };
}

/// Log a failed operation
///
/// Anything convertible into `ExError` is accepted; kind, code, and the
/// rendered message land on the event.
///
/// ```
/// # use checkvault_core::log_op_error;
/// # use checkvault_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::StoreUnreachable).with_message("no such file");
/// log_op_error!("snapshot_export", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__op_event!(
            error,
            $crate::schema::EVENT_END_ERROR,
            $op,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.message = %ex_err
            $(, $($field)*)?
        )
    }};
}

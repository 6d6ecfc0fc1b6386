//! Structured logging helpers.
//!
//! Every event carries a `subsystem` field so that session, transport and
//! timer output can be filtered apart:
//! - `subsystem`: component identifier (`web3`, `timer`, `transport`)
//! - `message`: log message
//! - additional context fields

/// Helper to create structured log entries with consistent formatting.
#[macro_export]
macro_rules! log_event {
    // Info level with subsystem
    (info, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    // Warn level with subsystem
    (warn, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    // Error level with subsystem
    (error, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    // Debug level with subsystem
    (debug, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a state transition with `from`/`to` fields.
#[macro_export]
macro_rules! log_transition {
    ($subsystem:expr, $from:expr, $to:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            subsystem = $subsystem,
            from = %$from,
            to = %$to,
            $($($field)*,)?
            "state transition"
        )
    };
}

//! Tracing spans and structured log helpers for elements.

use crate::flow::FlowStatus;
use tracing::{Level, Span, span};

/// Create a span for element lifecycle and data-flow calls.
///
/// # Example
///
/// ```rust
/// use debughttp::observability::element_span;
///
/// let span = element_span("src0", "DebugHttpSrc");
/// let _guard = span.enter();
/// // Element work is recorded inside the span.
/// ```
#[inline]
pub fn element_span(element: &str, element_type: &str) -> Span {
    span!(
        Level::DEBUG,
        "element",
        element = %element,
        element_type = %element_type
    )
}

/// Enter an element span, returning the guard.
pub fn instrument_element(element: &str, element_type: &str) -> tracing::span::EnteredSpan {
    element_span(element, element_type).entered()
}

/// Log a completed fill.
#[inline]
pub fn trace_fill(element: &str, offset: u64, requested: usize, filled: usize, flow: FlowStatus) {
    tracing::trace!(
        element = %element,
        offset = offset,
        requested = requested,
        filled = filled,
        flow = %flow,
        "fill"
    );
}

/// Log a lifecycle state change.
#[inline]
pub fn trace_state_change(element: &str, from: &str, to: &str) {
    tracing::debug!(
        element = %element,
        from = %from,
        to = %to,
        "state changed"
    );
}

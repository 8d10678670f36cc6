//! Base trait for intents in MVI architecture.

/// Marker trait for intent objects.
///
/// Intents represent:
/// - Fetch lifecycle events (started, page loaded, failed)
/// - Local edits (prepend a freshly created entity, drop a deleted one)
///
/// Intents are processed by reducers to produce new states.
pub trait Intent: Send + 'static {}

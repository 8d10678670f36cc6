//! Base trait for cache state in MVI architecture.

/// Marker trait for state objects views render from.
///
/// States should be:
/// - Immutable (Clone to create new states)
/// - Self-contained (all data needed to render the view)
/// - Comparable (PartialEq for detecting changes)
pub trait ViewState: Clone + PartialEq + Default + Send + 'static {}

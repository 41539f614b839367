//! Schema capability consumed by the cursors.
//!
//! The engine never builds or mutates schemas itself: it only asks a
//! [`StreamerInfoContext`] for the entry of a class, to resolve checksummed
//! versions, and reads narrow-float parameters off a [`StreamerElement`].

use std::sync::Arc;

use crate::RBytesError;

/// Describes one member of a streamed class.
pub trait StreamerElement {
    fn name(&self) -> &str;

    /// Linear rescaling factor for narrow floats; `0` when unset.
    fn factor(&self) -> f64;

    /// Lower bound of the rescaling range.
    ///
    /// When [`factor`](Self::factor) is zero this carries the number of
    /// mantissa bits of a truncated narrow float instead.
    fn xmin(&self) -> f64;

    /// Upper bound of the rescaling range.
    fn xmax(&self) -> f64;
}

/// Describes the on-disk layout of one version of a class.
pub trait StreamerInfo: Send + Sync {
    fn name(&self) -> &str;
    fn class_version(&self) -> i32;
    fn checksum(&self) -> u32;
    fn elements(&self) -> Vec<&dyn StreamerElement>;
}

/// Looks up schema entries by class name and version.
///
/// Implementations are shared between buffers decoding concurrently and must
/// allow simultaneous reads.
pub trait StreamerInfoContext: Send + Sync {
    /// Returns the named schema entry. A negative `version` asks for the latest.
    fn streamer_info(&self, name: &str, version: i32) -> Result<Arc<dyn StreamerInfo>, RBytesError>;
}

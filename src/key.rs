//! The fixed key and expiration representation shared by every layer.

/// A cached key. 32-bit, unsigned; [`SENTINEL`] is reserved to mark an empty
/// slot and must never be inserted by a caller.
pub type Key = u32;

/// Seconds since an implementation-defined monotonic epoch.
pub type Expiration = u32;

/// Reserved "empty slot" marker. Small pages fill unused slots with this
/// value and treat it as absent during scans, sorts and serialization.
pub const SENTINEL: Key = u32::MAX;

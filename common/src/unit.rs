//! Marker types.

/// Marker type describing an entity registration.
#[derive(Clone, Copy, Debug)]
pub struct Registration;

/// Marker type describing an entity expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

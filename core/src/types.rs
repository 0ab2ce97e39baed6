//! Shared primitive types used across the engine.

/// Globally unique account identifier. Doubles as a routable address:
/// external accounts encode the bank code as a suffix ("12345-MBBANK").
pub type AccountId = String;

/// Unique identifier of one ledger entry.
pub type TransactionId = String;

/// Owner (customer) identifier. Supplied by the identity collaborator,
/// opaque to the engine.
pub type OwnerId = String;

/// Milliseconds since the Unix epoch.
pub type TimestampMs = i64;

pub mod fingerprint;
pub mod snapshot;

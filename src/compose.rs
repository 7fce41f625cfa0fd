/// Layer plan and synchronous render sequence.
pub mod engine;
/// Per-pass outcome: drawn layers and defects.
pub mod report;

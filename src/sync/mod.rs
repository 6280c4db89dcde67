pub mod ledger;
pub mod merge;
pub mod normalizer;
pub mod pipeline;

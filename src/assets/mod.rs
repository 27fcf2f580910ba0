//! Sample assets
//!
//! Base recordings grouped by preset, loaded once per process.

mod store;

pub use store::{AssetMetadata, SampleAsset, SampleStore, MAX_SELECTED};

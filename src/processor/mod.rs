pub mod classifier;
pub mod reconciler;
pub mod report;

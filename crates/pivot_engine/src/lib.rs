pub mod dataset;
pub mod pivot;
pub mod summary;

pub use dataset::Dataset;
pub use pivot::pivot;
pub use summary::summarize;

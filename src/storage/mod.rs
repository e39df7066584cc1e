pub mod dataset;

pub use dataset::{DataStore, ItemFilter, SearchHit};

mod flat_file_index;

pub use flat_file_index::{FlatFileIndex, FlatFileIndexStore};

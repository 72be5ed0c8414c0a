mod storage_reset;

pub use storage_reset::reset_storage;

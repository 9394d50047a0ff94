pub mod blob_store;
pub mod generative;
pub mod hosted_blob;
pub mod memory_blob;
pub mod result_sink;

//! Local storage for pageviews2parquet
//!
//! This crate owns every filesystem side effect of a run: the streamed
//! scratch download and the final partition file. Writes go through OpenDAL
//! filesystem operators and are staged under a temporary name, then renamed.

mod error;
mod storage;
mod write;

pub use error::{ErrorCode, Result, WriterError};
pub use storage::Storage;
pub use write::{remove_scratch, write_partition, ScratchFile, ScratchWriter, WriteResult};

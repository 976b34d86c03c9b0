//! Infrastructure layer - database storage and image files

pub mod files;
pub mod storage;

pub use files::FsImageStore;

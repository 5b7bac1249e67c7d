//! 内容存储适配器

mod fs_content_store;

pub use fs_content_store::FsContentStore;

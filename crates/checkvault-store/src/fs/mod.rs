//! Backup directory primitives

pub mod atomic;
pub mod directory;

pub use atomic::write_new;
pub use directory::{
    count_artifacts, ensure_backup_dir, list_artifacts, list_backups, BackupListing,
    FileRemover, FsMetadata, FsRemover, MetadataSource,
};

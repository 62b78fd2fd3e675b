//! Shared infrastructure utilities for MKS OS.
//!
//! - **`atomic_write`**: Crash-safe file persistence (temp + rename), used by the config
//!   store and by the Notepad "Save as" action.

pub mod atomic_write;

pub use atomic_write::{
    AtomicWriteOptions, FileSyncPolicy, ParentDirSyncPolicy, atomic_write,
    atomic_write_with_options, recover_bak_file,
};

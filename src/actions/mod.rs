//! File actions module.
//!
//! Both actions consume classified records; neither re-hashes nor
//! re-classifies. Both stop at the first failure and do not roll back.
//!
//! # Deletion
//!
//! ```no_run
//! use dirdedupe::actions::delete_duplicates;
//! use dirdedupe::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let (records, _) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("in"))
//!     .unwrap();
//! let report = delete_duplicates(&records, None).unwrap();
//! println!("{}", report.summary());
//! ```
//!
//! # Copy
//!
//! ```no_run
//! use dirdedupe::actions::copy_unique;
//! use dirdedupe::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let source = Path::new("in");
//! let (records, _) = DuplicateFinder::with_defaults().find_duplicates(source).unwrap();
//! let report = copy_unique(source, Path::new("out"), &records, None).unwrap();
//! println!("{}", report.summary());
//! ```

pub mod copy;
pub mod delete;

pub use copy::{
    copy_bytes, copy_unique, ensure_dir, free_destination, relative_destination, CopyError,
    CopyReport,
};
pub use delete::{delete_duplicates, deletion_candidates, remove_file, DeleteError, DeleteReport};

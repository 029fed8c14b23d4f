//! Output formatters for scan results.
//!
//! - [`text`]: one line per file, then a summary line
//! - [`json`]: a single document for scripting
//!
//! # Example
//!
//! ```no_run
//! use dirdedupe::duplicates::DuplicateFinder;
//! use dirdedupe::output::{json::JsonOutput, text::write_text};
//! use std::path::Path;
//!
//! let (records, summary) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//!
//! write_text(&mut std::io::stdout(), &records, &summary).unwrap();
//! println!("{}", JsonOutput::new(&records, &summary).to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::{JsonOutput, JsonOutputError};
pub use text::{format_record, format_summary, write_text};

//! Output writers for finished summaries.
//!
//! # Output Structure
//!
//! ```text
//! reports_directory/
//! ├── news_summary_2025-05-06.txt
//! └── news_summary_2025-05-07.txt
//! ```
//!
//! One report per day; a second run on the same day replaces the first.

pub mod report;

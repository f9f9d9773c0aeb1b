//! Output generation for the files each run leaves behind.
//!
//! # Submodules
//!
//! - [`report`]: Writes the per-article report and the combined-summary report
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── news_report.txt             # One block per article
//! ├── final_summary.txt           # Header + combined summary
//! └── combined_summary_audio.mp3  # Narrated summary (see `speech`)
//! ```

pub mod report;

pub const NEWS_REPORT_FILE: &str = "news_report.txt";
pub const FINAL_SUMMARY_FILE: &str = "final_summary.txt";
pub const AUDIO_FILE: &str = "combined_summary_audio.mp3";

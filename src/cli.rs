//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Global options can also be provided via environment variables.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # One run, results printed to the terminal
/// awful_company_news analyze "Tata Motors"
///
/// # Web form on http://127.0.0.1:8501
/// awful_company_news serve
///
/// # Write outputs elsewhere and narrate in Tamil
/// awful_company_news -o ./out --target-lang ta analyze Infosys
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory for news_report.txt, final_summary.txt and the audio file
    #[arg(short, long, env = "NEWS_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Optional path to the LLM config.yaml file
    #[arg(short, long, env = "NEWS_LLM_CONFIG")]
    pub config: Option<String>,

    /// Name of the summarization chat template
    #[arg(long, default_value = "news_summarizer")]
    pub template: String,

    /// Language code the summary is translated to and narrated in
    #[arg(long, default_value = "hi")]
    pub target_lang: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze news for one company and print the result
    Analyze {
        /// Company name to search for
        company_name: String,
    },
    /// Serve the interactive web form
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8501")]
        bind: SocketAddr,
    },
}

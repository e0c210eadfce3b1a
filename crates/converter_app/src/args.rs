use std::path::PathBuf;

use clap::Parser;
use converter_core::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "converter", version, about, long_about = None)]
pub struct Args {
    /// Video links to convert as one batch.
    ///
    /// Without links, or with `--interactive`, the form is filled in from
    /// line commands on stdin instead.
    pub links: Vec<String>,

    /// Output format requested from the conversion service.
    #[arg(short, long, value_name = "mp3|mp4")]
    pub format: Option<OutputFormat>,

    /// Base URL of the conversion service. `/download` is appended.
    #[arg(short, long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Directory that receives `download.zip`.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// RON configuration file. Defaults to `converter.ron` when present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Keep typed links when the number of links changes.
    #[arg(long, default_value_t = false)]
    pub preserve_links: bool,

    /// Drive the form from stdin even when links are given.
    #[arg(short, long, default_value_t = false)]
    pub interactive: bool,

    /// Log to stderr instead of the log file.
    #[arg(long, default_value_t = false)]
    pub log_stderr: bool,

    /// Enable debug logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Submit the given links once and exit.
    Batch,
    Interactive,
}

impl Args {
    pub fn mode(&self) -> Mode {
        if self.interactive || self.links.is_empty() {
            Mode::Interactive
        } else {
            Mode::Batch
        }
    }
}

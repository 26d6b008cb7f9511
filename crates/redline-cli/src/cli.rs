use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use redline_core::{MatchSource, RedactMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "redline")]
#[command(about = "Scan and redact documents through a redaction service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Base URL of the redaction API
    #[arg(long, env = "API_BASE", global = true)]
    pub api_base: Option<String>,

    /// HWPX viewer page to hand redacted .hwpx files to
    #[arg(long, env = "HWPX_VIEWER_URL", global = true)]
    pub viewer_url: Option<String>,

    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log more (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the server's rule names
    Rules {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List the server's preset patterns
    Patterns {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Check that the server is up
    Health,

    /// Scan a document and optionally save the redacted copy
    Scan(ScanArgs),

    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct ScanArgs {
    /// Document to scan (.pdf, .docx, .xlsx, .pptx, .hwpx, .doc, .hwp, .ppt)
    pub file: PathBuf,

    /// Rule names to match, comma separated (default: config, else all)
    #[arg(long, value_delimiter = ',')]
    pub rules: Vec<String>,

    /// Where matches come from: auto, text or file
    #[arg(long)]
    pub source: Option<MatchSource>,

    /// Entity labels shown in the NER table, comma separated
    #[arg(long, value_delimiter = ',')]
    pub labels: Vec<String>,

    /// Show every match unmasked, grouped by rule
    #[arg(long)]
    pub raw: bool,

    /// Show valid and invalid matches as separate chip lists
    #[arg(long)]
    pub chips: bool,

    /// Skip entity recognition
    #[arg(long)]
    pub no_ner: bool,

    /// Stop after the preview
    #[arg(long, conflicts_with = "save")]
    pub no_redact: bool,

    /// PDF box selection: strict, auto_all or auto_merge
    #[arg(long)]
    pub mode: Option<RedactMode>,

    /// PDF box fill colour
    #[arg(long)]
    pub fill: Option<String>,

    /// Write the redacted file to disk
    #[arg(long)]
    pub save: bool,

    /// Output directory for --save
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Overwrite an existing output file
    #[arg(long)]
    pub force: bool,

    /// Open saved .hwpx files in the configured viewer
    #[arg(long, requires = "save")]
    pub open_viewer: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Plain output without colours
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

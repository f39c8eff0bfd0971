//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// M3U Intake - recover IPTV account details from a playlist URL.
#[derive(Parser, Debug)]
#[command(name = "m3ui")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    // === Global flags ===
    /// Output format
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log level
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Emit JSONL logs to stderr
    #[arg(long, global = true)]
    pub json_output: bool,

    /// Verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the effective output format.
    #[must_use]
    pub const fn effective_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }

    /// Transport overrides carried by the selected subcommand, if any.
    #[must_use]
    pub const fn transport_args(&self) -> Option<&TransportArgs> {
        match &self.command {
            Commands::Extract(args) => Some(&args.transport),
            Commands::Proxies(args) => Some(&args.transport),
            Commands::Inspect(_) => None,
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Query the provider behind each playlist URL and print the account profile
    Extract(ExtractArgs),

    /// Show the credentials and API endpoint parsed from a playlist URL (no network)
    Inspect(InspectArgs),

    /// List the fetch strategies in the order they are tried
    Proxies(ProxiesArgs),
}

/// Arguments for the `extract` command.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Playlist URL(s), e.g. `http://host:8080/get.php?username=U&password=P`
    #[arg(value_name = "URL", required = true)]
    pub urls: Vec<String>,

    #[command(flatten)]
    pub transport: TransportArgs,
}

/// Arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Playlist URL
    #[arg(value_name = "URL")]
    pub url: String,

    /// Print the password instead of a mask
    #[arg(long)]
    pub show_password: bool,
}

/// Arguments for the `proxies` command.
#[derive(Args, Debug, Default)]
pub struct ProxiesArgs {
    #[command(flatten)]
    pub transport: TransportArgs,
}

/// Fetch-plan overrides shared by `extract` and `proxies`.
#[derive(Args, Debug, Default, Clone)]
pub struct TransportArgs {
    /// Per-attempt timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// When to request the provider directly (https-only, always, never)
    #[arg(long, value_name = "POLICY")]
    pub direct: Option<String>,

    /// Relay to try, in order; replaces the configured list (repeatable)
    #[arg(long = "proxy", value_name = "NAME=TEMPLATE")]
    pub proxies: Vec<String>,

    /// Skip the bouquet (live category) lookup
    #[arg(long)]
    pub no_bouquets: bool,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output
    Json,
    /// Markdown output
    Md,
}

impl OutputFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Json => "json",
            Self::Md => "md",
        }
    }
}

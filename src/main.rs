//! WordPress Analyzer CLI - fingerprint a WordPress site

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::process::ExitCode;
use std::time::Duration;

use wordpress_analyzer::{
    Analyzer, AnalyzerConfig, OutputFormat,
    config::{
        DEFAULT_ANALYSIS_TIMEOUT_SECS, DEFAULT_MAX_RETRIES, DEFAULT_PROBE_TIMEOUT_SECS,
        DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    },
    output_site_info,
};

/// Exit code when the scan-level timeout expired
const EXIT_TIMEOUT: u8 = 2;

/// WordPress site analyzer - detects version, theme, plugins and security posture
#[derive(Parser, Debug)]
#[command(name = "wordpress-analyzer")]
#[command(version, about, long_about = None)]
struct Args {
    /// URL or domain of the site to analyze
    url: String,

    /// Enable speculative, network-verified plugin detection
    #[arg(long = "deep-scan")]
    deep_scan: bool,

    /// Output format
    #[arg(short = 'o', long = "output", default_value = "human", value_enum)]
    output_format: OutputFormatArg,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "WP_ANALYZER_REQUEST_TIMEOUT",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS
    )]
    request_timeout: u64,

    /// Whole-analysis timeout in seconds
    #[arg(long, env = "WP_ANALYZER_ANALYSIS_TIMEOUT", default_value_t = DEFAULT_ANALYSIS_TIMEOUT_SECS)]
    analysis_timeout: u64,

    /// Timeout in seconds for plugin verification and readme probes
    #[arg(long, env = "WP_ANALYZER_PROBE_TIMEOUT", default_value_t = DEFAULT_PROBE_TIMEOUT_SECS)]
    probe_timeout: u64,

    /// Homepage fetch retries on connection errors
    #[arg(long, env = "WP_ANALYZER_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    /// User-Agent header sent with every request
    #[arg(long, env = "WP_ANALYZER_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Skip WordPress version detection
    #[arg(long, env = "WP_ANALYZER_NO_VERSION")]
    no_version: bool,

    /// Skip theme detection
    #[arg(long, env = "WP_ANALYZER_NO_THEME")]
    no_theme: bool,

    /// Skip plugin detection
    #[arg(long, env = "WP_ANALYZER_NO_PLUGINS")]
    no_plugins: bool,

    /// Allow scanning private/internal IP addresses (localhost, 192.168.x.x, etc.)
    #[arg(long = "allow-private", env = "WP_ANALYZER_ALLOW_PRIVATE")]
    allow_private: bool,

    /// Log level (overrides RUST_LOG)
    #[arg(long, env = "WP_ANALYZER_LOG_LEVEL", default_value = "warn", value_enum)]
    log_level: LogLevelArg,
}

impl Args {
    fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            request_timeout: Duration::from_secs(self.request_timeout),
            analysis_timeout: Duration::from_secs(self.analysis_timeout),
            probe_timeout: Duration::from_secs(self.probe_timeout),
            max_retries: self.max_retries,
            user_agent: self.user_agent.clone(),
            detect_version: !self.no_version,
            detect_theme: !self.no_theme,
            detect_plugins: !self.no_plugins,
            allow_private: self.allow_private,
        }
    }
}

/// Output format argument
#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormatArg {
    Human,
    Json,
    None,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::None => OutputFormat::None,
        }
    }
}

/// Log level argument
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LevelFilter::Error,
            LogLevelArg::Warn => LevelFilter::Warn,
            LogLevelArg::Info => LevelFilter::Info,
            LogLevelArg::Debug => LevelFilter::Debug,
            LogLevelArg::Trace => LevelFilter::Trace,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.log_level.into());

    // Print banner for human output
    if matches!(args.output_format, OutputFormatArg::Human) {
        print_banner();
    }

    match run_analysis(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_timeout() => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_TIMEOUT)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_analysis(args: &Args) -> wordpress_analyzer::Result<()> {
    let analyzer = Analyzer::new(args.analyzer_config());
    let site = analyzer.analyze(&args.url, args.deep_scan).await?;

    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    output_site_info(&site, args.output_format.into(), &mut writer)?;

    Ok(())
}

/// Logger reading `RUST_LOG`, with the CLI level taking precedence for this crate
fn init_logger(level: LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .filter_module("html5ever", LevelFilter::Error)
        .filter_module("selectors", LevelFilter::Warn)
        .filter_module("hyper", LevelFilter::Info)
        .filter_module("reqwest", LevelFilter::Info)
        .filter_module("wordpress_analyzer", level)
        .format_timestamp_millis()
        .init();
}

fn print_banner() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    println!("WordPress Analyzer v{}", VERSION);
    println!("by Robert F. Ecker <robert@robdotec.com>");
    println!();
}

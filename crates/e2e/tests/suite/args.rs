//! Command line of the suite binary

#![allow(dead_code)]

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "blazedemo-e2e")]
#[command(about = "End-to-end purchase suite for BlazeDemo")]
pub struct Args {
    /// Home page of the site under test
    #[arg(long, env = "BLAZEDEMO_BASE_URL", default_value = "https://blazedemo.com/")]
    pub base_url: String,

    /// WebDriver endpoint to connect to (ignored with --driver-binary)
    #[arg(long, env = "BLAZEDEMO_WEBDRIVER_URL", default_value = "http://localhost:9515")]
    pub webdriver_url: String,

    /// Spawn this chromedriver/geckodriver instead of using --webdriver-url
    #[arg(long, env = "BLAZEDEMO_DRIVER_BINARY")]
    pub driver_binary: Option<PathBuf>,

    /// Browser to use (chrome, firefox)
    #[arg(long, env = "BLAZEDEMO_BROWSER", default_value = "chrome")]
    pub browser: String,

    /// Show the browser window
    #[arg(long, env = "BLAZEDEMO_HEADED")]
    pub headed: bool,

    /// Upper bound for each element wait
    #[arg(long, env = "BLAZEDEMO_WAIT_TIMEOUT_MS", default_value = "10000")]
    pub wait_timeout_ms: u64,

    /// Delay between element polls
    #[arg(long, env = "BLAZEDEMO_POLL_INTERVAL_MS", default_value = "250")]
    pub poll_interval_ms: u64,

    #[arg(long, default_value = "1280")]
    pub window_width: u32,

    #[arg(long, default_value = "720")]
    pub window_height: u32,

    /// Directory of YAML scenarios to register alongside the builtins
    #[arg(short, long, env = "BLAZEDEMO_SCENARIOS", default_value = "tests/scenarios")]
    pub scenarios: PathBuf,

    /// Run only scenarios with this tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Run only the scenario with this name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Booked prices must be strictly above this
    #[arg(long, env = "BLAZEDEMO_MIN_PRICE", default_value = "0")]
    pub min_price: f64,

    /// Output directory for the log, report, and screenshots
    #[arg(short, long, env = "BLAZEDEMO_OUTPUT", default_value = "test-results")]
    pub output: PathBuf,

    /// List registered scenarios and exit
    #[arg(long)]
    pub list: bool,

    /// Actually drive a browser; without it the suite is skipped
    #[arg(long, env = "BLAZEDEMO_LIVE")]
    pub live: bool,

    /// Test-name filters cargo forwards to every test target
    #[arg(hide = true)]
    pub filters: Vec<String>,
}

impl Args {
    /// Parse the process arguments, dropping what libtest would have consumed
    pub fn from_env() -> Self {
        Self::parse_from(without_libtest_flags(std::env::args()))
    }
}

/// Libtest switches that stand alone
const LIBTEST_SWITCHES: [&str; 13] = [
    "--nocapture",
    "--no-capture",
    "--quiet",
    "-q",
    "--show-output",
    "--ignored",
    "--include-ignored",
    "--exact",
    "--test",
    "--bench",
    "--force-run-in-process",
    "--report-time",
    "--shuffle",
];

/// Libtest options that take a value, as `--opt v` or `--opt=v`
const LIBTEST_OPTIONS: [&str; 7] = [
    "--test-threads",
    "--skip",
    "--format",
    "--color",
    "--logfile",
    "--shuffle-seed",
    "-Z",
];

/// `cargo test -- ...` hands libtest flags to every test target, including
/// this `harness = false` one. Strip them so clap only sees suite options.
pub fn without_libtest_flags<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut kept = Vec::new();
    let mut args = args.into_iter().map(Into::into);

    while let Some(arg) = args.next() {
        if LIBTEST_SWITCHES.contains(&arg.as_str()) {
            continue;
        }
        if LIBTEST_OPTIONS.contains(&arg.as_str()) {
            args.next();
            continue;
        }
        let is_joined_option = LIBTEST_OPTIONS
            .iter()
            .any(|opt| arg.starts_with(&format!("{}=", opt)) || (*opt == "-Z" && arg.starts_with("-Z")));
        if is_joined_option {
            continue;
        }
        kept.push(arg);
    }

    kept
}

mod summary;

use clap::Parser;
use pk_behaviors::PageConfig;
use pk_behaviors::PageScript;
use pk_behaviors::RecordingDialogs;
use pk_core::PageError;
use pk_core::PageResult;
use pk_html::HtmlParser;
use pk_html::decode_page_bytes;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info";
const MAX_PAGE_BYTES: u64 = 8 * 1024 * 1024;

/// Loads a portal page, runs its behaviors on a virtual clock and prints
/// the resulting state.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// HTML page to load.
    page: PathBuf,

    /// TOML file overriding selectors, delays and messages.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// How long to run the page clock after interactions.
    #[arg(long, value_name = "N", default_value_t = 0)]
    run_for_ms: u64,

    /// Click the element with this id. May be repeated.
    #[arg(long = "click", value_name = "ID")]
    clicks: Vec<String>,

    /// Text to type into the captcha input before submitting.
    #[arg(long, value_name = "TEXT")]
    captcha_input: Option<String>,

    /// Submit the form (or a control inside it) with this id.
    #[arg(long, value_name = "ID")]
    submit: Option<String>,

    /// Sleep in real time between timer deadlines.
    #[arg(long)]
    realtime: bool,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!(code = error.code, "{}", error.message);
            eprintln!("pagekit: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> PageResult<summary::PageSummary> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => PageConfig::default(),
    };
    let input_id = config.captcha.input_id.clone();
    let document = HtmlParser.parse(&read_page(&args.page)?);
    tracing::info!(page = %args.page.display(), title = %document.title, "page loaded");

    let mut page = PageScript::new(document, config, RecordingDialogs::default())?;
    page.on_content_loaded()?;

    for id in &args.clicks {
        let outcome = page.click_by_id(id)?;
        tracing::debug!(id, handled = outcome.handled, "click dispatched");
    }

    if let Some(text) = &args.captcha_input {
        page.type_into(&input_id, text)?;
    }

    let mut submitted = None;
    if let Some(id) = &args.submit {
        let outcome = page.submit_by_id(id)?;
        submitted = Some(!outcome.default_prevented);
    }

    let duration = Duration::from_millis(args.run_for_ms);
    if args.realtime {
        run_realtime(&mut page, duration);
    } else {
        page.advance_time(duration);
    }

    Ok(summary::PageSummary::capture(&page, submitted))
}

/// Advances the clock one deadline at a time, sleeping for the gap so the
/// log reads like a live page.
fn run_realtime(page: &mut PageScript<RecordingDialogs>, duration: Duration) {
    let end = page.now().saturating_add(duration);
    while let Some(deadline) = page.next_timer_deadline().filter(|due| *due <= end) {
        let gap = deadline.saturating_sub(page.now());
        thread::sleep(gap);
        page.advance_time(gap);
    }
    let rest = end.saturating_sub(page.now());
    thread::sleep(rest);
    page.advance_time(rest);
}

fn read_page(path: &Path) -> PageResult<String> {
    let bytes = std::fs::read(path).map_err(|error| {
        PageError::new("page.io", format!("cannot read {}: {error}", path.display()))
    })?;
    if bytes.len() as u64 > MAX_PAGE_BYTES {
        return Err(PageError::new(
            "page.io",
            format!("{} is larger than {MAX_PAGE_BYTES} bytes", path.display()),
        ));
    }
    Ok(decode_page_bytes(&bytes))
}

fn load_config(path: &Path) -> PageResult<PageConfig> {
    let text = std::fs::read_to_string(path).map_err(|error| {
        PageError::new("page.io", format!("cannot read {}: {error}", path.display()))
    })?;
    toml::from_str(&text)
        .map_err(|error| PageError::new("config.parse", format!("{}: {error}", path.display())))
}

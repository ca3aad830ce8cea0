use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use storefront_e2e::config::{self, ENV_BROWSER, ENV_HEADLESS, ENV_REPORT_DIR, ENV_WEBDRIVER_URL};
use storefront_e2e::driver::{
    BrowserFactory, BrowserKind, LaunchOptions, MemoryBrowser, MemoryElement, MemoryFactory,
    WebDriverFactory, webdriver::DEFAULT_WEBDRIVER_URL,
};
use storefront_e2e::report::{cleanup_old_artifacts, list_artifacts};
use storefront_e2e::{FailureCapture, Locator, SessionRegistry, WaitConfig};

/// Storefront E2E - browser page check and report maintenance
#[derive(Parser, Debug)]
#[command(
    name = "storefront-e2e",
    about = "Browser end-to-end suite tooling: page check and failure artifact maintenance",
    after_help = "ENVIRONMENT VARIABLES:\n\
        STOREFRONT_E2E_BROWSER                firefox | chrome\n\
        STOREFRONT_E2E_HEADLESS               true | false\n\
        STOREFRONT_E2E_WAIT_TIMEOUT_SECONDS   Explicit wait budget\n\
        STOREFRONT_E2E_WAIT_POLL_MILLIS       Explicit wait poll interval\n\
        STOREFRONT_E2E_REPORT_DIR             Report root\n\
        STOREFRONT_E2E_WEBDRIVER_URL          WebDriver endpoint\n\
        RUST_LOG                              Log filter"
)]
struct Args {
    /// Report root holding screenshots and report files
    #[arg(long, global = true, env = ENV_REPORT_DIR, default_value = config::DEFAULT_REPORT_DIR)]
    report_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a session, load a page, capture a labelled screenshot and quit
    Check {
        /// Page to load
        #[arg(short, long)]
        url: String,

        /// Browser engine: firefox or chrome
        #[arg(short, long, env = ENV_BROWSER, default_value = "firefox")]
        browser: BrowserKind,

        /// Run without a visible window
        #[arg(long, env = ENV_HEADLESS)]
        headless: bool,

        /// WebDriver endpoint
        #[arg(long, env = ENV_WEBDRIVER_URL, default_value = DEFAULT_WEBDRIVER_URL)]
        webdriver_url: String,

        /// Use the in-memory browser instead of WebDriver
        #[arg(long)]
        memory: bool,

        /// Screenshot label
        #[arg(short, long, default_value = "page_check")]
        label: String,

        /// Print the artifact as JSON
        #[arg(long)]
        json: bool,
    },

    /// List screenshots in the report root
    Artifacts,

    /// Delete screenshots older than the given age
    Clean {
        /// Maximum age in hours
        #[arg(long, default_value = "24")]
        max_age_hours: u64,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Check {
            url,
            browser,
            headless,
            webdriver_url,
            memory,
            label,
            json,
        } => {
            let factory: Arc<dyn BrowserFactory> = if memory {
                Arc::new(memory_factory(&url))
            } else {
                Arc::new(WebDriverFactory::new(webdriver_url))
            };
            let wait = WaitConfig::from_settings(&config::get().wait);
            let mut registry = SessionRegistry::new(factory, wait, &args.report_dir);
            let options = LaunchOptions::new(browser, headless);

            let capture = FailureCapture::new(&args.report_dir);
            let result = registry.init_session(&options, capture).and_then(|session| {
                session.navigate(&url)?;
                session.wait_for_page_load()?;
                Ok(session.capture_failure(&label, Some(&format!("page check of {}", url))))
            });
            registry.end_session();

            let artifact = result??;
            if json {
                println!("{}", serde_json::to_string_pretty(&artifact)?);
            } else {
                println!("Captured {}: {}", url, artifact.path.display());
                if !artifact.persisted {
                    eprintln!("Warning: screenshot was taken but could not be written");
                }
            }
        }

        Commands::Artifacts => {
            let artifacts = list_artifacts(&args.report_dir)?;
            if artifacts.is_empty() {
                println!("No screenshots in {}", args.report_dir.display());
            } else {
                println!("Screenshots in {}:", args.report_dir.display());
                for path in artifacts {
                    println!("  {}", path.display());
                }
            }
        }

        Commands::Clean { max_age_hours } => {
            let max_age = Duration::from_secs(max_age_hours * 3600);
            let removed = cleanup_old_artifacts(&args.report_dir, max_age)?;
            println!("Removed {} screenshot(s) older than {}h", removed, max_age_hours);
        }
    }

    Ok(())
}

/// One-page in-memory site for `check --memory`
fn memory_factory(url: &str) -> MemoryFactory {
    let url = url.to_string();
    MemoryFactory::new(move || {
        let text = format!("In-memory page at {}", url);
        MemoryBrowser::builder()
            .route(url.clone(), move |dom| {
                dom.add(MemoryElement::new(Locator::tag_name("h1")).text(text.clone()));
            })
            .build()
    })
}

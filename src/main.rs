use clap::{ArgGroup, Parser};
use contact_scraper::{
    Denylists, HttpFetcher, ScrapeConfig, ScrapeMode, Scraper, DEFAULT_WORKERS,
};
use std::path::PathBuf;
use tokio::{
    fs::{File, OpenOptions},
    io::{BufReader, BufWriter},
    time::Duration,
};
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "contact-scraper", version, about = "Scrape phone numbers or links from a list of URLs")]
#[command(group(ArgGroup::new("mode").required(true).multiple(true).args(["phone_numbers", "urls"])))]
struct Cli {
    /// Input file to read URLs from, one per line
    #[arg(long = "in", value_name = "INPUT_FILE")]
    input: PathBuf,

    /// Output file to append scraped data to
    #[arg(long = "out", value_name = "OUTPUT_FILE")]
    output: PathBuf,

    /// Number of concurrent workers
    #[arg(short = 't', long = "threads", default_value_t = DEFAULT_WORKERS)]
    threads: usize,

    /// Log every dispatched URL and every failure
    #[arg(short, long)]
    verbose: bool,

    /// Scrape links
    #[arg(long)]
    urls: bool,

    /// Scrape phone numbers
    #[arg(long)]
    phone_numbers: bool,

    /// Seconds each worker waits between requests
    #[arg(long, value_name = "SECS", default_value_t = 3)]
    delay: u64,

    /// JSON file with extra denylist entries: {"phone": [...], "url": [...]}
    #[arg(long, value_name = "FILE")]
    denylist: Option<PathBuf>,
}

impl Cli {
    fn mode(&self) -> ScrapeMode {
        if self.phone_numbers {
            ScrapeMode::PhoneNumbers
        } else {
            ScrapeMode::Urls
        }
    }

    fn scrape_config(&self) -> ScrapeConfig {
        ScrapeConfig {
            workers: self.threads,
            request_delay: Duration::from_secs(self.delay),
            ..ScrapeConfig::new(self.mode())
        }
    }
}

fn banner() {
    println!("contact-scraper v{}", env!("CARGO_PKG_VERSION"));
    println!();
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "debug,hyper=warn,reqwest=info"
    } else {
        "info,hyper=warn,reqwest=warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL")
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(ErrorLayer::default())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    banner();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.scrape_config();
    println!("[*] input file: {}", cli.input.display());
    println!("[*] output file: {}", cli.output.display());
    println!("[*] max threads: {}", config.workers);
    println!("[*] scraping: {}", config.mode.as_str());
    println!();

    let mut denylists = Denylists::default();
    if let Some(path) = &cli.denylist {
        denylists.extend_from_file(path).await?;
        info!(
            "Denylists: {} phone, {} url entries",
            denylists.phone.len(),
            denylists.url.len()
        );
    }

    let input = match File::open(&cli.input).await {
        Ok(file) => BufReader::new(file),
        Err(e) => {
            error!("can't open file '{}'", cli.input.display());
            return Err(e.into());
        }
    };

    let output = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&cli.output)
        .await;
    let mut output = match output {
        Ok(file) => BufWriter::new(file),
        Err(e) => {
            error!("can't open or create file '{}'", cli.output.display());
            return Err(e.into());
        }
    };

    let scraper = Scraper::new(config, HttpFetcher::new()?, denylists);
    let stats = scraper.run(input, &mut output).await?;

    info!(
        "Done: {} records, {} failed, {} duplicates, {} malformed",
        stats.records, stats.failed, stats.duplicates, stats.malformed
    );
    Ok(())
}

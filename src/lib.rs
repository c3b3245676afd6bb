use reqwest::Url;
use std::sync::Arc;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::{
        mpsc::{self, Receiver, Sender},
        Mutex,
    },
    time::Duration,
};
use tracing::{debug, info, warn};

pub mod denylist;
pub mod extract;
pub mod fetch;

mod data;
mod error;
mod throttle;
mod visited;

pub use data::{ScrapeMode, ScrapedRecord};
pub use denylist::{Denylist, Denylists};
pub use error::ScrapeError;
pub use fetch::{Fetch, HttpFetcher};
pub use throttle::Throttle;
pub use visited::VisitedSet;

pub const DEFAULT_WORKERS: usize = 8;
pub const REQUEST_DELAY: Duration = Duration::from_secs(3);

// Both queues hold at most one item so the sink paces the workers and the
// workers pace the loader.
const QUEUE_CAPACITY: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    pub mode: ScrapeMode,
    pub workers: usize,
    /// Pause each worker takes between completed requests.
    pub request_delay: Duration,
}

impl ScrapeConfig {
    pub fn new(mode: ScrapeMode) -> Self {
        ScrapeConfig {
            mode,
            workers: DEFAULT_WORKERS,
            request_delay: REQUEST_DELAY,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub queued: usize,
    pub malformed: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub records: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct WorkerTally {
    duplicates: usize,
    failed: usize,
}

/// Owns everything shared by the workers of a run.
pub struct Scraper<F> {
    config: ScrapeConfig,
    fetcher: Arc<F>,
    denylists: Arc<Denylists>,
    visited: Arc<VisitedSet>,
}

impl<F> Scraper<F>
where
    F: Fetch + 'static,
{
    pub fn new(config: ScrapeConfig, fetcher: F, denylists: Denylists) -> Self {
        Scraper {
            config,
            fetcher: Arc::new(fetcher),
            denylists: Arc::new(denylists),
            visited: Arc::new(VisitedSet::new()),
        }
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Scrapes every URL listed in `input` and appends the results to
    /// `output`, flushing after each record.
    ///
    /// Returns once the input is exhausted, every worker has exited and
    /// every record has been written.
    pub async fn run<R, W>(&self, input: R, output: &mut W) -> Result<RunStats, ScrapeError>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin,
    {
        let (url_tx, url_rx) = mpsc::channel::<String>(QUEUE_CAPACITY);
        let (record_tx, mut record_rx) = mpsc::channel::<ScrapedRecord>(QUEUE_CAPACITY);
        let url_rx = Arc::new(Mutex::new(url_rx));

        let workers = self.config.workers.max(1);
        info!("Starting {} workers", workers);

        let handles: Vec<_> = (0..workers)
            .map(|id| {
                let worker = Worker {
                    id,
                    mode: self.config.mode,
                    fetcher: Arc::clone(&self.fetcher),
                    denylists: Arc::clone(&self.denylists),
                    visited: Arc::clone(&self.visited),
                    throttle: Throttle::new(self.config.request_delay),
                };
                tokio::spawn(worker.run(Arc::clone(&url_rx), record_tx.clone()))
            })
            .collect();
        drop(url_rx);

        let loader = tokio::spawn(load_urls(input, url_tx));

        let watcher = tokio::spawn(async move {
            let results = futures::future::join_all(handles).await;
            drop(record_tx);
            debug!("All workers finished");

            results
                .into_iter()
                .fold(WorkerTally::default(), |acc, result| match result {
                    Ok(tally) => WorkerTally {
                        duplicates: acc.duplicates + tally.duplicates,
                        failed: acc.failed + tally.failed,
                    },
                    Err(e) => {
                        warn!("Worker stopped abnormally: {}", e);
                        acc
                    }
                })
        });

        let mut records = 0;
        while let Some(record) = record_rx.recv().await {
            info!("[<-] {}", record.url);
            output
                .write_all(record.render(self.config.mode).as_bytes())
                .await?;
            output.flush().await?;
            records += 1;
        }

        let (queued, malformed) = loader.await??;
        let tally = watcher.await?;

        Ok(RunStats {
            queued,
            malformed,
            duplicates: tally.duplicates,
            failed: tally.failed,
            records,
        })
    }
}

/// Returns `line` as a queueable URL if it parses as one.
fn parse_candidate(line: &str) -> Result<String, ScrapeError> {
    Url::parse(line)
        .map(|_| line.to_string())
        .map_err(|_| ScrapeError::MalformedUrl(line.to_string()))
}

/// Feeds the URLs of `input` to the workers in file order. The queue closes
/// when this returns.
async fn load_urls<R>(input: R, queue: Sender<String>) -> Result<(usize, usize), ScrapeError>
where
    R: AsyncBufRead + Unpin,
{
    let mut queued = 0;
    let mut malformed = 0;
    let mut lines = input.split(b'\n');

    while let Some(raw) = lines.next_segment().await? {
        let line = match std::str::from_utf8(&raw) {
            Ok(line) => line.trim(),
            Err(_) => {
                debug!("Skip line that is not valid UTF-8");
                malformed += 1;
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        match parse_candidate(line) {
            Ok(url) => {
                if queue.send(url).await.is_err() {
                    warn!("Workers are gone, stop loading");
                    break;
                }
                queued += 1;
            }
            Err(e) => {
                debug!("Skip {}", e);
                malformed += 1;
            }
        }
    }

    debug!("Loaded {} URLs ({} malformed)", queued, malformed);
    Ok((queued, malformed))
}

struct Worker<F> {
    id: usize,
    mode: ScrapeMode,
    fetcher: Arc<F>,
    denylists: Arc<Denylists>,
    visited: Arc<VisitedSet>,
    throttle: Throttle,
}

impl<F: Fetch> Worker<F> {
    async fn run(
        mut self,
        queue: Arc<Mutex<Receiver<String>>>,
        records: Sender<ScrapedRecord>,
    ) -> WorkerTally {
        let mut tally = WorkerTally::default();

        loop {
            self.throttle.ready().await;

            let next = queue.lock().await.recv().await;
            let Some(url) = next else {
                break;
            };

            if !self.visited.try_claim(&url) {
                tally.duplicates += 1;
                continue;
            }

            debug!("[->] {}", url);
            let html = match self.fetcher.fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    debug!("[x] failed: {}", e);
                    tally.failed += 1;
                    continue;
                }
            };

            let record = self.scrape(url, &html);
            if records.send(record).await.is_err() {
                warn!("Worker {}: output closed, stopping", self.id);
                break;
            }
            self.throttle.completed();
        }

        debug!("Worker {} done", self.id);
        tally
    }

    fn scrape(&self, url: String, html: &[u8]) -> ScrapedRecord {
        match self.mode {
            ScrapeMode::PhoneNumbers => ScrapedRecord {
                phone_numbers: extract::extract_phone_numbers(html, &self.denylists.phone),
                url,
                ..Default::default()
            },
            ScrapeMode::Urls => ScrapedRecord {
                urls: extract::extract_urls(&url, html, &self.denylists.url),
                url,
                ..Default::default()
            },
        }
    }
}

use tokio::time::{Duration, Instant};

/// Keeps a single worker at least `delay` apart between completed requests.
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    last_request: Option<Instant>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Throttle {
            delay,
            last_request: None,
        }
    }

    /// Sleeps until `delay` has passed since the last completed request.
    pub async fn ready(&mut self) {
        if let Some(last_request) = self.last_request {
            let elapsed = Instant::now().duration_since(last_request);
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
    }

    pub fn completed(&mut self) {
        self.last_request.replace(Instant::now());
    }
}

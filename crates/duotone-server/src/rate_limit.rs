//! Fixed-window per-client rate limiting.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use http::HeaderValue;
use parking_lot::Mutex;

use crate::wire::Response;

/// Sweep expired windows once the table grows past this many clients.
const SWEEP_THRESHOLD: usize = 4096;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

#[derive(Debug)]
struct Table {
    clients: HashMap<IpAddr, Window>,
    last_sweep: Option<Instant>,
}

/// Outcome of one [`RateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests allowed per window.
    pub limit: u32,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Time until the window resets.
    pub reset_after: Duration,
}

impl RateDecision {
    /// Attach `RateLimit-*` headers.
    pub fn decorate(&self, response: &mut Response) {
        let headers = response.headers_mut();
        headers.insert("ratelimit-limit", HeaderValue::from(self.limit));
        headers.insert("ratelimit-remaining", HeaderValue::from(self.remaining));
        headers.insert(
            "ratelimit-reset",
            HeaderValue::from(self.reset_after.as_secs()),
        );
    }
}

/// Counts requests per client IP in fixed windows that start at the
/// client's first request.
#[derive(Debug)]
pub struct RateLimiter {
    max: u32,
    window: Duration,
    table: Mutex<Table>,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            table: Mutex::new(Table {
                clients: HashMap::new(),
                last_sweep: None,
            }),
        }
    }

    /// Record a request from `ip` at `now` and decide whether to serve it.
    pub fn check(&self, ip: IpAddr, now: Instant) -> RateDecision {
        let mut table = self.table.lock();
        let window = self.window;

        // Sweep at most once per window.
        let sweep_due = table
            .last_sweep
            .is_none_or(|last| now.saturating_duration_since(last) >= window);
        if table.clients.len() > SWEEP_THRESHOLD && sweep_due {
            table
                .clients
                .retain(|_, w| now.saturating_duration_since(w.started) < window);
            table.last_sweep = Some(now);
        }

        let entry = table.clients.entry(ip).or_insert(Window {
            started: now,
            hits: 0,
        });
        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                hits: 0,
            };
        }

        entry.hits = entry.hits.saturating_add(1);
        let elapsed = now.saturating_duration_since(entry.started);

        RateDecision {
            allowed: entry.hits <= self.max,
            limit: self.max,
            remaining: self.max.saturating_sub(entry.hits),
            reset_after: self.window.saturating_sub(elapsed),
        }
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.table.lock().clients.len()
    }
}

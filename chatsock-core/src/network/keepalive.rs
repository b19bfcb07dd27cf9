// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Keepalive Scheduler
//!
//! Sends `GET /v1/keepalive` as soon as it starts and then once per interval
//! until stopped. At most one timer runs per scheduler.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::correlator::RequestCorrelator;
use super::message::{Frame, KEEPALIVE_PATH, KEEPALIVE_VERB};
use super::protocol::EnvelopeCodec;

/// Default interval between keepalive requests (60 s).
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_millis(60_000);

/// Periodic liveness request bound to one connection.
#[derive(Debug)]
pub struct KeepaliveScheduler {
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl Default for KeepaliveScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_KEEPALIVE_INTERVAL)
    }
}

impl KeepaliveScheduler {
    pub fn new(interval: Duration) -> Self {
        KeepaliveScheduler {
            interval,
            task: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts the timer, replacing any timer already running.
    ///
    /// Each tick takes a fresh id from `correlator`, encodes the request and
    /// passes the bytes to `send`. Must be called from within a tokio runtime;
    /// outside one, or with a zero interval, the call is logged and ignored.
    pub fn start<F>(&mut self, correlator: Arc<RequestCorrelator>, codec: EnvelopeCodec, send: F)
    where
        F: Fn(Vec<u8>) + Send + 'static,
    {
        self.stop();

        if self.interval.is_zero() {
            warn!("Keepalive not started: interval must be non-zero");
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(error = %e, "Keepalive not started: no async runtime");
                return;
            }
        };

        let interval = self.interval;
        self.task = Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // First tick completes immediately.
                ticker.tick().await;

                let ping = correlator.build_request(KEEPALIVE_VERB, KEEPALIVE_PATH);
                let id = ping.id;
                match codec.encode(&Frame::Request(ping)) {
                    Ok(bytes) => {
                        debug!(id, "Sending keepalive");
                        send(bytes);
                    }
                    Err(e) => warn!(id, error = %e, "Keepalive request failed validation"),
                }
            }
        }));
    }

    /// Cancels the timer. No-op when not running.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Keepalive stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for KeepaliveScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn start_collecting(
        scheduler: &mut KeepaliveScheduler,
        correlator: Arc<RequestCorrelator>,
    ) -> mpsc::UnboundedReceiver<Vec<u8>> {
        let (tx, rx) = mpsc::unbounded_channel();
        scheduler.start(correlator, EnvelopeCodec::default(), move |bytes| {
            let _ = tx.send(bytes);
        });
        rx
    }

    fn keepalive_ids(rx: &mut mpsc::UnboundedReceiver<Vec<u8>>) -> Vec<u64> {
        let codec = EnvelopeCodec::default();
        let mut ids = Vec::new();
        while let Ok(bytes) = rx.try_recv() {
            let frame = codec.decode(&bytes).unwrap();
            let request = frame.as_request().unwrap();
            assert_eq!(request.verb, "GET");
            assert_eq!(request.path, "/v1/keepalive");
            ids.push(request.id);
        }
        ids
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_immediately_then_every_interval() {
        let mut scheduler = KeepaliveScheduler::default();
        let mut rx = start_collecting(&mut scheduler, Arc::new(RequestCorrelator::new()));

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(keepalive_ids(&mut rx), vec![1]);

        tokio::time::sleep(Duration::from_millis(59_990)).await;
        assert!(keepalive_ids(&mut rx).is_empty());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(keepalive_ids(&mut rx), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_timer() {
        let mut scheduler = KeepaliveScheduler::default();
        let mut rx = start_collecting(&mut scheduler, Arc::new(RequestCorrelator::new()));

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(keepalive_ids(&mut rx).len(), 1);

        scheduler.stop();
        assert!(!scheduler.is_running());

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert!(keepalive_ids(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_keeps_single_timer() {
        let correlator = Arc::new(RequestCorrelator::new());
        let mut scheduler = KeepaliveScheduler::default();
        let mut first = start_collecting(&mut scheduler, correlator.clone());
        tokio::time::sleep(Duration::from_millis(1)).await;
        let mut second = start_collecting(&mut scheduler, correlator);

        tokio::time::sleep(Duration::from_millis(120_010)).await;

        // The first stream only saw its initial keepalive.
        assert_eq!(keepalive_ids(&mut first).len(), 1);
        // The second fired at start and after each of two intervals.
        assert_eq!(keepalive_ids(&mut second).len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_refused() {
        let mut scheduler = KeepaliveScheduler::new(Duration::ZERO);
        let mut rx = start_collecting(&mut scheduler, Arc::new(RequestCorrelator::new()));

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(!scheduler.is_running());
        assert!(keepalive_ids(&mut rx).is_empty());
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let mut scheduler = KeepaliveScheduler::default();
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());
    }
}

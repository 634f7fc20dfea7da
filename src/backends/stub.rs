// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::traits::{Handler, HandlerError, Request, Response};

/// Copies its input to its output unchanged.
pub struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    async fn serve(&self, mut req: Request, mut res: Response) -> Result<(), HandlerError> {
        tokio::io::copy(&mut req.data, &mut res.data).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "echo"
    }
}

/// A handler that always fails without touching its streams.
pub struct FailingHandler {
    pub message: String,
}

impl FailingHandler {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl Handler for FailingHandler {
    async fn serve(&self, _req: Request, _res: Response) -> Result<(), HandlerError> {
        Err(self.message.clone().into())
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Tracks how many handlers are inside their critical section and the peak.
#[derive(Debug, Default)]
pub struct ConcurrencyGauge {
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl ConcurrencyGauge {
    pub fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    pub fn exit(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

/// Echoes its input after sleeping, recording concurrency on a shared gauge.
///
/// The sleep ends early if the request context is done, in which case the
/// context's error is returned.
pub struct SleepingHandler {
    pub delay: Duration,
    pub gauge: Arc<ConcurrencyGauge>,
}

impl SleepingHandler {
    pub fn new(delay: Duration, gauge: Arc<ConcurrencyGauge>) -> Self {
        Self { delay, gauge }
    }
}

#[async_trait]
impl Handler for SleepingHandler {
    async fn serve(&self, mut req: Request, mut res: Response) -> Result<(), HandlerError> {
        self.gauge.enter();
        let slept = tokio::select! {
            _ = req.ctx.done() => Err(req.ctx.err()),
            _ = tokio::time::sleep(self.delay) => Ok(()),
        };
        self.gauge.exit();
        if let Err(err) = slept {
            return Err(err.map_or_else(|| "cancelled".into(), Into::into));
        }

        tokio::io::copy(&mut req.data, &mut res.data).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "sleeping"
    }
}

/// Passes input through while recording every invocation and the bytes it saw.
#[derive(Default)]
pub struct RecordingHandler {
    invocations: AtomicUsize,
    seen: Mutex<Vec<Vec<u8>>>,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Inputs observed by completed reads, in invocation order.
    pub fn seen(&self) -> Vec<Vec<u8>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Handler for RecordingHandler {
    async fn serve(&self, mut req: Request, mut res: Response) -> Result<(), HandlerError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let bytes = req.read_all().await?;
        self.seen.lock().unwrap().push(bytes.clone());
        res.write(&bytes).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Flow orchestration: an ordered chain of handlers run as concurrent stages.
//!
//! # Execution Model
//!
//! For `N` handlers an execution wires `N + 1` byte channels and launches
//! `N + 2` tasks next to a small input relay:
//!
//! ```text
//!  input ──relay──▶ ch0 ──▶ [stage 0] ──▶ ch1 ──▶ [stage 1] ── … ──▶ chN ──collector──▶ output
//!                              │                     │
//!                              └──── error sink ◀────┘           watcher: all stages done
//! ```
//!
//! Every stage runs as soon as it is admitted, so a stage consumes its
//! predecessor's output incrementally instead of waiting for it to finish:
//!
//! ```text
//!  Handler1: [========]
//!  Handler2:   [========]
//!  Handler3:     [========]
//! ```
//!
//! # Outcome
//!
//! The caller waits on one biased race between, in priority order:
//! 1. the caller's context being done → `Cancelled` / `DeadlineExceeded`
//! 2. the first error on the shared error sink → that error
//! 3. every stage having exited → the output collector's result
//!
//! Only the first of these is returned. Errors that reach the sink after the
//! race is decided are never read.
//!
//! # Abandoned Executions
//!
//! Tasks are not joined or aborted when the race is decided early. The
//! execution's own child context is cancelled instead, so admission waits end
//! and handlers that watch their context can stop. Because channel ends are
//! owned, a stage whose neighbour has gone away sees end-of-stream or a broken
//! pipe rather than blocking forever.

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::Instrument;

use crate::config::consts::RELAY_BUFFER_SIZE;
use crate::config::FlowConfig;
use crate::convert::{FromByteOutput, IntoByteSource};
use crate::engine::channel::{byte_channel, ByteReader, ByteWriter};
use crate::engine::context::Context;
use crate::engine::limiter::AdmissionLimiter;
use crate::engine::stage::{report, Stage};
use crate::errors::{FlowError, HandlerError};
use crate::observability::messages::engine::{
    FlowExecutionCancelled, FlowExecutionCompleted, FlowExecutionFailed, FlowExecutionStarted,
};
use crate::observability::messages::stage::{InputRelayFailed, OutputRelayFailed};
use crate::observability::messages::StructuredLog;
use crate::traits::{handler_fn, Handler, Request, Response};

/// An ordered, reusable, composable pipeline of handlers.
///
/// Build it once with [`append`](Flow::append) and friends, then run it as
/// many times as needed, concurrently if desired. Executions share nothing
/// but the admission limiter.
///
/// # Examples
///
/// ```rust
/// use the_pipewood::{Context, Flow, Request, Response};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), the_pipewood::FlowError> {
/// let flow = Flow::new()
///     .append_fn("upper", |mut req: Request, mut res: Response| async move {
///         let text = req.read_string().await?;
///         res.write_str(&text.to_uppercase()).await?;
///         Ok(())
///     })
///     .append_fn("exclaim", |mut req: Request, mut res: Response| async move {
///         let text = req.read_string().await?;
///         res.write_str(&format!("{}!", text)).await?;
///         Ok(())
///     });
///
/// let output: String = flow.run(&Context::new(), "hello").await?;
/// assert_eq!(output, "HELLO!");
/// # Ok(())
/// # }
/// ```
pub struct Flow {
    handlers: Vec<Arc<dyn Handler>>,
    limiter: AdmissionLimiter,
    channel_capacity: usize,
}

impl Flow {
    /// A flow with unlimited concurrency and default channel capacity.
    pub fn new() -> Self {
        Self::with_config(FlowConfig::default())
    }

    /// A flow with its own limiter built from `config`.
    pub fn with_config(config: FlowConfig) -> Self {
        Self {
            handlers: Vec::new(),
            limiter: AdmissionLimiter::new(config.concurrency),
            channel_capacity: config.channel_capacity.max(1),
        }
    }

    /// A flow sharing an existing limiter, so the bound spans every flow
    /// holding a clone of it.
    pub fn with_limiter(limiter: AdmissionLimiter) -> Self {
        Self {
            handlers: Vec::new(),
            limiter,
            channel_capacity: FlowConfig::default().channel_capacity,
        }
    }

    /// Override the in-flight byte bound of the channels between stages.
    #[must_use]
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Add a handler to the end of the chain.
    ///
    /// Must not be called once the flow has started executing.
    #[must_use]
    pub fn append<H: Handler + 'static>(self, handler: H) -> Self {
        self.append_arc(Arc::new(handler))
    }

    /// Add an already shared handler to the end of the chain.
    #[must_use]
    pub fn append_arc(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Add an async closure as a handler.
    #[must_use]
    pub fn append_fn<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Request, Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.append(handler_fn(name, f))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn limiter(&self) -> &AdmissionLimiter {
        &self.limiter
    }

    /// Run the flow on a typed input and decode the output.
    ///
    /// `input` is turned into a byte stream with [`IntoByteSource`]; the
    /// collected output bytes become an `O` with [`FromByteOutput`].
    pub async fn run<I, O>(&self, ctx: &Context, input: I) -> Result<O, FlowError>
    where
        I: IntoByteSource,
        O: FromByteOutput,
    {
        let source = input.into_byte_source()?;
        let collected = self.run_streaming(ctx, source, Vec::new()).await?;
        O::from_byte_output(collected)
    }

    /// Stream `input` through every handler into `output`.
    ///
    /// Returns `output` back once all of the pipeline's bytes have been
    /// written and flushed into it.
    pub async fn run_streaming<R, W>(&self, ctx: &Context, input: R, output: W) -> Result<W, FlowError>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        ctx.check()?;

        if self.handlers.is_empty() {
            return passthrough(input, output).await;
        }

        let started = FlowExecutionStarted {
            handler_count: self.handlers.len(),
            limiter_capacity: self.limiter.capacity(),
        };
        let span = started.span("run_streaming");
        started.log();

        self.execute(ctx, input, output).instrument(span).await
    }

    async fn execute<R, W>(&self, ctx: &Context, input: R, output: W) -> Result<W, FlowError>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let handler_count = self.handlers.len();
        let started = Instant::now();

        // Cancelled however this function exits, including the caller dropping us.
        let exec_ctx = ctx.with_cancel();
        let _abandon = exec_ctx.cancel_on_drop();

        // One slot per stage plus the relay, with room to spare.
        let (errors, mut error_sink) = mpsc::channel(handler_count + 2);

        let (first_reader, relay_writer) = byte_channel(self.channel_capacity);
        tokio::spawn(relay_input(input, relay_writer, errors.clone()).in_current_span());

        let mut upstream = first_reader;
        let mut stage_tasks = Vec::with_capacity(handler_count);
        for (index, handler) in self.handlers.iter().enumerate() {
            let (next_reader, stage_writer) = byte_channel(self.channel_capacity);
            let stage = Stage {
                index,
                handler: handler.clone(),
                input: std::mem::replace(&mut upstream, next_reader),
                output: stage_writer,
                limiter: self.limiter.clone(),
                ctx: exec_ctx.clone(),
                errors: errors.clone(),
            };
            stage_tasks.push(tokio::spawn(stage.run().in_current_span()));
        }

        let (collected_tx, collected_rx) = oneshot::channel();
        let collector_errors = errors.clone();
        tokio::spawn(
            async move {
                let _ = collected_tx.send(collect_output(upstream, output, collector_errors).await);
            }
            .in_current_span(),
        );

        let (done_tx, done_rx) = oneshot::channel::<()>();
        let watcher_errors = errors.clone();
        tokio::spawn(
            async move {
                for (index, task) in stage_tasks.into_iter().enumerate() {
                    if let Err(join_error) = task.await {
                        report(
                            &watcher_errors,
                            FlowError::StageAborted {
                                index,
                                reason: join_error.to_string(),
                            },
                        );
                    }
                }
                let _ = done_tx.send(());
            }
            .in_current_span(),
        );
        drop(errors);

        let outcome = tokio::select! {
            biased;
            _ = ctx.done() => Err(cancellation(ctx)),
            Some(err) = error_sink.recv() => Err(err),
            _ = done_rx => {
                tokio::select! {
                    biased;
                    _ = ctx.done() => Err(cancellation(ctx)),
                    collected = collected_rx => collected.unwrap_or_else(|_| Err(FlowError::Internal {
                        message: "output collector ended without reporting".into(),
                    })),
                }
            }
        };

        match &outcome {
            Ok(_) => FlowExecutionCompleted {
                handler_count,
                duration: started.elapsed(),
            }
            .log(),
            Err(err) if err.is_cancellation() => FlowExecutionCancelled {
                handler_count,
                reason: err,
            }
            .log(),
            Err(err) => FlowExecutionFailed {
                handler_count,
                error: err,
            }
            .log(),
        }
        outcome
    }
}

fn cancellation(ctx: &Context) -> FlowError {
    ctx.err().unwrap_or(FlowError::Cancelled)
}

/// Zero-handler flow: copy straight through.
async fn passthrough<R, W>(mut input: R, mut output: W) -> Result<W, FlowError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    tokio::io::copy(&mut input, &mut output)
        .await
        .map_err(FlowError::Relay)?;
    output.flush().await.map_err(FlowError::Relay)?;
    Ok(output)
}

/// Feed the external source into the first stage.
///
/// A read failure is reported before the first stage is told about it, so
/// the relay error is on the sink before that stage can finish. A write
/// failure means the first stage stopped reading; it reports its own outcome.
async fn relay_input<R>(mut source: R, mut sink: ByteWriter, errors: mpsc::Sender<FlowError>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; RELAY_BUFFER_SIZE];
    let mut relayed: u64 = 0;
    loop {
        let n = match source.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                InputRelayFailed {
                    bytes_relayed: relayed,
                    error: &err,
                }
                .log();
                let kind = err.kind();
                let message = err.to_string();
                report(&errors, FlowError::Relay(err));
                let _ = sink.close_with_error(kind, message).await;
                return;
            }
        };
        if sink.write_all(&buf[..n]).await.is_err() {
            return;
        }
        relayed += n as u64;
    }
    let _ = sink.close().await;
}

/// Copies the last stage's output into the caller's sink.
///
/// A sink failure is reported while the final reader is still open, so it
/// lands on the error sink ahead of the broken pipe the last stage sees once
/// the reader is dropped.
async fn collect_output<W>(
    mut source: ByteReader,
    mut sink: W,
    errors: mpsc::Sender<FlowError>,
) -> Result<W, FlowError>
where
    W: AsyncWrite + Unpin,
{
    let copied = match tokio::io::copy(&mut source, &mut sink).await {
        Ok(_) => sink.flush().await,
        Err(err) => Err(err),
    };
    match copied {
        Ok(()) => Ok(sink),
        Err(err) => {
            OutputRelayFailed { error: &err }.log();
            let returned = io::Error::new(err.kind(), err.to_string());
            report(&errors, FlowError::Relay(err));
            drop(source);
            Err(FlowError::Relay(returned))
        }
    }
}

impl Default for Flow {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flow")
            .field(
                "handlers",
                &self.handlers.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .field("limiter_capacity", &self.limiter.capacity())
            .field("channel_capacity", &self.channel_capacity)
            .finish()
    }
}

/// A flow is itself a handler, so flows nest to any depth with the same
/// streaming semantics.
#[async_trait]
impl Handler for Flow {
    async fn serve(&self, req: Request, res: Response) -> Result<(), HandlerError> {
        let Request { ctx, data } = req;
        self.run_streaming(&ctx, data, res.data).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "Flow"
    }
}

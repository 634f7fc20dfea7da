// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! One handler bound to its channels for a single execution.
//!
//! A stage runs as its own task:
//!
//! 1. wait for an admission slot (if limiting is enabled); if the context is
//!    done first, report the cancellation and stop without running the handler;
//! 2. run the handler, handing it ownership of the input reader and output writer;
//! 3. release the slot; the output writer is already closed at this point because
//!    the handler (or the abandoned request) owned it, so downstream always sees
//!    end-of-stream;
//! 4. report a handler error to the shared error sink.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::Instrument;

use crate::engine::channel::{ByteReader, ByteWriter};
use crate::engine::context::Context;
use crate::engine::limiter::AdmissionLimiter;
use crate::errors::FlowError;
use crate::observability::messages::stage::{
    StageAdmissionDenied, StageCompleted, StageFailed, StageStarted,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Handler, Request, Response};

pub(crate) struct Stage {
    pub(crate) index: usize,
    pub(crate) handler: Arc<dyn Handler>,
    pub(crate) input: ByteReader,
    pub(crate) output: ByteWriter,
    pub(crate) limiter: AdmissionLimiter,
    pub(crate) ctx: Context,
    pub(crate) errors: mpsc::Sender<FlowError>,
}

impl Stage {
    /// Run the stage to completion. Never fails itself: every problem goes to
    /// the error sink.
    pub(crate) async fn run(self) {
        let span = StageStarted {
            index: self.index,
            handler: self.handler.name(),
        }
        .span("stage");
        self.run_inner().instrument(span).await
    }

    async fn run_inner(self) {
        let Stage {
            index,
            handler,
            input,
            output,
            limiter,
            ctx,
            errors,
        } = self;
        let name = handler.name().to_string();

        // A done context never reaches the handler, limited or not.
        let admission = match ctx.check() {
            Ok(()) => limiter.acquire(&ctx).await,
            Err(err) => Err(err),
        };
        let permit = match admission {
            Ok(permit) => permit,
            Err(reason) => {
                StageAdmissionDenied {
                    index,
                    handler: &name,
                    reason: &reason,
                }
                .log();
                // input and output drop here: upstream sees a broken pipe,
                // downstream sees end-of-stream.
                drop((input, output));
                report(&errors, reason);
                return;
            }
        };

        StageStarted {
            index,
            handler: &name,
        }
        .log();
        let started = Instant::now();
        let result = handler
            .serve(Request::new(ctx, input), Response::new(output))
            .await;
        drop(permit);

        match result {
            Ok(()) => StageCompleted {
                index,
                handler: &name,
                duration: started.elapsed(),
            }
            .log(),
            Err(source) => {
                StageFailed {
                    index,
                    handler: &name,
                    error: source.as_ref(),
                }
                .log();
                report(
                    &errors,
                    FlowError::Stage {
                        index,
                        handler: name,
                        source,
                    },
                );
            }
        }
    }
}

/// Push onto the error sink without waiting. The sink is sized so that every
/// stage and the relay can each report once; if nobody is reading any more the
/// value is simply left behind.
pub(crate) fn report(errors: &mpsc::Sender<FlowError>, err: FlowError) {
    if let Err(mpsc::error::TrySendError::Full(err)) = errors.try_send(err) {
        tracing::warn!(error = %err, "error sink full, dropping error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::channel::byte_channel;
    use crate::traits::{handler_fn, HandlerError};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn stage_for(
        handler: Arc<dyn Handler>,
        limiter: AdmissionLimiter,
        ctx: Context,
    ) -> (Stage, ByteWriter, ByteReader, mpsc::Receiver<FlowError>) {
        let (input, feed) = byte_channel(64);
        let (drain, output) = byte_channel(64);
        let (errors, sink) = mpsc::channel(4);
        let stage = Stage {
            index: 3,
            handler,
            input,
            output,
            limiter,
            ctx,
            errors,
        };
        (stage, feed, drain, sink)
    }

    #[tokio::test]
    async fn test_successful_stage_closes_output() {
        let echo = Arc::new(handler_fn("echo", |mut req: Request, mut res: Response| async move {
            let bytes = req.read_all().await?;
            res.write(&bytes).await?;
            Ok(())
        }));
        let (stage, mut feed, mut drain, mut sink) =
            stage_for(echo, AdmissionLimiter::fixed(1), Context::new());

        feed.write_all(b"ping").await.unwrap();
        drop(feed);
        stage.run().await;

        let mut out = Vec::new();
        drain.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"ping");
        assert!(sink.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_handler_error_is_wrapped_and_reported() {
        let failing = Arc::new(handler_fn("failing", |_req: Request, _res: Response| async move {
            Err::<(), HandlerError>("kaput".into())
        }));
        let (stage, _feed, mut drain, mut sink) =
            stage_for(failing, AdmissionLimiter::unlimited(), Context::new());

        stage.run().await;

        match sink.try_recv().unwrap() {
            FlowError::Stage { index, handler, source } => {
                assert_eq!(index, 3);
                assert_eq!(handler, "failing");
                assert_eq!(source.to_string(), "kaput");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Output is closed even though the handler failed.
        let mut out = Vec::new();
        assert_eq!(drain.read_to_end(&mut out).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_stage_never_invokes_handler() {
        let invoked = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = invoked.clone();
        let handler = Arc::new(handler_fn("flagged", move |_req: Request, _res: Response| {
            let flag = flag.clone();
            async move {
                flag.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok(())
            }
        }));
        let ctx = Context::new();
        ctx.cancel();
        let limiter = AdmissionLimiter::fixed(1);
        let (stage, _feed, mut drain, mut sink) = stage_for(handler, limiter.clone(), ctx);

        stage.run().await;

        assert!(!invoked.load(std::sync::atomic::Ordering::SeqCst));
        assert!(matches!(sink.try_recv(), Ok(FlowError::Cancelled)));
        assert_eq!(limiter.available(), Some(1));
        let mut out = Vec::new();
        assert_eq!(drain.read_to_end(&mut out).await.unwrap(), 0);
    }
}

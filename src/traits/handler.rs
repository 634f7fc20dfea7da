// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::future::Future;
use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::engine::{ByteReader, ByteWriter, Context};
pub use crate::errors::HandlerError;

/// Input side of a handler invocation.
#[derive(Debug)]
pub struct Request {
    pub ctx: Context,
    pub data: ByteReader,
}

/// Output side of a handler invocation.
///
/// The writer is owned: it is closed when the response is dropped, which
/// happens at the latest when the handler's future completes.
#[derive(Debug)]
pub struct Response {
    pub data: ByteWriter,
}

impl Request {
    pub fn new(ctx: Context, data: ByteReader) -> Self {
        Self { ctx, data }
    }

    /// Drain the whole input stream.
    pub async fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.data.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Drain the whole input stream as UTF-8.
    pub async fn read_string(&mut self) -> io::Result<String> {
        let mut text = String::new();
        self.data.read_to_string(&mut text).await?;
        Ok(text)
    }
}

impl Response {
    pub fn new(data: ByteWriter) -> Self {
        Self { data }
    }

    pub async fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.data.write_all(bytes).await
    }

    pub async fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.data.write_all(text.as_bytes()).await
    }
}

/// A streaming stage: consume `req.data`, produce `res.data`.
///
/// Implementations must drain their input and let go of their output before
/// returning; an undrained input makes the upstream stage fail with a broken
/// pipe, and a retained output keeps the downstream stage waiting.
/// [`Flow`](crate::engine::Flow) implements this trait too, so a whole flow can
/// be registered as one stage of another.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn serve(&self, req: Request, res: Response) -> Result<(), HandlerError>;

    /// Name used in logs and in [`FlowError::Stage`](crate::errors::FlowError::Stage).
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

fn short_type_name(full: &str) -> &str {
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics.rsplit("::").next().unwrap_or(without_generics)
}

/// Adapter turning an async closure into a [`Handler`].
pub struct HandlerFn<F> {
    name: String,
    f: F,
}

/// Wrap an async closure as a handler.
///
/// # Example
/// ```
/// use the_pipewood::{handler_fn, Request, Response};
///
/// let upper = handler_fn("upper", |mut req: Request, mut res: Response| async move {
///     let text = req.read_string().await?;
///     res.write_str(&text.to_uppercase()).await?;
///     Ok(())
/// });
/// ```
pub fn handler_fn<F, Fut>(name: impl Into<String>, f: F) -> HandlerFn<F>
where
    F: Fn(Request, Response) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    HandlerFn {
        name: name.into(),
        f,
    }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Request, Response) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn serve(&self, req: Request, res: Response) -> Result<(), HandlerError> {
        (self.f)(req, res).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub mod handler;

pub use handler::{handler_fn, Handler, HandlerError, HandlerFn, Request, Response};

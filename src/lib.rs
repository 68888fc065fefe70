//! HTTP/1.x Response Engine
//!
//! Drives the response side of an HTTP/1.x connection: given a parsed request and an application
//! producing its body incrementally, it negotiates status and headers, selects the transfer
//! coding, streams the body, recovers from application failures, and decides whether the
//! connection can be reused.
//!
//! Request parsing is provided by the embedder through [`request::RequestParser`].
#![warn(missing_debug_implementations)]

mod log;

pub mod http;
pub mod headers;
pub mod body;
pub mod request;
pub mod proto;
pub mod service;
pub mod config;
pub mod error;
pub mod rt;

pub use config::Config;
pub use error::{BoxError, HttpError};
pub use http::{Response, StatusCode, Version};
pub use rt::{serve, Server, Connection};

#[cfg(test)]
mod test;

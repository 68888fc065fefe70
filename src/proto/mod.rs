//! HTTP/1.x response protocol.
//!
//! - [`ResponseState`] status and header bookkeeping of a single response
//! - [`ResponseGenerator`] drives an application into response bytes
//! - [`EnvironmentBuilder`] builds [`RequestContext`] handed to the application
//! - [`exchange`] writes a response into the transport
mod error;
pub mod policy;
mod state;
mod generator;
mod environ;
mod exchange;

pub use error::{ParseError, ProtoError};
pub use policy::{ConnectionOption, KeepAlive, Transfer};
pub use state::{ResponseState, ExpectContinue, CONTINUE};
pub use generator::{ResponseGenerator, Outcome, HeaderObserver};
pub use environ::{EnvironmentBuilder, RequestContext, ConnectionInfo, Scheme, Addr};
pub use exchange::exchange;
pub(crate) use exchange::close;

//! HTTP Protocol primitives.
mod status;
mod version;
mod date;
pub mod response;

pub use version::Version;
pub use status::{StatusCode, InvalidStatusCode};
pub use date::{httpdate, httpdate_now, date_header_value};
pub use response::Response;

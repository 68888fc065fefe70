//! HTTP Header Multimap.
mod matches;
mod name;
mod value;
mod map;
mod iter;
mod error;

pub use name::{HeaderName, AsHeaderName, IntoHeaderName, HOP_BY_HOP, is_hop_by_hop, standard};
pub use value::HeaderValue;
pub use map::{HeaderSet, HeaderField};
pub use iter::{Iter, GetAll};
pub use error::HeaderError;

pub(crate) use map::write_status_line;

#[cfg(test)]
mod test;

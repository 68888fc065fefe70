use bytes::{BufMut, Bytes, BytesMut};

use super::{AsHeaderName, HeaderError, HeaderName, HeaderValue, IntoHeaderName};
use super::iter::{GetAll, Iter};
use crate::http::{StatusCode, Version};

/// Ordered HTTP headers multimap.
///
/// Fields are kept in insertion order, which is the order they are written on the wire. Lookup
/// is ASCII case-insensitive, and a name may appear more than once (e.g. `Set-Cookie`).
#[derive(Clone, Default)]
pub struct HeaderSet {
    fields: Vec<HeaderField>,
}

/// A single header line.
#[derive(Clone, Debug)]
pub struct HeaderField {
    name: HeaderName,
    value: HeaderValue,
}

impl HeaderField {
    #[inline]
    pub fn name(&self) -> &HeaderName {
        &self.name
    }

    #[inline]
    pub fn value(&self) -> &HeaderValue {
        &self.value
    }
}

impl HeaderSet {
    /// Create new empty [`HeaderSet`].
    ///
    /// This function does not allocate.
    #[inline]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Create new empty [`HeaderSet`] with at least the specified capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { fields: Vec::with_capacity(capacity) }
    }

    /// Returns the number of header lines, duplicates included.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if headers has no element.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns an iterator over headers as name and value pair, in insertion order.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.fields)
    }

    pub(crate) fn fields(&self) -> &[HeaderField] {
        &self.fields
    }
}

// ===== Lookup =====

impl HeaderSet {
    /// Returns `true` if the set contains a header value for given header name.
    #[inline]
    pub fn contains<K: AsHeaderName>(&self, name: K) -> bool {
        self.position(name.as_header_str()).is_some()
    }

    /// Returns a reference to the first header value corresponding to the given header name.
    ///
    /// ```rust
    /// use h1engine::headers::{HeaderSet, HeaderValue};
    ///
    /// let mut set = HeaderSet::new();
    /// set.add("Content-Type", HeaderValue::from_static("text/html"));
    /// assert_eq!(set.get("content-type").unwrap().as_str(), "text/html");
    /// ```
    #[inline]
    pub fn get<K: AsHeaderName>(&self, name: K) -> Option<&HeaderValue> {
        self.position(name.as_header_str()).map(|i| &self.fields[i].value)
    }

    /// Returns an iterator to all header values corresponding to the given header name.
    #[inline]
    pub fn get_all<K: AsHeaderName>(&self, name: K) -> GetAll<'_, K> {
        GetAll::new(&self.fields, name)
    }

    /// Returns `true` if any value of the given header contains `token` in its comma separated
    /// list, compared case-insensitively.
    pub fn has_token<K: AsHeaderName>(&self, name: K, token: &str) -> bool {
        self.get_all(name)
            .flat_map(HeaderValue::tokens)
            .any(|e| e.eq_ignore_ascii_case(token))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name.eq_ignore_ascii_case(name))
    }
}

// ===== Mutation =====

impl HeaderSet {
    /// Append a header, never overwriting an existing one.
    ///
    /// # Panics
    ///
    /// When using static str, it must be valid header name, otherwise it panics.
    #[inline]
    pub fn add<K: IntoHeaderName>(&mut self, name: K, value: HeaderValue) {
        self.fields.push(HeaderField {
            name: name.into_header_name(),
            value,
        });
    }

    /// Validate and append a header from raw strings.
    ///
    /// # Errors
    ///
    /// Returns error if either name or value is invalid.
    pub fn try_add(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        let name = HeaderName::from_slice(name)?;
        let value = HeaderValue::from_slice(value)?;
        self.add(name, value);
        Ok(())
    }

    /// Replace the first header with given name, removing any duplicates, or append it if the
    /// name is absent.
    pub fn set<K: IntoHeaderName>(&mut self, name: K, value: HeaderValue) {
        let name = name.into_header_name();
        match self.position(name.as_str()) {
            Some(index) => {
                let mut i = index + 1;
                while i < self.fields.len() {
                    if self.fields[i].name == name {
                        self.fields.remove(i);
                    } else {
                        i += 1;
                    }
                }
                self.fields[index].value = value;
            }
            None => self.fields.push(HeaderField { name, value }),
        }
    }

    /// Removes all headers with given name, returning the first removed value.
    pub fn remove<K: AsHeaderName>(&mut self, name: K) -> Option<HeaderValue> {
        let name = name.as_header_str();
        let index = self.position(name)?;
        let first = self.fields.remove(index).value;
        self.fields.retain(|field| !field.name.eq_ignore_ascii_case(name));
        Some(first)
    }

    /// Clears the set, keeping the allocated memory for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.fields.clear();
    }
}

// ===== Wire =====

impl HeaderSet {
    /// Render status line, all headers, and the terminating empty line.
    pub fn flatten(&self, version: Version, status: StatusCode) -> Bytes {
        let mut buf = BytesMut::with_capacity(64 + self.fields.len() * 32);
        write_status_line(&mut buf, version, status);
        self.write_fields(&mut buf);
        buf.put_slice(b"\r\n");
        buf.freeze()
    }

    /// Write header lines into buffer, without the terminating empty line.
    pub fn write_fields(&self, buf: &mut BytesMut) {
        for HeaderField { name, value } in &self.fields {
            buf.put_slice(name.as_str().as_bytes());
            buf.put_slice(b": ");
            buf.put_slice(value.as_bytes());
            buf.put_slice(b"\r\n");
        }
    }
}

pub(crate) fn write_status_line(buf: &mut BytesMut, version: Version, status: StatusCode) {
    buf.put_slice(version.as_str().as_bytes());
    buf.put_u8(b' ');
    buf.put_slice(itoa::Buffer::new().format(status.as_u16()).as_bytes());
    buf.put_u8(b' ');
    buf.put_slice(status.reason().as_bytes());
    buf.put_slice(b"\r\n");
}

// ===== Traits =====

impl std::fmt::Debug for HeaderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a HeaderSet {
    type Item = <Iter<'a> as Iterator>::Item;

    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: IntoHeaderName> Extend<(K, HeaderValue)> for HeaderSet {
    fn extend<T: IntoIterator<Item = (K, HeaderValue)>>(&mut self, iter: T) {
        for (name, value) in iter {
            self.add(name, value);
        }
    }
}

impl<K: IntoHeaderName> FromIterator<(K, HeaderValue)> for HeaderSet {
    fn from_iter<T: IntoIterator<Item = (K, HeaderValue)>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

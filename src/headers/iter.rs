use super::{AsHeaderName, HeaderName, HeaderValue, map::HeaderField};

/// Iterator over header name and value pairs, in insertion order.
#[derive(Debug)]
pub struct Iter<'a> {
    iter: std::slice::Iter<'a, HeaderField>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(fields: &'a [HeaderField]) -> Self {
        Self { iter: fields.iter() }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a HeaderName, &'a HeaderValue);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|field| (field.name(), field.value()))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

/// Iterator over every value of a single header name.
#[derive(Debug)]
pub struct GetAll<'a, K> {
    iter: std::slice::Iter<'a, HeaderField>,
    name: K,
}

impl<'a, K> GetAll<'a, K> {
    pub(crate) fn new(fields: &'a [HeaderField], name: K) -> Self {
        Self { iter: fields.iter(), name }
    }
}

impl<'a, K: AsHeaderName> Iterator for GetAll<'a, K> {
    type Item = &'a HeaderValue;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.name.as_header_str();
        self.iter
            .find(|field| field.name().eq_ignore_ascii_case(name))
            .map(HeaderField::value)
    }
}

use crate::headers::{HeaderName, HeaderSet, HeaderValue, HeaderError, is_hop_by_hop};
use crate::http::{StatusCode, Version};

const fn is_send_sync<T: Send + Sync>() { }
const _: () = {
    is_send_sync::<HeaderSet>();
    is_send_sync::<HeaderName>();
    is_send_sync::<HeaderValue>();
};

fn value(s: &'static str) -> HeaderValue {
    HeaderValue::from_static(s)
}

#[test]
fn header_set_case_insensitive() {
    let mut set = HeaderSet::new();

    set.add("Content-Type", value("text/plain"));
    set.add("X-Custom", value("one"));

    for name in ["content-type", "CONTENT-TYPE", "Content-Type", "cOnTeNt-TyPe"] {
        assert!(set.contains(name));
        assert_eq!(set.get(name).unwrap(), "text/plain");
        assert_eq!(set.get_all(name).count(), 1);
    }

    assert!(set.get("content-length").is_none());
    assert_eq!(set.get_all("content-length").count(), 0);
}

#[test]
fn header_set_multi_value() {
    let mut set = HeaderSet::new();

    set.add("Set-Cookie", value("a=1"));
    set.add("Date", value("now"));
    set.add("set-cookie", value("b=2"));

    let all = set.get_all("SET-COOKIE").map(HeaderValue::as_str).collect::<Vec<_>>();
    assert_eq!(all, ["a=1", "b=2"]);
    assert_eq!(set.get("set-cookie").unwrap(), "a=1");
    assert_eq!(set.len(), 3);

    // Remove drops every duplicate
    assert_eq!(set.remove("Set-Cookie").unwrap(), "a=1");
    assert!(!set.contains("set-cookie"));
    assert_eq!(set.len(), 1);
    assert!(set.remove("set-cookie").is_none());
}

#[test]
fn header_set_set_replaces_in_place() {
    let mut set = HeaderSet::new();

    set.add("A", value("1"));
    set.add("Connection", value("upgrade"));
    set.add("B", value("2"));
    set.add("connection", value("keep-alive"));

    set.set("Connection", value("close"));

    let lines = set.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect::<Vec<_>>();
    assert_eq!(lines, [("A", "1"), ("Connection", "close"), ("B", "2")]);

    set.set("Server", value("h1engine"));
    assert_eq!(set.iter().last().unwrap().0.as_str(), "Server");
}

#[test]
fn header_set_flatten() {
    let mut set = HeaderSet::new();
    set.add("content-TYPE", value("text/plain"));
    set.add("X-Id", value("7"));

    let bytes = set.flatten(Version::HTTP_11, StatusCode::OK);
    assert_eq!(
        &bytes[..],
        b"HTTP/1.1 200 OK\r\ncontent-TYPE: text/plain\r\nX-Id: 7\r\n\r\n"
    );

    let bytes = HeaderSet::new().flatten(Version::HTTP_10, StatusCode::NOT_FOUND);
    assert_eq!(&bytes[..], b"HTTP/1.0 404 Not Found\r\n\r\n");
}

#[test]
fn header_tokens() {
    let mut set = HeaderSet::new();
    set.add("Connection", value("Keep-Alive, Upgrade"));
    set.add("Connection", value(",te"));

    assert!(set.has_token("connection", "keep-alive"));
    assert!(set.has_token("connection", "upgrade"));
    assert!(set.has_token("connection", "TE"));
    assert!(!set.has_token("connection", "close"));
    assert!(!set.has_token("upgrade", "websocket"));
}

#[test]
fn header_validation() {
    assert_eq!(HeaderName::from_slice("").unwrap_err(), HeaderError::Empty);
    assert_eq!(HeaderName::from_slice("Bad Name").unwrap_err(), HeaderError::Invalid);
    assert_eq!(HeaderName::from_slice("Bad:").unwrap_err(), HeaderError::Invalid);
    assert!(HeaderName::from_slice("X-Ok_1").is_ok());

    assert_eq!(HeaderValue::from_slice("a\r\nInjected: 1").unwrap_err(), HeaderError::Invalid);
    assert_eq!(HeaderValue::from_slice(" lead").unwrap_err(), HeaderError::Invalid);
    assert!(HeaderValue::from_slice("").is_ok());

    let mut set = HeaderSet::new();
    assert!(set.try_add("X-A", "b").is_ok());
    assert!(set.try_add("X-A", "b\n").is_err());
    assert_eq!(set.len(), 1);
}

#[test]
fn hop_by_hop() {
    for name in ["Connection", "keep-alive", "TRANSFER-ENCODING", "Upgrade", "TE", "Trailers"] {
        assert!(is_hop_by_hop(name), "{name}");
    }
    assert!(is_hop_by_hop("Proxy-Authorization"));
    assert!(is_hop_by_hop("Proxy-Connection"));
    assert!(!is_hop_by_hop("Proxy"));
    assert!(!is_hop_by_hop("Content-Length"));
    assert!(!is_hop_by_hop("Set-Cookie"));
}

use std::time::{SystemTime, UNIX_EPOCH};

use crate::headers::HeaderValue;

const DAY_NAMES: [&[u8; 3]; 7] = [b"Thu", b"Fri", b"Sat", b"Sun", b"Mon", b"Tue", b"Wed"];
const MONTH_NAMES: [&[u8; 3]; 12] = [
    b"Jan", b"Feb", b"Mar", b"Apr", b"May", b"Jun",
    b"Jul", b"Aug", b"Sep", b"Oct", b"Nov", b"Dec",
];

/// Last second of year 9999, the format cannot represent anything later.
const MAX_SECS: u64 = 253402300799;

/// Create [httpdate][rfc] for current time.
///
/// [rfc]: <https://datatracker.ietf.org/doc/html/rfc9110#section-5.6.7>
#[inline]
pub fn httpdate_now() -> [u8; 29] {
    httpdate(SystemTime::now())
}

/// `Date` header value for current time.
pub fn date_header_value() -> HeaderValue {
    let date = httpdate_now();
    // IMF-fixdate is always valid ASCII
    HeaderValue::from_slice(date).unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Create [httpdate][rfc] with given time.
///
/// Times before the unix epoch are clamped to the epoch, times after year 9999 are clamped to
/// the last representable second.
///
/// [rfc]: <https://datatracker.ietf.org/doc/html/rfc9110#section-5.6.7>
pub fn httpdate(v: SystemTime) -> [u8; 29] {
    let secs = v
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .min(MAX_SECS);

    let days = secs / 86400;
    let secs_of_day = secs % 86400;
    let (year, month, day) = civil_from_days(days);

    let mut buf: [u8; 29] = *b"ddd, 00 mmm 0000 00:00:00 GMT";

    buf[..3].copy_from_slice(DAY_NAMES[(days % 7) as usize]);
    write_2(&mut buf[5..7], day);
    buf[8..11].copy_from_slice(MONTH_NAMES[(month - 1) as usize]);
    write_2(&mut buf[12..14], year / 100);
    write_2(&mut buf[14..16], year % 100);
    write_2(&mut buf[17..19], secs_of_day / 3600);
    write_2(&mut buf[20..22], secs_of_day % 3600 / 60);
    write_2(&mut buf[23..25], secs_of_day % 60);

    buf
}

fn write_2(dst: &mut [u8], n: u64) {
    dst[0] = b'0' + (n / 10) as u8;
    dst[1] = b'0' + (n % 10) as u8;
}

/// Days since epoch into `(year, month, day)`, proleptic gregorian calendar.
///
/// <http://howardhinnant.github.io/date_algorithms.html#civil_from_days>
fn civil_from_days(days: u64) -> (u64, u64, u64) {
    // shift epoch to 0000-03-01
    let z = days + 719468;
    let era = z / 146097;
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + (month <= 2) as u64;
    (year, month, day)
}

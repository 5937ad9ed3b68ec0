//! Request date resolution.

use {
    crate::{constants::*, credential::Credential, error::DenyReason, request::IncomingRequest},
    chrono::{
        naive::{NaiveDate, NaiveDateTime, NaiveTime},
        offset::{FixedOffset, TimeZone, Utc},
        DateTime,
    },
    lazy_static::lazy_static,
    log::trace,
    regex::Regex,
    std::str::FromStr,
};

lazy_static! {
    /// ISO 8601 timestamp format, basic or extended.
    static ref ISO_8601_REGEX: Regex = Regex::new(
        r"(?x)^
        (?P<year>\d{4})-?
        (?P<month>0[1-9]|1[0-2])-?
        (?P<day>0[1-9]|[12][0-9]|3[01])
        T
        (?P<hour>[01][0-9]|2[0-3]):?
        (?P<minute>[0-5][0-9]):?
        (?P<second>[0-5][0-9])
        (?P<offset>[-+][01][0-9]:?[0-5][0-9]|Z)$").unwrap();
}

pub(crate) trait ParseISO8601: Sized {
    fn parse_from_iso8601(s: &str) -> Option<Self>;
}

impl ParseISO8601 for DateTime<Utc> {
    fn parse_from_iso8601(s: &str) -> Option<DateTime<Utc>> {
        let cap = ISO_8601_REGEX.captures(s)?;
        let field = |name: &str| cap.name(name).and_then(|m| u32::from_str(m.as_str()).ok());

        let year = i32::from_str(cap.name("year")?.as_str()).ok()?;
        let naive_date = NaiveDate::from_ymd_opt(year, field("month")?, field("day")?)?;
        let naive_time = NaiveTime::from_hms_opt(field("hour")?, field("minute")?, field("second")?)?;
        let naive_dt = NaiveDateTime::new(naive_date, naive_time);

        let offset_str = cap.name("offset")?.as_str();
        let offset_secs = if offset_str == "Z" {
            0
        } else {
            // Must be [+-]HH[:]MM at this point
            let offset_condensed = offset_str.replace(':', "");
            let (sign_str, hm) = offset_condensed.split_at(1);
            let (hour_off_str, minute_off_str) = hm.split_at(2);
            let sign = if sign_str == "-" {
                -1
            } else {
                1
            };
            sign * (i32::from_str(hour_off_str).ok()? * 3600 + i32::from_str(minute_off_str).ok()? * 60)
        };

        let offset = FixedOffset::east_opt(offset_secs)?;
        Some(offset.from_local_datetime(&naive_dt).single()?.with_timezone(&Utc))
    }
}

/// Parse a `Date` header, which may be ISO 8601 or an RFC 2822 HTTP-date.
fn parse_date_header(s: &str) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::parse_from_iso8601(s)
        .or_else(|| DateTime::parse_from_rfc2822(s).ok().map(|dt| dt.with_timezone(&Utc)))
}

/// Determine the authoritative request date and make sure it falls on the credential scope date.
///
/// An explicit `X-Amz-Date` value (header or query, already chosen by field extraction) is
/// preferred; otherwise the `Date` header is used.
pub(crate) fn resolve_date(
    date_token: &str,
    request: &IncomingRequest,
    credential: &Credential,
) -> Result<DateTime<Utc>, DenyReason> {
    let date_token = date_token.trim();
    let timestamp = if !date_token.is_empty() {
        DateTime::<Utc>::parse_from_iso8601(date_token)
            .ok_or_else(|| DenyReason::MalformedDate(date_token.to_string()))?
    } else {
        let date_header = request.header(HDR_DATE).unwrap_or_default();
        let date_header = date_header.trim();
        if date_header.is_empty() {
            return Err(DenyReason::MissingDate);
        }
        trace!("resolve_date: falling back to Date header '{}'", date_header);
        parse_date_header(date_header).ok_or_else(|| DenyReason::MalformedDate(date_header.to_string()))?
    };

    let request_date = timestamp.format(ISO8601_DATE_FORMAT).to_string();
    if request_date != credential.scope_date() {
        return Err(DenyReason::DateScopeMismatch {
            scope_date: credential.scope_date().to_string(),
            request_date,
        });
    }

    Ok(timestamp)
}

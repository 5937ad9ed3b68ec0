use {
    crate::{authenticator::AuthOptions, error::DenyReason},
    chrono::Duration,
    std::fmt::{Display, Formatter, Result as FmtResult},
};

/// The validity window of a signature, in seconds.
///
/// For presigned URLs this comes from `X-Amz-Expires`; for header authentication it is fixed.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ExpiryWindow(i64);

impl ExpiryWindow {
    /// Parse an expiry as a base-10 integer and check it against the bounds in `options`. Both
    /// bounds are exclusive. Returns `None` if the value is malformed or out of range.
    pub fn parse(expiry: &str, options: &AuthOptions) -> Option<Self> {
        Self::validate(expiry, options).ok()
    }

    pub(crate) fn validate(expiry: &str, options: &AuthOptions) -> Result<Self, DenyReason> {
        let digits = expiry.strip_prefix('-').unwrap_or(expiry);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DenyReason::MalformedExpiry(expiry.to_string()));
        }

        let seconds = expiry.parse::<i64>().map_err(|_| DenyReason::MalformedExpiry(expiry.to_string()))?;

        if seconds <= options.min_expiry_seconds_exclusive || seconds >= options.max_expiry_seconds_exclusive {
            return Err(DenyReason::ExpiryOutOfRange(seconds));
        }

        Ok(Self(seconds))
    }

    /// The window length in seconds.
    #[inline]
    pub fn as_secs(&self) -> i64 {
        self.0
    }

    /// The window length as a [`Duration`].
    #[inline]
    pub fn as_duration(&self) -> Duration {
        Duration::seconds(self.0)
    }
}

impl Display for ExpiryWindow {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}s", self.0)
    }
}

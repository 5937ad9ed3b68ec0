use {
    crate::error::DenyReason,
    std::fmt::{Display, Formatter, Result as FmtResult},
};

/// The parts of a SigV4 credential that the rest of the request flow needs.
///
/// A credential has the form `keyid/date/region/service/aws4_request`. Only the access key, scope
/// date, and region are kept; the service and terminator are checked by the signature verifier.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Credential {
    access_key_id: String,
    scope_date: String,
    region: String,
}

impl Credential {
    /// Parse a credential string.
    ///
    /// At least three non-empty `/`-delimited components are required; anything past the region
    /// is ignored. Returns `None` if the credential is malformed.
    pub fn parse(credential: &str) -> Option<Self> {
        Self::validate(credential).ok()
    }

    pub(crate) fn validate(credential: &str) -> Result<Self, DenyReason> {
        let mut parts = credential.split('/');
        let mut next = || parts.next().filter(|part| !part.is_empty()).map(str::to_string);

        match (next(), next(), next()) {
            (Some(access_key_id), Some(scope_date), Some(region)) => Ok(Self {
                access_key_id,
                scope_date,
                region,
            }),
            _ => Err(DenyReason::MalformedCredential(credential.to_string())),
        }
    }

    /// The access key id.
    #[inline]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// The credential scope date, in `YYYYMMDD` format.
    #[inline]
    pub fn scope_date(&self) -> &str {
        &self.scope_date
    }

    /// The credential scope region.
    #[inline]
    pub fn region(&self) -> &str {
        &self.region
    }
}

impl Display for Credential {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}/{}/{}", self.access_key_id, self.scope_date, self.region)
    }
}

#[cfg(test)]
mod tests {
    use {super::Credential, crate::error::DenyReason};

    #[test_log::test]
    fn test_full_credential() {
        let cred = Credential::parse("AKIDEXAMPLE/20240615/us-east-1/s3/aws4_request").unwrap();
        assert_eq!(cred.access_key_id(), "AKIDEXAMPLE");
        assert_eq!(cred.scope_date(), "20240615");
        assert_eq!(cred.region(), "us-east-1");
        assert_eq!(cred.to_string(), "AKIDEXAMPLE/20240615/us-east-1");
    }

    #[test_log::test]
    fn test_extra_components_ignored() {
        let cred = Credential::parse("AKIDEXAMPLE/20240615/us-east-1").unwrap();
        assert_eq!(cred.region(), "us-east-1");

        let cred = Credential::parse("AKIDEXAMPLE/20240615/us-east-1/s3/aws4_request/extra").unwrap();
        assert_eq!(cred.access_key_id(), "AKIDEXAMPLE");
    }

    #[test_log::test]
    fn test_too_few_components() {
        for bad in ["", "AKIDEXAMPLE", "AKIDEXAMPLE/20240615", "AKIDEXAMPLE/20240615/", "/20240615/us-east-1"] {
            assert!(Credential::parse(bad).is_none());
            assert_eq!(Credential::validate(bad).unwrap_err(), DenyReason::MalformedCredential(bad.to_string()));
        }
    }
}

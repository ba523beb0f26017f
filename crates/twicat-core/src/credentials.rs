//! Provider credentials
//!
//! Both values are entered interactively once per run and only ever live in
//! memory. The auth token is wiped on drop and never shows up in `Debug`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use zeroize::Zeroizing;

use crate::error::{CoreError, Result};

static ACCOUNT_SID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*AC[0-9a-f]{32}\s*$").expect("account sid pattern"));

static AUTH_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[0-9a-f]{32}\s*$").expect("auth token pattern"));

/// Account identifier (`AC` followed by 32 lowercase hex digits)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSid(String);

impl AccountSid {
    /// Validate and trim user input
    pub fn parse(input: &str) -> Result<Self> {
        if !ACCOUNT_SID_RE.is_match(input) {
            return Err(CoreError::InvalidAccountSid);
        }
        Ok(Self(input.trim().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountSid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Secret auth token (32 lowercase hex digits), zeroized on drop
#[derive(Clone)]
pub struct AuthToken(Zeroizing<String>);

impl AuthToken {
    /// Validate and trim user input
    pub fn parse(input: &str) -> Result<Self> {
        if !AUTH_TOKEN_RE.is_match(input) {
            return Err(CoreError::InvalidAuthToken);
        }
        Ok(Self(Zeroizing::new(input.trim().to_string())))
    }

    /// Get the secret value
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(****)")
    }
}

/// Account SID and auth token pair used for HTTP Basic Auth
#[derive(Debug, Clone)]
pub struct Credentials {
    pub account_sid: AccountSid,
    pub auth_token: AuthToken,
}

impl Credentials {
    pub fn new(account_sid: AccountSid, auth_token: AuthToken) -> Self {
        Self {
            account_sid,
            auth_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SID: &str = "AC0123456789abcdef0123456789abcdef";
    const TOKEN: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_account_sid_valid() {
        let sid = AccountSid::parse(SID).unwrap();
        assert_eq!(sid.as_str(), SID);
    }

    #[test]
    fn test_account_sid_is_trimmed() {
        let sid = AccountSid::parse(&format!("  {}\t\n", SID)).unwrap();
        assert_eq!(sid.as_str(), SID);
    }

    #[test]
    fn test_account_sid_rejects_bad_input() {
        let cases = [
            "",
            "AC",
            "AC0123456789abcdef0123456789abcde",    // 31 hex
            "AC0123456789abcdef0123456789abcdef0",  // 33 hex
            "AC0123456789ABCDEF0123456789ABCDEF",   // uppercase hex
            "ac0123456789abcdef0123456789abcdef",   // lowercase prefix
            "XAC0123456789abcdef0123456789abcdef",
            "AC0123456789abcdef0123 56789abcdef",
            "0123456789abcdef0123456789abcdef",
        ];
        for case in cases {
            assert!(
                matches!(AccountSid::parse(case), Err(CoreError::InvalidAccountSid)),
                "accepted {:?}",
                case
            );
        }
    }

    #[test]
    fn test_auth_token_valid_and_trimmed() {
        let token = AuthToken::parse(&format!(" {} ", TOKEN)).unwrap();
        assert_eq!(token.expose(), TOKEN);
    }

    #[test]
    fn test_auth_token_rejects_bad_input() {
        let cases = [
            "",
            "0123456789abcdef0123456789abcde",
            "0123456789abcdef0123456789abcdef0",
            "0123456789ABCDEF0123456789abcdef",
            "g123456789abcdef0123456789abcdef",
            SID,
        ];
        for case in cases {
            assert!(
                matches!(AuthToken::parse(case), Err(CoreError::InvalidAuthToken)),
                "accepted {:?}",
                case
            );
        }
    }

    #[test]
    fn test_auth_token_debug_is_redacted() {
        let token = AuthToken::parse(TOKEN).unwrap();
        let debug = format!("{:?}", token);
        assert!(!debug.contains(TOKEN));

        let creds = Credentials::new(AccountSid::parse(SID).unwrap(), token);
        assert!(!format!("{:?}", creds).contains(TOKEN));
    }
}

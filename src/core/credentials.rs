//! Playlist URL credential parsing and provider endpoint construction.
//!
//! A subscriber playlist link (`get.php?username=U&password=P&type=m3u`)
//! carries the account credentials in its query string. The same host
//! answers the Xtream-style `player_api.php` account introspection call.

use std::fmt;

use serde::Serialize;
use url::Url;

use crate::error::ExtractError;

/// Fixed introspection path on the provider host.
pub const PLAYER_API_PATH: &str = "player_api.php";

/// Action that lists live channel categories (bouquets).
pub const ACTION_LIVE_CATEGORIES: &str = "get_live_categories";

/// Transport scheme of the playlist URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials recovered from a playlist URL.
///
/// `host` keeps an explicit port when the URL carried one, so the
/// introspection call reaches the same server as the playlist.
#[derive(Clone, PartialEq, Eq)]
pub struct PlaylistCredentials {
    pub scheme: Scheme,
    pub host: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for PlaylistCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaylistCredentials")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl PlaylistCredentials {
    /// Parse a subscriber playlist URL.
    ///
    /// Extra query parameters (`type`, `output`, ...) are ignored. The first
    /// occurrence of `username` and `password` wins.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::InvalidUrl`] when the input is not an absolute
    ///   http(s) URL with a host.
    /// - [`ExtractError::CredentialsMissing`] when `username` or `password`
    ///   is absent or empty.
    pub fn parse(raw_url: &str) -> Result<Self, ExtractError> {
        let trimmed = raw_url.trim();
        let invalid = |reason: String| ExtractError::InvalidUrl {
            input: trimmed.to_string(),
            reason,
        };

        let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;

        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => return Err(invalid(format!("unsupported scheme '{other}'"))),
        };

        let host = match url.host_str() {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => return Err(invalid("missing host".to_string())),
        };
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host,
        };

        let query_value = |key: &str| {
            url.query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
                .filter(|v| !v.is_empty())
        };

        let username =
            query_value("username").ok_or(ExtractError::CredentialsMissing { missing: "username" })?;
        let password =
            query_value("password").ok_or(ExtractError::CredentialsMissing { missing: "password" })?;

        Ok(Self {
            scheme,
            host,
            username,
            password,
        })
    }

    /// Account introspection endpoint:
    /// `{scheme}://{host}/player_api.php?username=U&password=P`.
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.player_api(&urlencoding::encode(&self.password), None)
    }

    /// [`Self::endpoint`] with the password masked, for display.
    #[must_use]
    pub fn redacted_endpoint(&self) -> String {
        self.player_api(&self.masked_password(), None)
    }

    /// Live category listing on the same provider.
    #[must_use]
    pub fn categories_endpoint(&self) -> String {
        self.player_api(&urlencoding::encode(&self.password), Some(ACTION_LIVE_CATEGORIES))
    }

    /// `password` is inserted as given, already encoded or masked.
    fn player_api(&self, password: &str, action: Option<&str>) -> String {
        let mut url = format!(
            "{}://{}/{PLAYER_API_PATH}?username={}&password={}",
            self.scheme,
            self.host,
            urlencoding::encode(&self.username),
            password,
        );
        if let Some(action) = action {
            url.push_str("&action=");
            url.push_str(action);
        }
        url
    }

    /// Password with all but the first character masked.
    #[must_use]
    pub fn masked_password(&self) -> String {
        let mut chars = self.password.chars();
        chars.next().map_or_else(String::new, |first| {
            format!("{first}{}", "*".repeat(chars.count()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "https://iptv.example.com:8080/get.php?username=john&password=secret123&type=m3u";

    #[test]
    fn parses_sample_playlist_url() {
        let creds = PlaylistCredentials::parse(SAMPLE).unwrap();
        assert_eq!(creds.scheme, Scheme::Https);
        assert_eq!(creds.host, "iptv.example.com:8080");
        assert_eq!(creds.username, "john");
        assert_eq!(creds.password, "secret123");
    }

    #[test]
    fn default_port_is_not_added_to_host() {
        let creds =
            PlaylistCredentials::parse("http://line.example.net/get.php?username=a&password=b")
                .unwrap();
        assert_eq!(creds.scheme, Scheme::Http);
        assert_eq!(creds.host, "line.example.net");
    }

    #[test]
    fn query_order_and_extra_params_are_ignored() {
        let creds = PlaylistCredentials::parse(
            "http://h.example/get.php?type=m3u_plus&output=ts&password=p%40ss&username=u%20x",
        )
        .unwrap();
        assert_eq!(creds.username, "u x");
        assert_eq!(creds.password, "p@ss");
    }

    #[test]
    fn missing_username_is_credentials_missing() {
        let err = PlaylistCredentials::parse("http://h.example/get.php?password=p").unwrap_err();
        assert_eq!(err, ExtractError::CredentialsMissing { missing: "username" });
    }

    #[test]
    fn empty_password_is_credentials_missing() {
        let err =
            PlaylistCredentials::parse("http://h.example/get.php?username=u&password=").unwrap_err();
        assert_eq!(err, ExtractError::CredentialsMissing { missing: "password" });
    }

    #[test]
    fn garbage_is_invalid_url() {
        for input in ["", "not a url", "/get.php?username=u&password=p", "http://"] {
            let err = PlaylistCredentials::parse(input).unwrap_err();
            assert!(
                matches!(err, ExtractError::InvalidUrl { .. }),
                "{input:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn non_http_scheme_is_invalid_url() {
        let err =
            PlaylistCredentials::parse("ftp://h.example/get.php?username=u&password=p").unwrap_err();
        match err {
            ExtractError::InvalidUrl { reason, .. } => assert!(reason.contains("ftp")),
            other => panic!("expected InvalidUrl, got {other:?}"),
        }
    }

    #[test]
    fn endpoint_uses_player_api_path() {
        let creds = PlaylistCredentials::parse(SAMPLE).unwrap();
        assert_eq!(
            creds.endpoint(),
            "https://iptv.example.com:8080/player_api.php?username=john&password=secret123"
        );
    }

    #[test]
    fn categories_endpoint_appends_action() {
        let creds = PlaylistCredentials::parse(SAMPLE).unwrap();
        assert_eq!(
            creds.categories_endpoint(),
            "https://iptv.example.com:8080/player_api.php?username=john&password=secret123&action=get_live_categories"
        );
    }

    #[test]
    fn debug_output_hides_password() {
        let creds = PlaylistCredentials::parse(SAMPLE).unwrap();
        let debug = format!("{creds:?}");
        assert!(!debug.contains("secret123"));
        assert_eq!(creds.masked_password(), "s********");
        assert_eq!(
            creds.redacted_endpoint(),
            "https://iptv.example.com:8080/player_api.php?username=john&password=s********"
        );
    }
}

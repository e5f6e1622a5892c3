// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! OAuth 2.0 credentials for installed applications.
//!
//! Token lifecycle:
//! - A cached access token is reused while it has more than a minute left.
//! - An expired token is refreshed with the cached refresh token.
//! - Without a usable refresh token, the user is sent through the consent screen and the
//!   authorization code is received on a loopback redirect (`http://127.0.0.1:<port>/`).
//!
//! The cache uses the same JSON shape as Google's "authorized user" files, so an existing
//! `token.json` written by other Google client libraries is picked up as is.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jiff::{SignedDuration, Timestamp};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::error::GcalError;
use crate::types::AccessToken;

/// Full read/write access to calendars.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens closer than this to their expiry are treated as expired.
const EXPIRY_SKEW: SignedDuration = SignedDuration::from_secs(60);

/// How long to wait for the user to finish the consent screen.
const CONSENT_TIMEOUT: Duration = Duration::from_secs(300);

/// OAuth client identity, as downloaded from the Google Cloud console.
#[derive(Clone, Deserialize)]
pub struct ClientSecrets {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Authorization endpoint.
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    /// Token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ClientSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecrets")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ClientSecrets {
    /// Parses a `credentials.json` document (`{"installed": {...}}` or `{"web": {...}}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or holds neither client type.
    pub fn from_json(json: &str) -> Result<Self, GcalError> {
        #[derive(Deserialize)]
        struct SecretsFile {
            installed: Option<ClientSecrets>,
            web: Option<ClientSecrets>,
        }

        let file: SecretsFile = serde_json::from_str(json)?;
        file.installed.or(file.web).ok_or_else(|| {
            let message = "Client secrets must contain an \"installed\" or \"web\" client";
            GcalError::Config(message.into())
        })
    }

    /// Reads and parses a `credentials.json` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, GcalError> {
        let json = fs::read_to_string(path).await.map_err(|e| {
            GcalError::Config(format!(
                "Failed to read client secrets at {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&json)
    }
}

/// Cached user credential.
///
/// `Debug` is manually implemented to redact secrets.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthorizedUser {
    /// Current access token.
    #[serde(default)]
    pub token: Option<String>,
    /// Long-lived refresh token.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token endpoint used for refreshing.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// OAuth client id the tokens were issued to.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Granted scopes.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Expiry of `token`; `None` means it never expires.
    #[serde(default)]
    pub expiry: Option<Timestamp>,
}

impl fmt::Debug for AuthorizedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedUser")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("token_uri", &self.token_uri)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl AuthorizedUser {
    /// Builds a credential from a fresh authorization-code grant.
    #[must_use]
    pub fn from_grant(
        secrets: &ClientSecrets,
        scopes: &[String],
        resp: TokenResponse,
        now: Timestamp,
    ) -> Self {
        let mut user = Self {
            token: None,
            refresh_token: None,
            token_uri: secrets.token_uri.clone(),
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            scopes: scopes.to_vec(),
            expiry: None,
        };
        user.apply(resp, now);
        user
    }

    /// Returns the access token if it is still usable at `now`.
    #[must_use]
    pub fn access_token(&self, now: Timestamp) -> Option<AccessToken> {
        let token = self.token.as_ref()?;
        let fresh = match self.expiry {
            Some(expiry) => now.checked_add(EXPIRY_SKEW).is_ok_and(|t| t < expiry),
            None => true,
        };
        fresh.then(|| AccessToken::new(token.clone()))
    }

    /// Stores the tokens of a token-endpoint response, keeping the old refresh token unless a
    /// new one is issued.
    pub fn apply(&mut self, resp: TokenResponse, now: Timestamp) {
        self.expiry = resp
            .expires_in
            .and_then(|secs| now.checked_add(SignedDuration::from_secs(secs)).ok());
        self.token = Some(resp.access_token);
        if let Some(refresh_token) = resp.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
    }

    fn client_secrets(&self) -> ClientSecrets {
        ClientSecrets {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            auth_uri: default_auth_uri(),
            token_uri: self.token_uri.clone(),
        }
    }
}

/// Response from the token endpoint (both code exchange and refresh).
///
/// `Debug` is manually implemented to redact secrets.
#[derive(Deserialize)]
pub struct TokenResponse {
    /// New access token.
    pub access_token: String,
    /// Lifetime of `access_token` in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Refresh token; only sent on first consent or rotation.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Space-separated granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("scope", &self.scope)
            .finish()
    }
}

/// Persistent file-based store for an [`AuthorizedUser`].
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    /// Creates a cache backed by `path`. Nothing is read until [`TokenCache::load`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the cache file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cached credential, `None` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid credential.
    pub async fn load(&self) -> Result<Option<AuthorizedUser>, GcalError> {
        let json = match fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Writes the credential, creating the parent directory if needed.
    ///
    /// On Unix the file is left with mode `0o600`, also when it already existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn store(&self, user: &AuthorizedUser) -> Result<(), GcalError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(user)?;
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&self.path).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // `mode` only applies on creation.
            let permissions = std::fs::Permissions::from_mode(0o600);
            file.set_permissions(permissions).await?;
        }
        file.write_all(json.as_bytes()).await?;
        file.flush().await?;
        tracing::debug!(path = %self.path.display(), "token cache written");
        Ok(())
    }
}

/// Talks to the OAuth endpoints of one client.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    secrets: ClientSecrets,
}

impl OAuthClient {
    /// Creates a new OAuth client.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn new(secrets: ClientSecrets) -> Result<Self, GcalError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http, secrets })
    }

    /// The client identity.
    #[must_use]
    pub fn secrets(&self) -> &ClientSecrets {
        &self.secrets
    }

    /// Builds the consent-screen URL the user must visit.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured `auth_uri` is not a valid URL.
    pub fn authorize_url(
        &self,
        redirect_uri: &str,
        state: &str,
        scopes: &[String],
    ) -> Result<Url, GcalError> {
        let scope = scopes.join(" ");
        Url::parse_with_params(
            &self.secrets.auth_uri,
            [
                ("client_id", self.secrets.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )
        .map_err(|e| GcalError::Config(format!("Invalid auth_uri: {e}")))
    }

    /// Exchanges an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns [`GcalError::Auth`] if the endpoint rejects the code.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, GcalError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", &self.secrets.client_id),
            ("client_secret", &self.secrets.client_secret),
        ])
        .await
    }

    /// Obtains a new access token with a refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`GcalError::Auth`] if the refresh token is rejected.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, GcalError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", &self.secrets.client_id),
            ("client_secret", &self.secrets.client_secret),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, GcalError> {
        #[derive(Deserialize)]
        struct OAuthErrorResponse {
            error: String,
            #[serde(default)]
            error_description: Option<String>,
        }

        let resp = self
            .http
            .post(&self.secrets.token_uri)
            .form(form)
            .send()
            .await
            .map_err(|e| GcalError::Auth(format!("Token request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GcalError::Auth(format!("Reading token response: {e}")))?;

        if !status.is_success() {
            let reason = match serde_json::from_str::<OAuthErrorResponse>(&body) {
                Ok(a) => match a.error_description {
                    Some(desc) => format!("{}: {desc}", a.error),
                    None => a.error,
                },
                Err(_) => body,
            };
            return Err(GcalError::Auth(format!(
                "Token endpoint returned HTTP {}: {reason}",
                status.as_u16()
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| GcalError::Auth(format!("Parsing token response: {e}")))
    }
}

/// Installed-application credential flow backed by a [`TokenCache`].
#[derive(Debug, Clone)]
pub struct InstalledAppFlow {
    secrets_path: PathBuf,
    cache: TokenCache,
    scopes: Vec<String>,
}

impl InstalledAppFlow {
    /// Creates a flow reading client secrets from `secrets_path` when consent is needed.
    #[must_use]
    pub fn new(secrets_path: impl Into<PathBuf>, cache: TokenCache) -> Self {
        Self {
            secrets_path: secrets_path.into(),
            cache,
            scopes: vec![CALENDAR_SCOPE.to_string()],
        }
    }

    /// Overrides the requested scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Returns a usable access token, refreshing or asking for consent as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if no credential can be obtained.
    #[tracing::instrument(skip(self), fields(cache = %self.cache.path().display()))]
    pub async fn valid_token(&self) -> Result<AccessToken, GcalError> {
        let now = Timestamp::now();
        let cached = match self.cache.load().await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable token cache");
                None
            }
        };

        if let Some(user) = &cached
            && let Some(token) = user.access_token(now)
        {
            tracing::debug!("using cached access token");
            return Ok(token);
        }

        let refreshed = match cached {
            Some(user) if user.refresh_token.is_some() => self.refresh(user, now).await,
            _ => None,
        };

        let user = match refreshed {
            Some(user) => user,
            None => self.consent(now).await?,
        };
        self.cache.store(&user).await?;

        user.access_token(now)
            .ok_or_else(|| GcalError::Auth("Token endpoint returned an expired token".into()))
    }

    async fn refresh(&self, mut user: AuthorizedUser, now: Timestamp) -> Option<AuthorizedUser> {
        let refresh_token = user.refresh_token.clone()?;
        tracing::info!("access token expired, refreshing");
        let oauth = match OAuthClient::new(user.client_secrets()) {
            Ok(oauth) => oauth,
            Err(e) => {
                tracing::warn!(error = %e, "cannot build OAuth client for refresh");
                return None;
            }
        };

        match oauth.refresh(&refresh_token).await {
            Ok(resp) => {
                user.apply(resp, now);
                Some(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "refresh failed, falling back to consent");
                None
            }
        }
    }

    async fn consent(&self, now: Timestamp) -> Result<AuthorizedUser, GcalError> {
        let secrets = ClientSecrets::load(&self.secrets_path).await?;
        let oauth = OAuthClient::new(secrets)?;

        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let redirect_uri = format!("http://127.0.0.1:{}/", listener.local_addr()?.port());
        let state = uuid::Uuid::new_v4().simple().to_string();
        let url = oauth.authorize_url(&redirect_uri, &state, &self.scopes)?;

        eprintln!();
        eprintln!("To authorize access to your calendar, visit:");
        eprintln!("  {url}");
        eprintln!();
        eprintln!("Waiting for authorization...");

        let code = tokio::time::timeout(CONSENT_TIMEOUT, wait_for_redirect(&listener, &state))
            .await
            .map_err(|_| GcalError::Auth("Timed out waiting for authorization".into()))??;

        let resp = oauth.exchange_code(&code, &redirect_uri).await?;
        if resp.refresh_token.is_none() {
            tracing::warn!("no refresh token granted, consent will be needed again on expiry");
        }
        Ok(AuthorizedUser::from_grant(
            oauth.secrets(),
            &self.scopes,
            resp,
            now,
        ))
    }
}

/// Serves the loopback redirect until a request carrying `code` or `error` arrives.
///
/// Requests without either (a browser asking for `/favicon.ico`, say) get a 404 and are
/// skipped.
///
/// # Errors
///
/// Returns [`GcalError::Auth`] if consent was denied or `state` does not match, or an I/O
/// error if the socket fails.
pub async fn wait_for_redirect(
    listener: &TcpListener,
    expected_state: &str,
) -> Result<String, GcalError> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let mut reader = BufReader::new(stream);

        let mut request_line = String::new();
        reader.read_line(&mut request_line).await?;
        loop {
            let mut header = String::new();
            let n = reader.read_line(&mut header).await?;
            if n == 0 || header.trim().is_empty() {
                break;
            }
        }

        let target = request_line.split_whitespace().nth(1).unwrap_or("/");
        tracing::debug!(%peer, target, "redirect request");
        let params: HashMap<String, String> = Url::parse(&format!("http://127.0.0.1{target}"))
            .map(|url| url.query_pairs().into_owned().collect())
            .unwrap_or_default();

        let outcome = if let Some(error) = params.get("error") {
            Some(Err(GcalError::Auth(format!("Authorization denied: {error}"))))
        } else if let Some(code) = params.get("code") {
            if params.get("state").map(String::as_str) == Some(expected_state) {
                Some(Ok(code.clone()))
            } else {
                Some(Err(GcalError::Auth("Authorization state mismatch".into())))
            }
        } else {
            None
        };

        let (status, body) = match &outcome {
            Some(Ok(_)) => ("200 OK", "Authorization complete. You may close this window."),
            Some(Err(_)) => ("400 Bad Request", "Authorization failed. See the terminal."),
            None => ("404 Not Found", "Not found."),
        };
        let mut stream = reader.into_inner();
        let response = format!(
            "HTTP/1.1 {status}\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await?;
        let _ = stream.shutdown().await;

        if let Some(outcome) = outcome {
            return outcome;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(token: Option<&str>, expiry: Option<Timestamp>) -> AuthorizedUser {
        AuthorizedUser {
            token: token.map(str::to_string),
            refresh_token: Some("1//refresh".to_string()),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            scopes: vec![CALENDAR_SCOPE.to_string()],
            expiry,
        }
    }

    #[test]
    fn token_valid_until_skew() {
        let now: Timestamp = "2024-05-01T12:00:00Z".parse().unwrap();
        let expiry = now.checked_add(SignedDuration::from_secs(600)).unwrap();
        let user = user(Some("ya29.a"), Some(expiry));
        assert!(user.access_token(now).is_some());

        let almost = expiry.checked_sub(SignedDuration::from_secs(30)).unwrap();
        assert!(user.access_token(almost).is_none());
    }

    #[test]
    fn token_without_expiry_never_expires() {
        let now: Timestamp = "2099-01-01T00:00:00Z".parse().unwrap();
        assert!(user(Some("ya29.a"), None).access_token(now).is_some());
        assert!(user(None, None).access_token(now).is_none());
    }

    #[test]
    fn apply_keeps_refresh_token_when_not_rotated() {
        let now: Timestamp = "2024-05-01T12:00:00Z".parse().unwrap();
        let mut user = user(None, None);
        user.apply(
            TokenResponse {
                access_token: "ya29.new".to_string(),
                expires_in: Some(3599),
                refresh_token: None,
                scope: None,
            },
            now,
        );
        assert_eq!(user.token.as_deref(), Some("ya29.new"));
        assert_eq!(user.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(
            user.expiry,
            Some("2024-05-01T12:59:59Z".parse().unwrap())
        );
    }

    #[test]
    fn parses_authorized_user_file_from_other_clients() {
        let json = r#"{
            "token": "ya29.a0",
            "refresh_token": "1//0g",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "123.apps.googleusercontent.com",
            "client_secret": "GOCSPX-x",
            "scopes": ["https://www.googleapis.com/auth/calendar"],
            "universe_domain": "googleapis.com",
            "account": "",
            "expiry": "2024-05-01T12:34:56.123456Z"
        }"#;
        let user: AuthorizedUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.client_id, "123.apps.googleusercontent.com");
        assert_eq!(
            user.expiry,
            Some("2024-05-01T12:34:56.123456Z".parse().unwrap())
        );
    }

    #[test]
    fn parses_installed_and_web_secrets() {
        let installed = r#"{"installed":{"client_id":"a","client_secret":"b",
            "redirect_uris":["http://localhost"]}}"#;
        let secrets = ClientSecrets::from_json(installed).unwrap();
        assert_eq!(secrets.client_id, "a");
        assert_eq!(secrets.token_uri, DEFAULT_TOKEN_URI);

        let web = r#"{"web":{"client_id":"c","client_secret":"d","token_uri":"http://t/token"}}"#;
        let secrets = ClientSecrets::from_json(web).unwrap();
        assert_eq!(secrets.client_id, "c");
        assert_eq!(secrets.token_uri, "http://t/token");

        assert!(matches!(
            ClientSecrets::from_json("{}"),
            Err(GcalError::Config(_))
        ));
    }

    #[test]
    fn authorize_url_requests_offline_access() {
        let json = r#"{"installed":{"client_id":"cid","client_secret":"s"}}"#;
        let secrets = ClientSecrets::from_json(json).unwrap();
        let oauth = OAuthClient::new(secrets).unwrap();
        let url = oauth
            .authorize_url("http://127.0.0.1:8080/", "xyz", &[CALENDAR_SCOPE.to_string()])
            .unwrap();

        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "cid");
        assert_eq!(params["redirect_uri"], "http://127.0.0.1:8080/");
        assert_eq!(params["scope"], CALENDAR_SCOPE);
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["state"], "xyz");
        assert!(url.as_str().starts_with(DEFAULT_AUTH_URI));
    }

    #[test]
    fn debug_output_is_redacted() {
        let out = format!("{:?}", user(Some("ya29.secret-token"), None));
        assert!(!out.contains("secret-token"));
        assert!(!out.contains("1//refresh"));
    }
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use async_trait::async_trait;
use lunarcal_gcal::{AccessToken, InstalledAppFlow, TokenCache};

use crate::error::AuthError;

/// A credential accepted by the remote calendar.
#[derive(Debug, Clone)]
pub struct Credential {
    token: AccessToken,
}

impl Credential {
    /// Wraps a bearer access token.
    #[must_use]
    pub const fn new(token: AccessToken) -> Self {
        Self { token }
    }

    /// The bearer access token.
    #[must_use]
    pub const fn access_token(&self) -> &AccessToken {
        &self.token
    }

    /// Consumes the credential, returning the access token.
    #[must_use]
    pub fn into_access_token(self) -> AccessToken {
        self.token
    }
}

/// Source of valid credentials.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns a credential that is valid now, refreshing or re-authorizing as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if no credential can be obtained. The run cannot proceed.
    async fn valid_credential(&self) -> Result<Credential, AuthError>;
}

/// OAuth for installed applications: cached token, refresh, then interactive consent.
#[derive(Debug)]
pub struct InstalledAppAuth {
    flow: InstalledAppFlow,
}

impl InstalledAppAuth {
    /// Uses the client secrets at `credentials_path` and caches tokens at `token_path`.
    pub fn new(credentials_path: impl Into<PathBuf>, token_path: impl Into<PathBuf>) -> Self {
        let cache = TokenCache::new(token_path);
        Self {
            flow: InstalledAppFlow::new(credentials_path, cache),
        }
    }
}

#[async_trait]
impl CredentialProvider for InstalledAppAuth {
    async fn valid_credential(&self) -> Result<Credential, AuthError> {
        let token = self.flow.valid_token().await?;
        Ok(Credential::new(token))
    }
}

//! No-op authentication for demo deployments.
//!
//! Mirrors a kiosk setup where the staff terminal is physically trusted:
//! every request is treated as the anonymous staff identity.

use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

#[derive(Debug, Default)]
pub struct NoneAuthenticator;

impl NoneAuthenticator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Authenticator for NoneAuthenticator {
    async fn authenticate(&self, _request: &AuthRequest) -> Result<Identity, AuthError> {
        Ok(Identity::anonymous())
    }

    fn method_name(&self) -> &'static str {
        "none"
    }
}

//! The write-once authority.
//!
//! The first successful `set` fixes the authority for the lifetime of the
//! state. Authority-only operations fail with [`AuthorityError::NotVerified`]
//! until then, and with [`AuthorityError::NotAuthorized`] for any other caller.

use serde::{Deserialize, Serialize};

use crate::error::AuthorityError;
use crate::types::Identity;

/// Holder of the single privileged identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    identity: Option<Identity>,
}

impl Authority {
    /// An unset authority.
    pub const fn unset() -> Self {
        Self { identity: None }
    }

    /// Configure the authority. Succeeds once.
    pub fn set(&mut self, identity: Identity) -> Result<(), AuthorityError> {
        if identity.is_null() {
            return Err(AuthorityError::NullIdentity);
        }
        if let Some(existing) = self.identity {
            return Err(AuthorityError::AlreadySet(existing));
        }
        self.identity = Some(identity);
        Ok(())
    }

    /// The configured authority, if any.
    pub fn get(&self) -> Option<Identity> {
        self.identity
    }

    /// Whether an authority has been configured.
    pub fn is_set(&self) -> bool {
        self.identity.is_some()
    }

    /// Gate an authority-only operation on `caller`.
    pub fn require(&self, caller: &Identity) -> Result<Identity, AuthorityError> {
        match self.identity {
            None => Err(AuthorityError::NotVerified),
            Some(authority) if authority == *caller => Ok(authority),
            Some(_) => Err(AuthorityError::NotAuthorized(*caller)),
        }
    }
}

//! Ephemeral principal provisioning.
//!
//! A [`CredentialProvisioner`] creates one principal per run through the
//! service's admin command and hands it out wrapped in a [`CredentialGuard`].
//! The guard removes the principal exactly once, either through
//! [`CredentialGuard::release`] or when it is dropped.

mod admin;
mod error;
mod identity;
mod parse;

use std::fmt;

use tracing::{info, warn};

pub use admin::{AdminCommand, ProcessAdmin};
pub use error::ProvisioningError;
pub use identity::{IdentityGenerator, RandomIdentity, TOKEN_LENGTH, principal_address};

pub(crate) const PROVISION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::credentials");

/// Principal id and secret used for HTTP Basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    principal_id: String,
    secret: String,
}

impl Credential {
    /// Creates a credential from its parts.
    pub fn new(principal_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            secret: secret.into(),
        }
    }

    /// Identifier substituted into scripts and sent as the Basic auth user.
    #[must_use]
    pub fn principal_id(&self) -> &str {
        &self.principal_id
    }

    /// Secret sent as the Basic auth password.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("principal_id", &self.principal_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Creates and destroys principals through an [`AdminCommand`].
#[derive(Debug)]
pub struct CredentialProvisioner<A, I> {
    admin: A,
    identities: I,
    prefix: String,
    domain: String,
}

impl<A, I> CredentialProvisioner<A, I>
where
    A: AdminCommand,
    I: IdentityGenerator,
{
    /// Creates a provisioner generating `<prefix>-<token>@<domain>` addresses.
    pub fn new(admin: A, identities: I, prefix: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            admin,
            identities,
            prefix: prefix.into(),
            domain: domain.into(),
        }
    }

    /// Registers a fresh principal and returns its credential.
    ///
    /// # Errors
    ///
    /// Returns an error when the admin command fails or its output lacks the
    /// id or secret line. In the latter case the principal may exist on the
    /// service; the address is logged so it can be cleaned up by hand.
    pub fn create(&self) -> Result<Credential, ProvisioningError> {
        let address = principal_address(&self.prefix, &self.identities.token(), &self.domain);
        let stdout = self.admin.add(&address)?;
        match parse::parse_add_output(&stdout, &address) {
            Ok(credential) => {
                info!(
                    target: PROVISION_TARGET,
                    principal_id = credential.principal_id(),
                    address = %address,
                    "provisioned principal"
                );
                Ok(credential)
            }
            Err(error) => {
                warn!(
                    target: PROVISION_TARGET,
                    address = %address,
                    error = %error,
                    "principal may exist without a usable credential"
                );
                Err(error)
            }
        }
    }

    /// Removes the principal with `principal_id`.
    ///
    /// # Errors
    ///
    /// Returns an error when the admin command fails.
    pub fn destroy(&self, principal_id: &str) -> Result<(), ProvisioningError> {
        self.admin.remove(principal_id)?;
        info!(target: PROVISION_TARGET, principal_id, "removed principal");
        Ok(())
    }

    /// Creates a principal whose removal is tied to the returned guard.
    ///
    /// # Errors
    ///
    /// Propagates failures from [`Self::create`].
    pub fn acquire(&self) -> Result<CredentialGuard<'_, A, I>, ProvisioningError> {
        let credential = self.create()?;
        Ok(CredentialGuard {
            provisioner: self,
            credential,
            released: false,
        })
    }
}

/// Scoped ownership of a provisioned principal.
#[derive(Debug)]
pub struct CredentialGuard<'a, A, I>
where
    A: AdminCommand,
    I: IdentityGenerator,
{
    provisioner: &'a CredentialProvisioner<A, I>,
    credential: Credential,
    released: bool,
}

impl<A, I> CredentialGuard<'_, A, I>
where
    A: AdminCommand,
    I: IdentityGenerator,
{
    /// Credential owned by this guard.
    #[must_use]
    pub const fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Removes the principal now and reports the outcome.
    ///
    /// # Errors
    ///
    /// Returns the admin failure. The removal is not retried on drop.
    pub fn release(mut self) -> Result<(), ProvisioningError> {
        self.released = true;
        self.provisioner.destroy(self.credential.principal_id())
    }
}

impl<A, I> Drop for CredentialGuard<'_, A, I>
where
    A: AdminCommand,
    I: IdentityGenerator,
{
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(error) = self.provisioner.destroy(self.credential.principal_id()) {
            warn!(
                target: PROVISION_TARGET,
                principal_id = self.credential.principal_id(),
                error = %error,
                "failed to remove principal"
            );
        }
    }
}

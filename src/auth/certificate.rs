//! Default backend: maps verified certificate principals to identities.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;

use crate::auth::{AuthError, BackendAuthenticator};
use crate::config::schema::AuthenticationConfig;
use crate::context::Identity;
use crate::support::normalize_dn;
use crate::transport::request::TransportRequest;

/// Authenticates transport clients by their certificate subject.
///
/// Unknown principals are "not authenticated". Mappings can be swapped at
/// runtime.
pub struct CertificateAuthenticator {
    principals: ArcSwap<HashMap<String, Identity>>,
}

impl CertificateAuthenticator {
    pub fn new(config: &AuthenticationConfig) -> Self {
        Self {
            principals: ArcSwap::from_pointee(build_table(config)),
        }
    }

    /// Apply reloaded principal mappings.
    pub fn update(&self, config: &AuthenticationConfig) {
        let table = build_table(config);
        tracing::info!(principals = table.len(), "Principal mappings updated");
        self.principals.store(Arc::new(table));
    }

    /// Number of configured principals.
    pub fn len(&self) -> usize {
        self.principals.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn build_table(config: &AuthenticationConfig) -> HashMap<String, Identity> {
    config
        .principals
        .iter()
        .map(|m| {
            let identity = Identity::new(&m.user).with_backend_roles(m.backend_roles.iter().cloned());
            (normalize_dn(&m.dn), identity)
        })
        .collect()
}

#[async_trait]
impl BackendAuthenticator for CertificateAuthenticator {
    async fn authenticate(
        &self,
        _request: &TransportRequest,
        principal: &str,
        action: &str,
    ) -> Result<Option<Identity>, AuthError> {
        let identity = self.principals.load().get(&normalize_dn(principal)).cloned();
        match &identity {
            Some(id) => tracing::debug!(user = id.name(), action, "Authenticated certificate principal"),
            None => tracing::debug!(principal, action, "No identity mapped for principal"),
        }
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::PrincipalMapping;
    use crate::transport::request::TransportRequest;

    fn config(dn: &str, user: &str) -> AuthenticationConfig {
        AuthenticationConfig {
            principals: vec![PrincipalMapping {
                dn: dn.into(),
                user: user.into(),
                backend_roles: vec!["admin".into()],
            }],
        }
    }

    #[tokio::test]
    async fn test_maps_principal() {
        let auth = CertificateAuthenticator::new(&config("CN=kirk, OU=client, O=Example", "kirk"));
        let request = TransportRequest::new("indices:data/read/search");

        let identity = auth
            .authenticate(&request, "CN=kirk,OU=client,O=Example", "indices:data/read/search")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(identity.name(), "kirk");
        assert!(identity.backend_roles().contains("admin"));

        let unknown = auth
            .authenticate(&request, "CN=spock,OU=client,O=Example", "indices:data/read/search")
            .await
            .unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_mappings() {
        let auth = CertificateAuthenticator::new(&config("CN=kirk", "kirk"));
        auth.update(&config("CN=spock", "spock"));
        let request = TransportRequest::new("a");

        assert!(auth.authenticate(&request, "CN=kirk", "a").await.unwrap().is_none());
        assert!(auth.authenticate(&request, "CN=spock", "a").await.unwrap().is_some());
        assert_eq!(auth.len(), 1);
    }
}

//! Premium subscription state.
//!
//! The purchase provider is the source of truth; the profile's `is_premium`
//! flag is a cached copy refreshed after purchases, restores and on demand.

use log::info;
use shared::UserProfile;
use std::sync::Arc;

use crate::errors::{MeadowError, Result};
use crate::io::{EntitlementProvider, Product};
use crate::storage::UserProfileStorage;

pub struct SubscriptionService<S> {
    repository: Arc<S>,
    provider: Arc<dyn EntitlementProvider>,
}

impl<S> Clone for SubscriptionService<S> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<S: UserProfileStorage> SubscriptionService<S> {
    pub fn new(repository: Arc<S>, provider: Arc<dyn EntitlementProvider>) -> Self {
        Self { repository, provider }
    }

    pub async fn load_products(&self) -> Result<Vec<Product>> {
        let products = self.provider.load_products().await?;
        info!("Loaded {} subscription products", products.len());
        Ok(products)
    }

    /// Buy `product`. Returns the updated profile, or None when the purchase
    /// was cancelled or is still pending.
    pub async fn purchase(&self, product: &Product) -> Result<Option<UserProfile>> {
        let mut profile = self.require_profile().await?;

        let transaction = match self.provider.purchase(product).await? {
            Some(transaction) => transaction,
            None => {
                info!("Purchase of {} cancelled or pending", product.id);
                return Ok(None);
            }
        };

        profile.is_premium = true;
        profile.premium_expires_at = transaction.expires_at;
        self.repository.update_profile(&profile).await?;

        info!("Premium unlocked by {}", transaction.product_id);
        Ok(Some(profile))
    }

    pub async fn restore_purchases(&self) -> Result<UserProfile> {
        self.provider.restore_purchases().await?;
        self.refresh_entitlement().await
    }

    /// Copy the provider's subscription status into the profile
    pub async fn refresh_entitlement(&self) -> Result<UserProfile> {
        let mut profile = self.require_profile().await?;
        let subscribed = self.provider.check_subscription_status().await;

        if profile.is_premium != subscribed {
            info!("Premium status changed to {}", subscribed);
            profile.is_premium = subscribed;
            self.repository.update_profile(&profile).await?;
        }
        Ok(profile)
    }

    async fn require_profile(&self) -> Result<UserProfile> {
        self.repository.get_profile().await?.ok_or(MeadowError::ProfileMissing)
    }
}

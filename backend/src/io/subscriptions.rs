//! In-app purchase contract.
//!
//! The store integration lives in the host; the backend sees products,
//! completed transactions and a yes/no entitlement answer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub const PREMIUM_MONTHLY_PRODUCT_ID: &str = "meadow_premium_monthly";
pub const PREMIUM_ANNUAL_PRODUCT_ID: &str = "meadow_premium_annual";

pub const PREMIUM_PRODUCT_IDS: [&str; 2] = [PREMIUM_MONTHLY_PRODUCT_ID, PREMIUM_ANNUAL_PRODUCT_ID];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub display_name: String,
    /// Localized price as the store renders it, e.g. "$2.99"
    pub display_price: String,
}

impl Product {
    pub fn is_premium(&self) -> bool {
        PREMIUM_PRODUCT_IDS.contains(&self.id.as_str())
    }
}

/// A verified, finished purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseTransaction {
    pub product_id: String,
    pub purchased_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait EntitlementProvider: Send + Sync {
    async fn load_products(&self) -> Result<Vec<Product>>;

    /// `Ok(None)` when the user cancelled or the purchase is pending.
    /// An unverifiable transaction is a `VerificationFailure`.
    async fn purchase(&self, product: &Product) -> Result<Option<PurchaseTransaction>>;

    async fn restore_purchases(&self) -> Result<()>;

    /// Whether any premium product is currently subscribed
    async fn check_subscription_status(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_premium_product_ids() {
        let monthly = Product {
            id: PREMIUM_MONTHLY_PRODUCT_ID.to_string(),
            display_name: "Meadow Premium".to_string(),
            display_price: "$2.99".to_string(),
        };
        let other = Product {
            id: "tip_jar".to_string(),
            ..monthly.clone()
        };

        assert!(monthly.is_premium());
        assert!(!other.is_premium());
        assert_eq!(PREMIUM_PRODUCT_IDS, ["meadow_premium_monthly", "meadow_premium_annual"]);
    }
}

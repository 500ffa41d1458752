//! Serializable view of purchase records

use crate::generated::{GetPurchasesByDomainResponse, Purchase};
use serde::Serialize;

/// A purchase as reported by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub plugin_name: String,
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_booking_date: Option<String>,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_downgrade_identifier: Option<String>,
}

impl From<Purchase> for PurchaseRecord {
    fn from(purchase: Purchase) -> Self {
        Self {
            plugin_name: purchase.plugin_name,
            identifier: purchase.identifier,
            next_booking_date: Some(purchase.next_booking_date).filter(|d| !d.is_empty()),
            quantity: purchase.quantity,
            pending_downgrade_identifier: purchase
                .pending_downgrade_identifier
                .filter(|id| !id.is_empty()),
        }
    }
}

/// Records in the order the gateway returned them
pub fn purchase_records(response: GetPurchasesByDomainResponse) -> Vec<PurchaseRecord> {
    response
        .purchases
        .into_iter()
        .map(PurchaseRecord::from)
        .collect()
}

// 🩺 Service catalog entry - read-only, consulted when booking

use serde::{Deserialize, Serialize};

use super::Identified;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,

    /// Session length in minutes
    #[serde(rename = "duration")]
    pub duration_minutes: u32,

    pub price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub active: bool,
}

impl Identified for Service {
    const KIND: &'static str = "Service";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Price of the active service with this exact name, if any
pub fn price_for(services: &[Service], name: &str) -> Option<f64> {
    services
        .iter()
        .find(|s| s.active && s.name == name)
        .map(|s| s.price)
}

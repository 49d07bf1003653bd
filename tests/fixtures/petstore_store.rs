use super::pet::Pet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order has been placed
    Placed,
    Approved,
    Delivered,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub pet: Pet,
    pub quantity: i32,
    pub ship_date: Option<DateTime<Utc>>,
    pub status: OrderStatus,
}

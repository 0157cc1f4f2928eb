use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Service {
    pub id: String,
    pub name: String,
    /// Whole Naira.
    pub price: i64,
    pub minutes: i64,
}

impl Service {
    /// Text used when a service is copied to share with a client.
    pub fn summary(&self) -> String {
        format!("{} — ₦{}", self.name, self.price)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewService {
    pub name: String,
    pub price: i64,
    pub minutes: i64,
}

pub fn default_services() -> Vec<Service> {
    [
        ("s1", "Haircut", 2000, 30),
        ("s2", "Beard Trim", 1000, 15),
        ("s3", "Hair Dye", 2500, 60),
        ("s4", "Full Groom", 3500, 75),
    ]
    .into_iter()
    .map(|(id, name, price, minutes)| Service {
        id: id.to_string(),
        name: name.to_string(),
        price,
        minutes,
    })
    .collect()
}

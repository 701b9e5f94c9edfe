use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub nodes: Vec<ProductNode>,
}

/// One catalog hit. Every field but `item_id`/`product_name` is optional —
/// upstream payloads are inconsistent about which ones are populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductNode {
    pub item_id: String,
    pub product_name: String,
    #[serde(default)]
    pub shop_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub price_min: Option<String>,
    #[serde(default)]
    pub price_max: Option<String>,
    #[serde(default)]
    pub product_link: Option<String>,
    #[serde(default)]
    pub offer_link: Option<String>,
    #[serde(default)]
    pub commission_rate: Option<String>,
    #[serde(default)]
    pub rating_star: Option<String>,
    #[serde(default)]
    pub sales: Option<f64>,
    #[serde(default)]
    pub price_discount_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ShortLinkResponse {
    pub short_link: String,
}

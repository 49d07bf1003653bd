use serde::{Deserialize, Serialize};

/// A pet for sale in the pet store
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: Option<i64>,
    #[schema(required)]
    pub name: String,
    /// Grouping used by the catalogue
    pub category: Option<Category>,
    #[schema(required)]
    pub photo_urls: Vec<String>,
    pub tags: Vec<Tag>,
    pub parent: Option<Box<Pet>>,
    #[serde(skip)]
    pub internal_notes: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

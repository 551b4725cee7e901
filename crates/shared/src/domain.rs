use serde::{Deserialize, Serialize};

/// Opaque, stable identifier assigned to a dog by the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DogId(pub String);

impl DogId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DogId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Detail record for one adoptable dog, sourced only from the detail
/// endpoint and immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DogRecord {
    pub id: DogId,
    pub img: String,
    pub name: String,
    pub age: u32,
    pub zip_code: String,
    pub breed: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    BreedAscending,
    BreedDescending,
}

impl SortOrder {
    /// Serialized form the search endpoint expects for its `sort` parameter.
    pub fn as_query_value(self) -> &'static str {
        match self {
            SortOrder::BreedAscending => "breed:asc",
            SortOrder::BreedDescending => "breed:desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::BreedAscending => SortOrder::BreedDescending,
            SortOrder::BreedDescending => SortOrder::BreedAscending,
        }
    }
}

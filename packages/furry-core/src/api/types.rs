//! JSON:API request and response models for the RescueGroups v5 API.
//!
//! The API omits fields freely, so nearly everything is optional and every
//! struct tolerates missing keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::protocol_constants::{ADOPTED_MARKER, ORG_RESOURCE_TYPE};

// ─────────────────────────────────────────────────────────────────────────────
// Species
// ─────────────────────────────────────────────────────────────────────────────

/// Animal species, named by their API path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    #[default]
    Cats,
    Dogs,
    Rabbits,
    Turtles,
}

impl Species {
    pub const ALL: [Species; 4] = [Self::Cats, Self::Dogs, Self::Rabbits, Self::Turtles];

    /// The path segment used in search URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cats => "cats",
            Self::Dogs => "dogs",
            Self::Rabbits => "rabbits",
            Self::Turtles => "turtles",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|species| {
                let name = species.as_str();
                lower == name || lower == name.trim_end_matches('s')
            })
            .ok_or_else(|| format!("unknown species: {s}"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Search request
// ─────────────────────────────────────────────────────────────────────────────

/// Body of the advanced search POST.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    pub data: Option<DataNode>,
}

impl SearchRequest {
    /// A request that only restricts results to a radius around `postal_code`.
    pub fn within_radius(miles: u32, postal_code: impl Into<String>) -> Self {
        Self {
            data: Some(DataNode {
                filter_radius: Some(FilterRadius {
                    miles,
                    postal_code: postal_code.into(),
                }),
                ..Default::default()
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<Filter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_processing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_radius: Option<FilterRadius>,
}

/// A single field filter, e.g. `statuses.name equals Available`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub field_name: String,
    pub operation: String,
    pub criteria: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRadius {
    pub miles: u32,
    /// Sent as text so ZIPs with leading zeros survive.
    #[serde(rename = "postalcode")]
    pub postal_code: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Search response
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub meta: Option<Meta>,
    pub data: Vec<ResourceItem>,
    pub included: Vec<IncludedItem>,
    pub errors: Option<Vec<ApiErrorBody>>,
}

impl SearchResponse {
    /// Finds the organization listing `animal`, if it was included.
    ///
    /// Uses the animal's first `orgs` relationship.
    pub fn organization_for(&self, animal: &ResourceItem) -> Option<&IncludedItem> {
        organization_for_animal(animal, &self.included)
    }

    /// Finds the first included picture for `animal`.
    pub fn picture_for(&self, animal: &ResourceItem) -> Option<&IncludedItem> {
        let id = animal
            .relationships
            .pictures
            .as_ref()?
            .data
            .first()?
            .id
            .as_str();
        self.included
            .iter()
            .find(|item| item.id == id && item.item_type == "pictures")
    }
}

/// Pagination metadata.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Meta {
    pub count: Option<u32>,
    pub count_returned: Option<u32>,
    pub page_returned: Option<u32>,
    pub limit: Option<u32>,
    pub pages: Option<u32>,
}

/// One animal in a search response.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ResourceItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub id: String,
    pub attributes: AnimalAttributes,
    pub relationships: Relationships,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimalAttributes {
    pub distance: Option<f64>,
    pub is_adoption_pending: Option<bool>,
    pub age_group: Option<String>,
    pub age_string: Option<String>,
    pub birth_date: Option<String>,
    pub is_birth_date_exact: Option<bool>,
    pub breed_string: Option<String>,
    pub breed_primary: Option<String>,
    pub breed_primary_id: Option<u64>,
    pub is_breed_mixed: Option<bool>,
    pub coat_length: Option<String>,
    pub is_courtesy_listing: Option<bool>,
    pub description_html: Option<String>,
    pub is_found: Option<bool>,
    pub priority: Option<i64>,
    pub name: Option<String>,
    pub picture_count: Option<u32>,
    pub picture_thumbnail_url: Option<String>,
    pub rescue_id: Option<String>,
    pub search_string: Option<String>,
    pub sex: Option<String>,
    pub size_group: Option<String>,
    pub slug: Option<String>,
    pub is_sponsorable: Option<bool>,
    pub trackerimage_url: Option<String>,
    pub video_count: Option<u32>,
    pub video_url_count: Option<u32>,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Relationships {
    pub pictures: Option<RelationshipData>,
    pub orgs: Option<RelationshipData>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RelationshipData {
    pub data: Vec<ResourceRef>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ResourceRef {
    #[serde(rename = "type")]
    pub ref_type: String,
    pub id: String,
}

/// A related resource embedded in `included`: a picture or an org.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct IncludedItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub id: String,
    pub attributes: IncludedAttributes,
}

/// Attributes of either a picture or an organization.
///
/// Picture fields and org fields never appear together; which set is
/// populated depends on the item's `type`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IncludedAttributes {
    // pictures
    pub original: Option<ImageSize>,
    pub large: Option<ImageSize>,
    pub small: Option<ImageSize>,
    pub order: Option<i32>,
    pub created: Option<String>,
    pub updated: Option<String>,

    // orgs
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postalcode: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
    pub facebook_url: Option<String>,
    pub adoption_url: Option<String>,
    pub donation_url: Option<String>,
    pub adoption_process: Option<String>,
    pub about: Option<String>,
    pub services: Option<String>,
    #[serde(rename = "type")]
    pub org_type: Option<String>,
    pub citystate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageSize {
    pub resolution_x: Option<u32>,
    pub resolution_y: Option<u32>,
    pub url: Option<String>,
}

/// An entry of a JSON:API `errors` array.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorBody {
    pub status: Option<serde_json::Value>,
    pub title: Option<String>,
    pub detail: Option<String>,
}

/// Takes the first `orgs` relationship of `animal` and looks it up in
/// `included` by id and type.
pub fn organization_for_animal<'a>(
    animal: &ResourceItem,
    included: &'a [IncludedItem],
) -> Option<&'a IncludedItem> {
    let org_id = animal.relationships.orgs.as_ref()?.data.first()?.id.as_str();
    included
        .iter()
        .find(|item| item.id == org_id && item.item_type == ORG_RESOURCE_TYPE)
}

// ─────────────────────────────────────────────────────────────────────────────
// Simple search response
// ─────────────────────────────────────────────────────────────────────────────

/// Response of the simple GET search. Entries may be `null`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct FindResponse {
    pub data: Vec<Option<Animal>>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Animal {
    pub attributes: FindAttributes,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FindAttributes {
    pub age_string: Option<String>,
    pub breed_primary: Option<String>,
    pub name: Option<String>,
    pub picture_thumbnail_url: Option<String>,
}

/// Drops `null` entries and animals already marked adopted.
pub fn filter_available(response: FindResponse) -> FindResponse {
    let data = response
        .data
        .into_iter()
        .filter(|entry| match entry {
            Some(animal) => !animal
                .attributes
                .name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(ADOPTED_MARKER)),
            None => false,
        })
        .collect();
    FindResponse { data }
}

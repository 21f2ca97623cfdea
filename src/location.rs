//! The location entity and its request body types.

use serde::{Deserialize, Deserializer, Serialize};

/// A persisted location record. `name`, `loca`, `img`, and `desc` are always
/// present; `facilities` and `layout_info` may be null.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub loca: String,
    pub img: String,
    pub desc: String,
    pub facilities: Option<String>,
    pub layout_info: Option<String>,
}

/// Create body: four required fields plus two optional ones. Missing required
/// fields fail deserialization and surface as a schema validation error.
#[derive(Clone, Debug, Deserialize)]
pub struct NewLocation {
    pub name: String,
    pub loca: String,
    pub img: String,
    pub desc: String,
    #[serde(default)]
    pub facilities: Option<String>,
    #[serde(default)]
    pub layout_info: Option<String>,
}

/// Sparse PATCH body. The outer `Option` tracks whether the key was supplied
/// at all, the inner one the supplied value, so an omitted field and an
/// explicit `null` stay distinguishable. Fields are enumerated here rather
/// than reflected over at runtime.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LocationPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub loca: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub img: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub desc: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub facilities: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub layout_info: Option<Option<String>>,
}

impl LocationPatch {
    /// True when no key was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.loca.is_none()
            && self.img.is_none()
            && self.desc.is_none()
            && self.facilities.is_none()
            && self.layout_info.is_none()
    }

    /// Required columns cannot be cleared; returns the first field supplied
    /// as an explicit `null` that must stay non-null.
    pub fn nulled_required_field(&self) -> Option<&'static str> {
        if matches!(self.name, Some(None)) {
            return Some("name");
        }
        if matches!(self.loca, Some(None)) {
            return Some("loca");
        }
        if matches!(self.img, Some(None)) {
            return Some("img");
        }
        if matches!(self.desc, Some(None)) {
            return Some("desc");
        }
        None
    }
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

use serde::{Deserialize, Serialize};

use crate::category::{resolve_category, Category};

/// Location on the map as percentages of the unscaled image width/height.
///
/// Values are normally in `[0, 100]` but are not clamped: a click just past
/// the image edge yields a slightly out-of-range position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A user-placed annotation. Field names match the persisted JSON layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    pub id: String,
    pub position: Position,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Raw stored slug, kept verbatim. Read it through [`Pin::category`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

impl Pin {
    pub fn category(&self) -> Category {
        resolve_category(self.category.as_deref())
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed.unwrap_or(false)
    }

    /// Case-insensitive substring match on title or description.
    /// `needle` must already be lowercase.
    pub fn matches_text(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

/// Shallow update for a pin: `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub position: Option<Position>,
    pub is_completed: Option<bool>,
}

impl PinPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.is_completed = Some(completed);
        self
    }

    pub(crate) fn apply(self, pin: &mut Pin) {
        if let Some(title) = self.title {
            pin.title = title;
        }
        if let Some(description) = self.description {
            pin.description = description;
        }
        if let Some(category) = self.category {
            pin.category = Some(category.as_str().to_string());
        }
        if let Some(position) = self.position {
            pin.position = position;
        }
        if let Some(completed) = self.is_completed {
            pin.is_completed = Some(completed);
        }
    }
}

/// The background map asset: where to fetch it and its natural size in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapInfo {
    pub display_name: String,
    pub image_path: String,
    pub width: f64,
    pub height: f64,
}

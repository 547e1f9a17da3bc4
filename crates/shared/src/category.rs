use serde::{Deserialize, Serialize};

/// Fixed set of pin categories. Declaration order is the grouping order used
/// by the sidebar.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Default,
    Important,
    Location,
    Favorite,
    Landmark,
    Camp,
    Mission,
    Settlement,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Default,
        Category::Important,
        Category::Location,
        Category::Favorite,
        Category::Landmark,
        Category::Camp,
        Category::Mission,
        Category::Settlement,
    ];

    /// The persisted slug.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Default => "default",
            Category::Important => "important",
            Category::Location => "location",
            Category::Favorite => "favorite",
            Category::Landmark => "landmark",
            Category::Camp => "camp",
            Category::Mission => "mission",
            Category::Settlement => "settlement",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Default => "Default",
            Category::Important => "Important",
            Category::Location => "Location",
            Category::Favorite => "Favorite",
            Category::Landmark => "Landmark",
            Category::Camp => "Camp",
            Category::Mission => "Mission",
            Category::Settlement => "Settlement",
        }
    }

    /// Marker color for the category.
    pub fn color(self) -> &'static str {
        match self {
            Category::Default => "#3b82f6",
            Category::Important => "#f43f5e",
            Category::Location => "#10b981",
            Category::Favorite => "#f59e0b",
            Category::Landmark => "#64748b",
            Category::Camp => "#f97316",
            Category::Mission => "#8b5cf6",
            Category::Settlement => "#6366f1",
        }
    }

    /// Parse an exact slug.
    pub fn parse(raw: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.as_str() == raw)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Total mapping from a stored category value to a [`Category`].
///
/// Records written before categories existed have no value at all; unknown
/// slugs come from newer or hand-edited data. Both read as `Default`.
pub fn resolve_category(raw: Option<&str>) -> Category {
    raw.and_then(Category::parse).unwrap_or_default()
}

use std::sync::Arc;

use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, SimpleObject};
use pinmap_shared::category::Category;

use crate::assets::Assets;

// GraphQL output types

#[derive(SimpleObject)]
pub struct GqlMapInfo {
    pub display_name: String,
    pub image_path: String,
    pub width: f64,
    pub height: f64,
}

#[derive(SimpleObject)]
pub struct GqlCategory {
    pub slug: String,
    pub label: String,
    pub color: String,
}

impl From<Category> for GqlCategory {
    fn from(c: Category) -> Self {
        GqlCategory {
            slug: c.as_str().to_string(),
            label: c.label().to_string(),
            color: c.color().to_string(),
        }
    }
}

// Query root

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The background image and its natural size in pixels.
    async fn map(&self, ctx: &Context<'_>) -> async_graphql::Result<GqlMapInfo> {
        let assets = ctx.data::<Arc<Assets>>()?;
        let map = &assets.map;
        Ok(GqlMapInfo {
            display_name: map.display_name.clone(),
            image_path: map.image_path.clone(),
            width: map.width,
            height: map.height,
        })
    }

    /// Pin categories in display order.
    async fn categories(&self) -> Vec<GqlCategory> {
        Category::ALL.into_iter().map(GqlCategory::from).collect()
    }
}

/// Read-only: pins live in the browser, never on the server.
pub type Schema = async_graphql::Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn build_schema(assets: Arc<Assets>) -> Schema {
    async_graphql::Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(assets)
        .finish()
}

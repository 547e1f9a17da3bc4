use pinmap_shared::models::MapInfo;
use serde::{Deserialize, Serialize};

use crate::config::FALLBACK_MAP_SIZE;

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

/// Same-origin GraphQL endpoint.
fn api_url() -> Result<String, String> {
    let origin = page_origin().ok_or_else(|| "No window location".to_string())?;
    Ok(format!("{}/graphql", origin))
}

/// `https://host:port` of the current page.
pub fn page_origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

async fn query<T: for<'de> Deserialize<'de>>(
    query_str: &str,
    variables: Option<serde_json::Value>,
) -> Result<T, String> {
    let req = GraphQLRequest {
        query: query_str.to_string(),
        variables,
    };

    let resp = reqwest::Client::new()
        .post(api_url()?)
        .json(&req)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let gql_resp: GraphQLResponse<T> = resp.json().await.map_err(|e| e.to_string())?;
    into_data(gql_resp)
}

fn into_data<T>(resp: GraphQLResponse<T>) -> Result<T, String> {
    if let Some(errors) = resp.errors {
        if let Some(first) = errors.into_iter().next() {
            return Err(first.message);
        }
    }
    resp.data.ok_or_else(|| "No data returned".to_string())
}

#[derive(Deserialize)]
pub struct MapResponse {
    pub map: MapInfo,
}

pub async fn fetch_map() -> Result<MapInfo, String> {
    let resp: MapResponse =
        query(r#"query { map { displayName imagePath width height } }"#, None).await?;
    Ok(resp.map)
}

/// Used when the server cannot describe the map.
pub fn fallback_map() -> MapInfo {
    MapInfo {
        display_name: "Map".to_string(),
        image_path: "/static/images/map.svg".to_string(),
        width: FALLBACK_MAP_SIZE.width,
        height: FALLBACK_MAP_SIZE.height,
    }
}

/// Map to render once the fetch settles, plus a notice when it fell back.
pub fn settle_map(fetched: Result<MapInfo, String>) -> (MapInfo, Option<String>) {
    match fetched {
        Ok(map) => (map, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch map info, using fallback");
            (fallback_map(), Some(format!("Could not load map details: {e}")))
        }
    }
}

use pinmap_shared::models::MapInfo;
use std::path::Path;

pub struct Assets {
    pub map: MapInfo,
}

impl Assets {
    pub fn load(assets_dir: &Path) -> Result<Self, String> {
        let map_path = assets_dir.join("map.json");

        let map_data = std::fs::read_to_string(&map_path)
            .map_err(|e| format!("Failed to read {}: {}", map_path.display(), e))?;
        let map: MapInfo = serde_json::from_str(&map_data)
            .map_err(|e| format!("Failed to parse map.json: {}", e))?;

        if !(map.width > 0.0 && map.height > 0.0) {
            return Err(format!(
                "map.json: image size must be positive, got {}x{}",
                map.width, map.height
            ));
        }

        tracing::info!(
            name = %map.display_name,
            image = %map.image_path,
            width = map.width,
            height = map.height,
            "Loaded map asset"
        );

        Ok(Assets { map })
    }
}

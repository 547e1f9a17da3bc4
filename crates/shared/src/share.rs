//! Read-only share links: the pin list packed into a URL query parameter.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{PinError, Result};
use crate::models::{Pin, Position};

/// Query parameter carrying the payload.
pub const SHARE_PARAM: &str = "pins";

/// Route of the read-only view.
pub const SHARE_PATH: &str = "/shared";

/// Short-keyed form of [`Pin`] to keep links small.
#[derive(Debug, Serialize, Deserialize)]
struct SharedPin {
    i: String,
    x: f64,
    y: f64,
    t: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    d: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    c: Option<String>,
    a: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    k: Option<bool>,
}

impl From<&Pin> for SharedPin {
    fn from(pin: &Pin) -> Self {
        Self {
            i: pin.id.clone(),
            x: pin.position.x,
            y: pin.position.y,
            t: pin.title.clone(),
            d: pin.description.clone(),
            c: pin.category.clone(),
            a: pin.created_at.clone(),
            k: pin.is_completed,
        }
    }
}

impl From<SharedPin> for Pin {
    fn from(shared: SharedPin) -> Self {
        Pin {
            id: shared.i,
            position: Position::new(shared.x, shared.y),
            title: shared.t,
            description: shared.d,
            category: shared.c,
            created_at: shared.a,
            is_completed: shared.k,
        }
    }
}

pub fn encode(pins: &[Pin]) -> Result<String> {
    let compact: Vec<SharedPin> = pins.iter().map(SharedPin::from).collect();
    let json = serde_json::to_vec(&compact).map_err(|e| PinError::Share(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode(payload: &str) -> Result<Vec<Pin>> {
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim().trim_end_matches('='))
        .map_err(|e| PinError::Share(e.to_string()))?;
    let compact: Vec<SharedPin> =
        serde_json::from_slice(&bytes).map_err(|e| PinError::Share(e.to_string()))?;
    Ok(compact.into_iter().map(Pin::from).collect())
}

/// `{origin}/shared?pins=...`, or `None` when there is nothing to share.
pub fn share_url(origin: &str, pins: &[Pin]) -> Result<Option<String>> {
    if pins.is_empty() {
        return Ok(None);
    }
    let payload = encode(pins)?;
    Ok(Some(format!(
        "{}{SHARE_PATH}?{SHARE_PARAM}={payload}",
        origin.trim_end_matches('/')
    )))
}

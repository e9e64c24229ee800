use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Game metadata as returned by the ITAD `games/info` endpoint, plus the
/// launch-price and store fields the feature builder fills in from other sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "name")]
    pub title: Option<String>,
    #[serde(default)]
    pub appid: Option<u64>,
    #[serde(default, alias = "release_date", alias = "released")]
    pub release_date: Option<String>,
    #[serde(default, alias = "price_usd")]
    pub price: Option<f64>,
    #[serde(default, alias = "early_access")]
    pub early_access: bool,
    #[serde(default)]
    pub mature: bool,
    #[serde(default)]
    pub achievements: Option<bool>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default, alias = "other_pc_stores")]
    pub other_pc_stores: Vec<String>,
    #[serde(default, alias = "franchise_count")]
    pub franchise_count: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub assets: GameAssets,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameAssets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boxart: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner600: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner400: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner300: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner145: Option<String>,
}

impl GameInfo {
    /// Parses the `YYYY-MM-DD` prefix of the release date, if any.
    pub fn parsed_release_date(&self) -> Option<NaiveDate> {
        let raw = self.release_date.as_deref()?.trim();
        let prefix = raw.get(..10)?;
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
    }

    /// Best available cover image, falling back to the Steam header.
    pub fn image_url(&self) -> Option<String> {
        let assets = &self.assets;
        [
            &assets.boxart,
            &assets.banner600,
            &assets.banner400,
            &assets.banner300,
            &assets.banner145,
        ]
        .into_iter()
        .flatten()
        .map(|url| url.trim())
        .find(|url| !url.is_empty())
        .map(str::to_string)
        .or_else(|| self.appid.and_then(steam_header_url))
    }
}

pub fn steam_header_url(appid: u64) -> Option<String> {
    (appid > 0).then(|| format!("https://steamcdn-a.akamaihd.net/steam/apps/{}/header.jpg", appid))
}

/// A single hit from the ITAD title search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSearchHit {
    pub itad_id: String,
    pub title: String,
    #[serde(default)]
    pub appid: Option<u64>,
    #[serde(default)]
    pub assets: GameAssets,
}

/// Picks the exact (case-insensitive) title match, or the first hit.
pub fn pick_candidate<'a>(title: &str, hits: &'a [GameSearchHit]) -> Option<&'a GameSearchHit> {
    let wanted = title.trim().to_lowercase();
    hits.iter()
        .find(|hit| hit.title.trim().to_lowercase() == wanted)
        .or_else(|| hits.first())
}

//! Derives the model feature vector from catalog metadata.
//!
//! The warehouse normally provides precomputed vectors; this builder covers
//! games that only exist in the external catalog (search, upcoming titles).
//! Where the catalog is silent, fields fall back to conservative defaults
//! (small publisher, solo/indie developer, a $60 launch price).

use crate::domain::game::GameInfo;
use crate::domain::ml::feature_registry::{FEATURE_NAMES, FeatureVector};
use chrono::{Datelike, NaiveDate, Utc};
use std::collections::BTreeMap;
use tracing::warn;

const DEFAULT_LAUNCH_PRICE: f64 = 60.0;
const DEFAULT_PUBLISHER_SIZE_LOG: f64 = 1.5;
const DEFAULT_DEVELOPER_SIZE_LOG: f64 = 1.2;

const STRATEGY_SIM_TAGS: &[&str] = &[
    "strategy",
    "grand strategy",
    "4x",
    "rts",
    "turn-based strategy",
    "simulation",
    "city builder",
    "management",
    "historical",
];

const MMO_TAGS: &[&str] = &["mmo", "mmorpg", "massively multiplayer"];

#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder;

impl FeatureBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, appid: u64, game: &GameInfo) -> FeatureVector {
        self.build_at(appid, game, Utc::now().date_naive())
    }

    /// Same as [`FeatureBuilder::build`] with an explicit "today", which only
    /// matters when the release date is unknown.
    pub fn build_at(&self, appid: u64, game: &GameInfo, today: NaiveDate) -> FeatureVector {
        let mut f: BTreeMap<String, f64> = BTreeMap::new();
        let mut set = |name: &str, value: f64| {
            f.insert(name.to_string(), value);
        };

        let price = game
            .price
            .filter(|p| p.is_finite() && *p > 0.0)
            .unwrap_or(DEFAULT_LAUNCH_PRICE);
        set("log_launch_price", price.ln());

        // Unknown release dates are treated as a holiday-season launch this year.
        let release = game
            .parsed_release_date()
            .or_else(|| NaiveDate::from_ymd_opt(today.year(), 12, 1))
            .unwrap_or(today);
        let month = release.month();

        set("release_year", release.year() as f64);
        set("release_month", month as f64);
        set("release_quarter", ((month - 1) / 3 + 1) as f64);
        set("release_weekday", release.weekday().num_days_from_monday() as f64);

        set("is_holiday_season", flag(matches!(month, 11 | 12)));
        set("is_summer_sale_window", flag(matches!(month, 6 | 7)));
        set("is_autumn_sale_window", flag(month == 10));
        set("within_7d_of_steam_sale", flag(matches!(month, 6 | 11 | 12)));

        set("early_access", flag(game.early_access));
        set("mature", flag(game.mature));
        set("Achievements", flag(game.achievements.unwrap_or(true)));

        let platforms: Vec<String> = game.platforms.iter().map(|p| p.to_lowercase()).collect();
        let is_pc_only = platforms.is_empty() || platforms == ["pc"];
        let is_multi_store_pc = !game.other_pc_stores.is_empty();
        let multiplatform = flag(!is_pc_only);

        set("is_multiplatform_refined", multiplatform);
        set("exclusive_steam", flag(is_pc_only && !is_multi_store_pc));
        set("is_multi_store_pc", flag(is_multi_store_pc));
        set("is_cross_platform", flag(platforms.len() > 1));

        set("publisher_size_log", DEFAULT_PUBLISHER_SIZE_LOG);
        set("developer_size_log", DEFAULT_DEVELOPER_SIZE_LOG);

        set("publisher_size_bin__Small (≤5)", 1.0);
        set("publisher_size_bin__Medium (6–15)", 0.0);
        set("publisher_size_bin__Large (16–50)", 0.0);
        set("publisher_size_bin__Major (>50)", 0.0);

        set("developer_size_bin__Solo/Indie (≤2)", 1.0);
        set("developer_size_bin__Small (3–5)", 0.0);
        set("developer_size_bin__Mid (6–15)", 0.0);
        set("developer_size_bin__Large (>15)", 0.0);

        set("franchise_count_prev", game.franchise_count.unwrap_or(0) as f64);

        set("price_x_multiplatform", price * multiplatform);
        set("publisher_x_multiplatform", DEFAULT_PUBLISHER_SIZE_LOG * multiplatform);
        set("developer_x_multiplatform", DEFAULT_DEVELOPER_SIZE_LOG * multiplatform);
        set("price_x_pubsize", price * DEFAULT_PUBLISHER_SIZE_LOG);
        set("price_x_devsize", price * DEFAULT_DEVELOPER_SIZE_LOG);

        let (strategy_sim, mmo) = genre_clusters(&game.tags);
        set("genre_cluster_strategy_sim", flag(strategy_sim));
        set("genre_cluster_mmo", flag(mmo));

        let missing: Vec<&str> = FEATURE_NAMES
            .iter()
            .copied()
            .filter(|name| !f.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            warn!("Feature builder left features unset for {}: {:?}", appid, missing);
        }

        FeatureVector::new(f)
    }
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// Maps free-form store tags onto the two genre clusters the models use.
fn genre_clusters(tags: &[String]) -> (bool, bool) {
    let lowered: Vec<String> = tags.iter().map(|t| t.trim().to_lowercase()).collect();
    let any_of = |family: &[&str]| lowered.iter().any(|t| family.contains(&t.as_str()));
    (any_of(STRATEGY_SIM_TAGS), any_of(MMO_TAGS))
}

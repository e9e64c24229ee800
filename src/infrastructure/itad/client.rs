use crate::config::ItadEnvConfig;
use crate::domain::errors::ItadError;
use crate::domain::game::{GameAssets, GameInfo, GameSearchHit};
use crate::domain::ports::GameCatalog;
use crate::infrastructure::core::HttpClientFactory;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const BODY_SNIPPET_LEN: usize = 200;

/// IsThereAnyDeal REST client.
///
/// Every request carries the API key as the `key` query parameter. A missing
/// key disables the client and every call returns [`ItadError::Disabled`].
pub struct ItadClient {
    client: ClientWithMiddleware,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: Option<String>,
    title: Option<String>,
    #[serde(default)]
    appid: Option<u64>,
    #[serde(default)]
    assets: Option<GameAssets>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchPayload {
    List(Vec<SearchItem>),
    Wrapped {
        #[serde(default)]
        results: Vec<SearchItem>,
    },
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    found: bool,
    game: Option<LookupGame>,
}

#[derive(Debug, Deserialize)]
struct LookupGame {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PriceEntry {
    #[serde(default)]
    deals: Vec<Deal>,
}

#[derive(Debug, Deserialize)]
struct Deal {
    shop: serde_json::Value,
    price: Money,
}

#[derive(Debug, Deserialize)]
struct Money {
    amount: f64,
    currency: String,
}

impl ItadClient {
    pub fn new(config: &ItadEnvConfig) -> Self {
        Self {
            client: HttpClientFactory::create_client(Duration::from_secs(config.timeout_secs)),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, ItadError> {
        let key = self.api_key.as_deref().ok_or(ItadError::Disabled)?;
        let mut query: Vec<(&str, &str)> = vec![("key", key)];
        query.extend(params.iter().map(|(k, v)| (*k, v.as_str())));

        Url::parse_with_params(&format!("{}{}", self.base_url, path), query).map_err(|e| {
            ItadError::Request {
                path: path.to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// GET returning `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>, ItadError> {
        let url = self.url(path, params)?;
        debug!("ITAD GET {}", path);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_failed(path, e))?;

        Self::decode(path, response).await
    }

    /// POST with a JSON body, returning `Ok(None)` on 404.
    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        body: &serde_json::Value,
    ) -> Result<Option<T>, ItadError> {
        let url = self.url(path, params)?;
        let payload = serde_json::to_vec(body).map_err(|e| ItadError::Request {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        debug!("ITAD POST {}", path);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| request_failed(path, e))?;

        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<Option<T>, ItadError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body_snippet = snippet(&text);
            warn!(
                path,
                status_code = status.as_u16(),
                body_snippet = %body_snippet,
                "ITAD request returned non-200"
            );
            return Err(ItadError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                body_snippet,
            });
        }

        response.json::<T>().await.map(Some).map_err(|e| {
            warn!(path, error = %e, "ITAD response could not be decoded");
            ItadError::Decode {
                path: path.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

fn request_failed(path: &str, err: reqwest_middleware::Error) -> ItadError {
    warn!(path, error = %err, "ITAD request failed");
    ItadError::Request {
        path: path.to_string(),
        reason: err.to_string(),
    }
}

fn snippet(body: &str) -> String {
    body.chars()
        .take(BODY_SNIPPET_LEN)
        .collect::<String>()
        .replace('\n', " ")
}

fn search_hits(payload: SearchPayload, limit: usize) -> Vec<GameSearchHit> {
    let items = match payload {
        SearchPayload::List(items) => items,
        SearchPayload::Wrapped { results } => results,
    };

    items
        .into_iter()
        .filter_map(|item| match (item.id, item.title) {
            (Some(itad_id), Some(title)) if !itad_id.is_empty() && !title.is_empty() => {
                Some(GameSearchHit {
                    itad_id,
                    title,
                    appid: item.appid,
                    assets: item.assets.unwrap_or_default(),
                })
            }
            _ => None,
        })
        .take(limit)
        .collect()
}

fn shop_name(shop: &serde_json::Value) -> Option<String> {
    match shop {
        serde_json::Value::String(name) => Some(name.clone()),
        serde_json::Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("id"))
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
        _ => None,
    }
}

/// Cheapest current deal as `(amount, currency, shop)`.
fn cheapest_deal(entries: Vec<PriceEntry>) -> Option<(f64, String, String)> {
    entries
        .into_iter()
        .next()?
        .deals
        .into_iter()
        .filter(|deal| deal.price.amount.is_finite() && deal.price.amount >= 0.0)
        .min_by(|a, b| a.price.amount.total_cmp(&b.price.amount))
        .map(|deal| {
            let shop = shop_name(&deal.shop).unwrap_or_else(|| "unknown".to_string());
            (deal.price.amount, deal.price.currency, shop)
        })
}

#[async_trait]
impl GameCatalog for ItadClient {
    fn is_enabled(&self) -> bool {
        self.api_key.is_some() && !self.base_url.is_empty()
    }

    async fn search_games(
        &self,
        title: &str,
        limit: usize,
    ) -> Result<Vec<GameSearchHit>, ItadError> {
        let payload: Option<SearchPayload> = self
            .get_json(
                "/games/search/v1",
                &[("title", title.to_string()), ("results", limit.to_string())],
            )
            .await?;

        Ok(payload.map(|p| search_hits(p, limit)).unwrap_or_default())
    }

    async fn lookup_appid(&self, app_id: u64) -> Result<Option<String>, ItadError> {
        let response: Option<LookupResponse> = self
            .get_json("/games/lookup/v1", &[("appid", app_id.to_string())])
            .await?;

        Ok(response
            .filter(|r| r.found)
            .and_then(|r| r.game)
            .map(|game| game.id))
    }

    async fn game_info(&self, itad_id: &str) -> Result<Option<GameInfo>, ItadError> {
        self.get_json("/games/info/v2", &[("id", itad_id.to_string())])
            .await
    }

    async fn current_price(
        &self,
        itad_id: &str,
        country: &str,
    ) -> Result<Option<(f64, String, String)>, ItadError> {
        let entries: Option<Vec<PriceEntry>> = self
            .post_json(
                "/games/prices/v3",
                &[("country", country.to_string())],
                &serde_json::json!([itad_id]),
            )
            .await?;

        Ok(entries.and_then(cheapest_deal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_key: Option<&str>) -> ItadClient {
        ItadClient::new(&ItadEnvConfig {
            api_key: api_key.map(str::to_string),
            base_url: "https://itad.example/".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_url_carries_key_and_encodes_params() {
        let url = client(Some("k1"))
            .url("/games/search/v1", &[("title", "Baldur's Gate 3".to_string())])
            .unwrap();

        assert_eq!(url.path(), "/games/search/v1");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("key".to_string(), "k1".to_string()));
        assert_eq!(pairs[1], ("title".to_string(), "Baldur's Gate 3".to_string()));
    }

    #[tokio::test]
    async fn test_disabled_client_refuses_requests() {
        let itad = client(None);
        assert!(!itad.is_enabled());
        assert!(matches!(
            itad.search_games("Hades", 5).await,
            Err(ItadError::Disabled)
        ));
    }

    #[test]
    fn test_search_hits_skip_incomplete_items() {
        let payload: SearchPayload = serde_json::from_str(
            r#"[
                {"id": "a", "title": "Hades"},
                {"id": null, "title": "No id"},
                {"id": "b"},
                {"id": "c", "title": "Hades II"}
            ]"#,
        )
        .unwrap();

        let hits = search_hits(payload, 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].title, "Hades II");
        assert_eq!(hits[1].appid, None);
    }

    #[test]
    fn test_search_hits_carry_appid_and_assets() {
        let payload: SearchPayload = serde_json::from_str(
            r#"[{"id": "a", "title": "Hades", "appid": 1145360,
                 "assets": {"banner145": "https://cdn/b145.jpg"}}]"#,
        )
        .unwrap();

        let hit = &search_hits(payload, 5)[0];
        assert_eq!(hit.appid, Some(1145360));
        assert_eq!(hit.assets.banner145.as_deref(), Some("https://cdn/b145.jpg"));

        let json = serde_json::to_value(hit).unwrap();
        assert_eq!(json["assets"], serde_json::json!({"banner145": "https://cdn/b145.jpg"}));
    }

    #[test]
    fn test_search_hits_accept_wrapped_results_and_limit() {
        let payload: SearchPayload = serde_json::from_str(
            r#"{"results": [{"id": "a", "title": "A"}, {"id": "b", "title": "B"}]}"#,
        )
        .unwrap();
        assert_eq!(search_hits(payload, 1).len(), 1);
    }

    #[test]
    fn test_cheapest_deal_reads_shop_objects() {
        let entries: Vec<PriceEntry> = serde_json::from_str(
            r#"[{"id": "x", "deals": [
                {"shop": {"id": 61, "name": "Steam"}, "price": {"amount": 29.99, "currency": "USD"}},
                {"shop": {"id": 35, "name": "GOG"}, "price": {"amount": 24.99, "currency": "USD"}}
            ]}]"#,
        )
        .unwrap();

        assert_eq!(
            cheapest_deal(entries),
            Some((24.99, "USD".to_string(), "GOG".to_string()))
        );
        assert_eq!(cheapest_deal(Vec::new()), None);
    }

    #[test]
    fn test_snippet_is_bounded_and_single_line() {
        let body = format!("line one\nline two {}", "x".repeat(500));
        let s = snippet(&body);
        assert_eq!(s.chars().count(), BODY_SNIPPET_LEN);
        assert!(!s.contains('\n'));
    }
}

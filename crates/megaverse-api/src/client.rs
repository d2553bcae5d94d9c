//! HTTP client for the megaverse entity API
//!
//! One client value serves a single candidate's megaverse. Map reads
//! return whole-grid snapshots; mutations target one entity at one
//! position. Every call resolves to a [`CallOutcome`] instead of an
//! error type so callers can pattern-match on the rate-limit and
//! not-found cases that drive retry and idempotent-delete behavior.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use megaverse_core::{Entity, Grid, Position};

/// Production API base
pub const DEFAULT_BASE_URL: &str = "https://challenge.crossmint.io/api";

/// Outcome of a single remote call
#[derive(Debug)]
pub enum CallOutcome<T> {
    Success(T),
    /// 404 - the target does not exist
    NotFound,
    /// 429 - back off, for the server-suggested wait when given
    RateLimited { retry_after: Option<Duration> },
    /// Transport failure or any other non-retryable status
    Failed { detail: String },
}

impl<T> CallOutcome<T> {
    /// Map the success payload, leaving terminal outcomes untouched
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CallOutcome<U> {
        match self {
            CallOutcome::Success(value) => CallOutcome::Success(f(value)),
            CallOutcome::NotFound => CallOutcome::NotFound,
            CallOutcome::RateLimited { retry_after } => CallOutcome::RateLimited { retry_after },
            CallOutcome::Failed { detail } => CallOutcome::Failed { detail },
        }
    }
}

#[derive(Deserialize)]
struct CurrentMapResponse {
    map: Vec<Vec<Option<String>>>,
}

#[derive(Deserialize)]
struct GoalMapResponse {
    goal: Vec<Vec<Option<String>>>,
}

/// Client for one candidate's megaverse.
///
/// Cheap to clone; the underlying connection pool is shared and safe
/// for concurrent use across workers.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    candidate_id: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, candidate_id: impl Into<String>) -> Self {
        let base_url = base_url.into();
        ApiClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            candidate_id: candidate_id.into(),
        }
    }

    /// Observed state snapshot: `GET /map/{candidate}`
    pub async fn fetch_observed(&self) -> CallOutcome<Grid> {
        let url = format!("{}/map/{}", self.base_url, self.candidate_id);
        let outcome = classify(self.http.get(&url).send().await).await;
        decode_map(outcome, |body: CurrentMapResponse| body.map).await
    }

    /// Goal state snapshot: `GET /map/{candidate}/goal`
    pub async fn fetch_goal(&self) -> CallOutcome<Grid> {
        let url = format!("{}/map/{}/goal", self.base_url, self.candidate_id);
        let outcome = classify(self.http.get(&url).send().await).await;
        decode_map(outcome, |body: GoalMapResponse| body.goal).await
    }

    /// Create one entity at a position: `POST /{entityType}`
    pub async fn create(&self, position: Position, entity: Entity) -> CallOutcome<()> {
        let Some(endpoint) = entity.endpoint() else {
            return CallOutcome::Failed {
                detail: format!("{} has no create endpoint", entity),
            };
        };

        let mut body = self.position_body(position);
        match entity {
            Entity::Soloon(color) => {
                body["color"] = json!(color.as_str());
            }
            Entity::Cometh(direction) => {
                body["direction"] = json!(direction.as_str());
            }
            _ => {}
        }

        let url = format!("{}/{}", self.base_url, endpoint);
        classify(self.http.post(&url).json(&body).send().await)
            .await
            .map(|_| ())
    }

    /// Delete whatever entity of this kind occupies a position:
    /// `DELETE /{entityType}`
    pub async fn delete(&self, position: Position, entity: Entity) -> CallOutcome<()> {
        let Some(endpoint) = entity.endpoint() else {
            return CallOutcome::Failed {
                detail: format!("{} has no delete endpoint", entity),
            };
        };

        let body = self.position_body(position);
        let url = format!("{}/{}", self.base_url, endpoint);
        classify(self.http.delete(&url).json(&body).send().await)
            .await
            .map(|_| ())
    }

    fn position_body(&self, position: Position) -> serde_json::Value {
        json!({
            "candidateId": self.candidate_id,
            "row": position.row,
            "column": position.column,
        })
    }
}

/// Sort an HTTP response into the outcome taxonomy
async fn classify(
    result: Result<reqwest::Response, reqwest::Error>,
) -> CallOutcome<reqwest::Response> {
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            return CallOutcome::Failed {
                detail: e.to_string(),
            }
        }
    };

    let status = response.status();
    if status.is_success() {
        return CallOutcome::Success(response);
    }
    match status.as_u16() {
        404 => CallOutcome::NotFound,
        429 => CallOutcome::RateLimited {
            retry_after: retry_after_hint(&response),
        },
        _ => {
            let body = response.text().await.unwrap_or_default();
            CallOutcome::Failed {
                detail: format!("{}: {}", status, body.trim()),
            }
        }
    }
}

/// Integer-seconds `Retry-After` header, when the server sent one
fn retry_after_hint(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Decode a map payload into a Grid, normalizing unknown cells to Space
async fn decode_map<B, F>(outcome: CallOutcome<reqwest::Response>, extract: F) -> CallOutcome<Grid>
where
    B: DeserializeOwned,
    F: FnOnce(B) -> Vec<Vec<Option<String>>>,
{
    match outcome {
        CallOutcome::Success(response) => match response.json::<B>().await {
            Ok(body) => decode_grid(extract(body)),
            Err(e) => CallOutcome::Failed {
                detail: format!("malformed map payload: {}", e),
            },
        },
        CallOutcome::NotFound => CallOutcome::NotFound,
        CallOutcome::RateLimited { retry_after } => CallOutcome::RateLimited { retry_after },
        CallOutcome::Failed { detail } => CallOutcome::Failed { detail },
    }
}

fn decode_grid(raw: Vec<Vec<Option<String>>>) -> CallOutcome<Grid> {
    let mut rows = Vec::with_capacity(raw.len());
    for (row_index, raw_row) in raw.into_iter().enumerate() {
        let mut row = Vec::with_capacity(raw_row.len());
        for (column, cell) in raw_row.into_iter().enumerate() {
            let entity = match cell.as_deref() {
                None => Entity::Space,
                Some(text) => Entity::parse_descriptor(text).unwrap_or_else(|| {
                    tracing::warn!(
                        "unknown entity \"{}\" at ({}, {}), treating as SPACE",
                        text,
                        row_index,
                        column
                    );
                    Entity::Space
                }),
            };
            row.push(entity);
        }
        rows.push(row);
    }

    match Grid::from_rows(rows) {
        Ok(grid) => CallOutcome::Success(grid),
        Err(e) => CallOutcome::Failed {
            detail: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use megaverse_core::{Color, Direction};
    use megaverse_test::MockApi;

    fn client_for(mock: &MockApi) -> ApiClient {
        ApiClient::new(mock.base_url(), "cand-1")
    }

    #[tokio::test]
    async fn test_fetch_observed_decodes_descriptors() {
        let mock = MockApi::start().await;
        mock.set_map(serde_json::json!([
            [null, "POLYANET"],
            ["RED_SOLOON", "down_cometh"],
        ]));

        let outcome = client_for(&mock).fetch_observed().await;
        let grid = match outcome {
            CallOutcome::Success(grid) => grid,
            other => panic!("expected success, got {:?}", other),
        };

        assert_eq!(grid.get(Position::new(0, 0)), Some(Entity::Space));
        assert_eq!(grid.get(Position::new(0, 1)), Some(Entity::Polyanet));
        assert_eq!(
            grid.get(Position::new(1, 0)),
            Some(Entity::Soloon(Color::Red))
        );
        assert_eq!(
            grid.get(Position::new(1, 1)),
            Some(Entity::Cometh(Direction::Down))
        );
    }

    #[tokio::test]
    async fn test_fetch_normalizes_unknown_cells_to_space() {
        let mock = MockApi::start().await;
        mock.set_goal(serde_json::json!([["GALAXY", "POLYANET"]]));

        let outcome = client_for(&mock).fetch_goal().await;
        let grid = match outcome {
            CallOutcome::Success(grid) => grid,
            other => panic!("expected success, got {:?}", other),
        };

        assert_eq!(grid.get(Position::new(0, 0)), Some(Entity::Space));
        assert_eq!(grid.get(Position::new(0, 1)), Some(Entity::Polyanet));
    }

    #[tokio::test]
    async fn test_create_sends_entity_attributes() {
        let mock = MockApi::start().await;
        let client = client_for(&mock);

        let outcome = client
            .create(Position::new(2, 3), Entity::Soloon(Color::Blue))
            .await;
        assert!(matches!(outcome, CallOutcome::Success(())));

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "POST");
        assert_eq!(calls[0].path, "/soloons");
        assert_eq!(calls[0].body["candidateId"], "cand-1");
        assert_eq!(calls[0].body["row"], 2);
        assert_eq!(calls[0].body["column"], 3);
        assert_eq!(calls[0].body["color"], "blue");
    }

    #[tokio::test]
    async fn test_delete_carries_no_attributes() {
        let mock = MockApi::start().await;
        let client = client_for(&mock);

        let outcome = client
            .delete(Position::new(0, 0), Entity::Cometh(Direction::Left))
            .await;
        assert!(matches!(outcome, CallOutcome::Success(())));

        let calls = mock.calls();
        assert_eq!(calls[0].method, "DELETE");
        assert_eq!(calls[0].path, "/comeths");
        assert!(calls[0].body.get("direction").is_none());
    }

    #[tokio::test]
    async fn test_missing_entity_classifies_as_not_found() {
        let mock = MockApi::start().await;
        mock.set_deletes_miss(true);

        let outcome = client_for(&mock)
            .delete(Position::new(1, 1), Entity::Polyanet)
            .await;
        assert!(matches!(outcome, CallOutcome::NotFound));
    }

    #[tokio::test]
    async fn test_rate_limit_classifies_with_server_hint() {
        let mock = MockApi::start().await;
        mock.set_rate_limit_budget(1);
        mock.set_retry_after(7);

        let outcome = client_for(&mock)
            .create(Position::new(0, 0), Entity::Polyanet)
            .await;
        match outcome {
            CallOutcome::RateLimited { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(7)));
            }
            other => panic!("expected rate limit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_failed_with_detail() {
        let mock = MockApi::start().await;
        mock.set_failing_endpoint("polyanets");

        let outcome = client_for(&mock)
            .create(Position::new(0, 0), Entity::Polyanet)
            .await;
        match outcome {
            CallOutcome::Failed { detail } => assert!(detail.contains("500")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_space_is_rejected_locally() {
        let mock = MockApi::start().await;

        let outcome = client_for(&mock).create(Position::new(0, 0), Entity::Space).await;
        assert!(matches!(outcome, CallOutcome::Failed { .. }));
        assert!(mock.calls().is_empty());
    }
}

//! HTTP tablebase backend
//!
//! Talks to a Lichess-compatible tablebase server
//! (`GET {base_url}/standard?fen=...`).

use crate::config::LichessConfig;
use crate::errors::{EvaluationError, Result};
use crate::normalization::Perspective;
use crate::outcome::Outcome;
use crate::providers::TablebaseProvider;
use crate::types::{CandidateMove, TablebaseEvaluation, TablebaseProbe, TopMoves};
use log::debug;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

/// Response body of the `/standard` endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TablebaseResponse {
    pub category: Option<String>,
    pub dtz: Option<i32>,
    pub dtm: Option<i32>,
    #[serde(default)]
    pub checkmate: bool,
    #[serde(default)]
    pub stalemate: bool,
    #[serde(default)]
    pub moves: Vec<TablebaseMove>,
}

/// One move entry. Its category and distances describe the position
/// *after* the move, from the opponent's point of view.
#[derive(Debug, Clone, Deserialize)]
pub struct TablebaseMove {
    pub uci: String,
    pub san: Option<String>,
    pub category: Option<String>,
    pub dtz: Option<i32>,
    pub dtm: Option<i32>,
}

impl TablebaseResponse {
    fn outcome(&self) -> Outcome {
        self.category
            .as_deref()
            .map(Outcome::from_category)
            .unwrap_or(Outcome::Unknown)
    }

    /// Position result, or "not covered" when the server does not know it
    pub fn probe(&self) -> TablebaseProbe {
        let outcome = self.outcome();
        match outcome.wdl() {
            Some(wdl) => TablebaseProbe::covered(TablebaseEvaluation {
                wdl,
                dtz: self.dtz,
                dtm: self.dtm,
                category: outcome,
            }),
            None => TablebaseProbe::not_covered(),
        }
    }

    /// Up to `n` candidates rebased onto the mover's perspective, in server order
    pub fn top_moves(&self, n: usize) -> TopMoves {
        if !self.probe().is_tablebase_position {
            return TopMoves::unavailable();
        }

        let moves = self
            .moves
            .iter()
            .filter_map(TablebaseMove::to_candidate)
            .take(n)
            .collect();

        TopMoves {
            is_available: true,
            moves,
        }
    }
}

impl TablebaseMove {
    fn to_candidate(&self) -> Option<CandidateMove> {
        let outcome = self
            .category
            .as_deref()
            .map(Outcome::from_category)
            .unwrap_or(Outcome::Unknown);
        let wdl = outcome.wdl()?;

        let after = TablebaseEvaluation {
            wdl,
            dtz: self.dtz,
            dtm: self.dtm,
            category: outcome,
        };
        let for_mover = after.negate();

        Some(CandidateMove {
            notation: self.uci.clone(),
            san: self.san.clone(),
            wdl: for_mover.wdl,
            dtz: for_mover.dtz,
            dtm: for_mover.dtm,
        })
    }
}

pub struct LichessTablebase {
    client: Client,
    base_url: String,
    timeout_ms: u64,
}

impl LichessTablebase {
    pub fn new(config: &LichessConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_ms,
        })
    }

    fn endpoint(&self, fen: &str) -> Result<Url> {
        let endpoint = format!("{}/standard", self.base_url);
        Url::parse_with_params(&endpoint, &[("fen", fen)]).map_err(|e| {
            EvaluationError::Configuration(format!("Bad tablebase URL {}: {}", self.base_url, e))
        })
    }

    fn request_error(&self, error: reqwest::Error) -> EvaluationError {
        if error.is_timeout() {
            EvaluationError::Timeout {
                operation: "tablebase request".to_string(),
                duration_ms: self.timeout_ms,
            }
        } else {
            error.into()
        }
    }

    /// Fetch the raw response for `fen`
    pub async fn fetch(&self, fen: &str) -> Result<TablebaseResponse> {
        let url = self.endpoint(fen)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(crate::tablebase_error!(
                "Server answered {} for {}",
                status,
                fen
            ));
        }

        let body: TablebaseResponse = response.json().await.map_err(|e| self.request_error(e))?;
        debug!("Tablebase {} -> {:?}", fen, body.category);
        Ok(body)
    }
}

impl TablebaseProvider for LichessTablebase {
    async fn query_position(&self, fen: &str) -> Result<TablebaseProbe> {
        Ok(self.fetch(fen).await?.probe())
    }

    async fn get_top_moves(&self, fen: &str, n: usize) -> Result<TopMoves> {
        Ok(self.fetch(fen).await?.top_moves(n))
    }

    async fn query_with_moves(&self, fen: &str, n: usize) -> Result<(TablebaseProbe, TopMoves)> {
        let response = self.fetch(fen).await?;
        Ok((response.probe(), response.top_moves(n)))
    }
}

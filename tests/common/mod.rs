#![allow(dead_code)]

use chess_dual_eval::{
    CandidateMove, EngineEvaluation, EngineProvider, EvaluationError, Result,
    TablebaseEvaluation, TablebaseProbe, TablebaseProvider, TopMoves,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
pub const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

/// KQ vs K
pub const KQK_WHITE: &str = "8/8/8/8/8/2k5/8/KQ6 w - - 0 1";
pub const KQK_BLACK: &str = "8/8/8/8/8/2k5/8/KQ6 b - - 0 1";

#[derive(Default)]
pub struct MockEngine {
    evaluations: HashMap<String, EngineEvaluation>,
    deep: HashMap<String, EngineEvaluation>,
    delay: Option<Duration>,
    deep_delay: Option<Duration>,
    failing: bool,
    pub calls: AtomicUsize,
    pub deep_calls: AtomicUsize,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with(mut self, fen: &str, evaluation: EngineEvaluation) -> Self {
        self.evaluations.insert(fen.to_string(), evaluation);
        self
    }

    pub fn with_deep(mut self, fen: &str, evaluation: EngineEvaluation) -> Self {
        self.deep.insert(fen.to_string(), evaluation);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_deep_delay(mut self, delay: Duration) -> Self {
        self.deep_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn deep_calls(&self) -> usize {
        self.deep_calls.load(Ordering::SeqCst)
    }
}

impl EngineProvider for MockEngine {
    async fn evaluate_position(&self, fen: &str) -> Result<EngineEvaluation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(EvaluationError::Engine("engine crashed".to_string()));
        }
        self.evaluations
            .get(fen)
            .copied()
            .ok_or_else(|| EvaluationError::Engine(format!("no evaluation for {}", fen)))
    }

    async fn evaluate_position_deep(&self, fen: &str) -> Result<EngineEvaluation> {
        self.deep_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.deep_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(EvaluationError::Engine("engine crashed".to_string()));
        }
        self.deep
            .get(fen)
            .or_else(|| self.evaluations.get(fen))
            .copied()
            .ok_or_else(|| EvaluationError::Engine(format!("no evaluation for {}", fen)))
    }
}

#[derive(Default)]
pub struct MockTablebase {
    probes: HashMap<String, TablebaseEvaluation>,
    moves: HashMap<String, Vec<CandidateMove>>,
    delay: Option<Duration>,
    failing: bool,
    pub query_calls: AtomicUsize,
    pub top_calls: AtomicUsize,
    pub last_n: AtomicUsize,
}

impl MockTablebase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with(mut self, fen: &str, result: TablebaseEvaluation) -> Self {
        self.probes.insert(fen.to_string(), result);
        self
    }

    pub fn with_moves(mut self, fen: &str, moves: Vec<CandidateMove>) -> Self {
        self.moves.insert(fen.to_string(), moves);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn top_calls(&self) -> usize {
        self.top_calls.load(Ordering::SeqCst)
    }
}

impl TablebaseProvider for MockTablebase {
    async fn query_position(&self, fen: &str) -> Result<TablebaseProbe> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(EvaluationError::Network("connection refused".to_string()));
        }
        Ok(match self.probes.get(fen) {
            Some(result) => TablebaseProbe::covered(*result),
            None => TablebaseProbe::not_covered(),
        })
    }

    async fn get_top_moves(&self, fen: &str, n: usize) -> Result<TopMoves> {
        self.top_calls.fetch_add(1, Ordering::SeqCst);
        self.last_n.store(n, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(EvaluationError::Network("connection refused".to_string()));
        }
        Ok(match self.moves.get(fen) {
            Some(moves) => TopMoves {
                is_available: true,
                moves: moves.iter().take(n).cloned().collect(),
            },
            None => TopMoves::unavailable(),
        })
    }
}

pub fn candidate(notation: &str, wdl: i32, dtz: Option<i32>, dtm: Option<i32>) -> CandidateMove {
    CandidateMove::new(notation, wdl, dtz, dtm)
}

/// KQ vs K with White to move, as served by the HTTP tablebase
pub const KQK_WHITE_RESPONSE: &str = r#"{
    "category": "win", "dtz": 11, "dtm": 19, "checkmate": false, "stalemate": false,
    "moves": [
        {"uci": "b1b7", "category": "loss", "dtz": -10, "dtm": -18},
        {"uci": "b1c2", "category": "loss", "dtz": -8, "dtm": -14},
        {"uci": "b1b3", "category": "draw", "dtz": 0, "dtm": null}
    ]
}"#;

/// Local HTTP server answering every request with `body`.
/// Returns its base URL and a request counter.
pub async fn serve_tablebase(body: &'static str) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = requests.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&chunk[..n]),
                }
            }
            counter.fetch_add(1, Ordering::SeqCst);
            let reply = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (base_url, requests)
}

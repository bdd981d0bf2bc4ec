//! UCI engine backend
//!
//! Drives a Stockfish-compatible engine process over stdin/stdout. One child
//! process is shared by all callers; searches are serialized through a lock.

use crate::config::UciEngineConfig;
use crate::errors::{EvaluationError, Result};
use crate::providers::EngineProvider;
use crate::types::EngineEvaluation;
use log::{debug, info, warn};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

/// Search limits for one `go` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub depth: Option<u8>,
    pub movetime_ms: Option<u64>,
}

impl SearchLimits {
    /// `go` command for these limits; an unlimited search falls back to depth 12
    pub fn go_command(&self) -> String {
        let mut go_command = "go".to_string();

        if let Some(depth) = self.depth {
            go_command.push_str(&format!(" depth {}", depth));
        }

        if let Some(time_ms) = self.movetime_ms {
            go_command.push_str(&format!(" movetime {}", time_ms));
        }

        if self.depth.is_none() && self.movetime_ms.is_none() {
            go_command.push_str(" depth 12");
        }

        go_command
    }
}

/// Running engine process
struct UciSession {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

pub struct UciEngine {
    config: UciEngineConfig,
    session: Mutex<Option<UciSession>>,
}

impl UciEngine {
    /// The process is started lazily on first use
    pub fn new(config: UciEngineConfig) -> Self {
        Self {
            config,
            session: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &UciEngineConfig {
        &self.config
    }

    fn normal_limits(&self) -> SearchLimits {
        SearchLimits {
            depth: self.config.depth,
            movetime_ms: self.config.movetime_ms,
        }
    }

    fn deep_limits(&self) -> SearchLimits {
        SearchLimits {
            depth: self.config.deep_depth,
            movetime_ms: self.config.deep_movetime_ms,
        }
    }

    async fn spawn(&self) -> Result<UciSession> {
        let mut child = Command::new(&self.config.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EvaluationError::Engine(format!(
                    "Failed to start engine '{}': {}",
                    self.config.path, e
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| crate::engine_error!("Failed to get stdin"))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| crate::engine_error!("Failed to get stdout"))?;

        let mut session = UciSession {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        };

        self.initialize(&mut session).await?;
        info!("Started UCI engine {}", self.config.path);

        Ok(session)
    }

    async fn initialize(&self, session: &mut UciSession) -> Result<()> {
        self.send_command(session, "uci").await?;
        self.wait_for(session, "uciok").await?;

        if let Some(threads) = self.config.threads {
            self.send_command(session, &format!("setoption name Threads value {}", threads))
                .await?;
        }

        if let Some(hash_size) = self.config.hash_mb {
            self.send_command(session, &format!("setoption name Hash value {}", hash_size))
                .await?;
        }

        // Disable pondering for deterministic behavior
        self.send_command(session, "setoption name Ponder value false")
            .await?;

        self.send_command(session, "isready").await?;
        self.wait_for(session, "readyok").await
    }

    async fn send_command(&self, session: &mut UciSession, command: &str) -> Result<()> {
        session
            .stdin
            .write_all(format!("{}\n", command).as_bytes())
            .await
            .map_err(|e| EvaluationError::Engine(format!("Send failed: {}", e)))?;
        session
            .stdin
            .flush()
            .await
            .map_err(|e| EvaluationError::Engine(format!("Flush failed: {}", e)))
    }

    async fn read_response(&self, session: &mut UciSession) -> Result<String> {
        let timeout = self.config.read_timeout();
        match tokio::time::timeout(timeout, session.stdout.next_line()).await {
            Ok(Ok(Some(line))) => Ok(line.trim().to_string()),
            Ok(Ok(None)) => Err(EvaluationError::Engine(
                "Engine closed its output".to_string(),
            )),
            Ok(Err(e)) => Err(EvaluationError::Engine(format!("Read failed: {}", e))),
            Err(_) => Err(EvaluationError::Timeout {
                operation: "uci read".to_string(),
                duration_ms: self.config.read_timeout_ms,
            }),
        }
    }

    async fn wait_for(&self, session: &mut UciSession, token: &str) -> Result<()> {
        loop {
            let response = self.read_response(session).await?;
            if response.contains(token) {
                return Ok(());
            }
        }
    }

    async fn run_search(
        &self,
        session: &mut UciSession,
        fen: &str,
        limits: SearchLimits,
    ) -> Result<EngineEvaluation> {
        self.send_command(session, &format!("position fen {}", fen))
            .await?;
        self.send_command(session, &limits.go_command()).await?;

        let mut evaluation = None;
        loop {
            let response = self.read_response(session).await?;

            if response.starts_with("info") {
                if let Some(parsed) = parse_info_line(&response) {
                    evaluation = Some(parsed);
                }
            } else if response.starts_with("bestmove") {
                break;
            }
        }

        evaluation.ok_or_else(|| crate::engine_error!("No score reported for {}", fen))
    }

    /// Search `fen`, (re)starting the process when needed.
    ///
    /// The session is taken out of the slot for the duration of the search
    /// and only put back after a clean `bestmove`. A failed search, or a
    /// caller that drops this future mid-search, kills the process so the
    /// next call never reads stale output.
    pub async fn search(&self, fen: &str, limits: SearchLimits) -> Result<EngineEvaluation> {
        let mut guard = self.session.lock().await;

        let mut session = match guard.take() {
            Some(session) => session,
            None => self.spawn().await?,
        };

        let result = self.run_search(&mut session, fen, limits).await;
        match &result {
            Ok(evaluation) => {
                debug!("UCI {} -> {:?}", fen, evaluation);
                *guard = Some(session);
            }
            Err(e) => warn!("UCI search failed for {}: {}", fen, e),
        }
        result
    }

    /// Ask the engine to quit and wait for the process to exit
    pub async fn close(&self) -> Result<()> {
        let mut guard = self.session.lock().await;
        if let Some(mut session) = guard.take() {
            self.send_command(&mut session, "quit").await?;
            session.child.wait().await?;
        }
        Ok(())
    }
}

impl EngineProvider for UciEngine {
    async fn evaluate_position(&self, fen: &str) -> Result<EngineEvaluation> {
        self.search(fen, self.normal_limits()).await
    }

    async fn evaluate_position_deep(&self, fen: &str) -> Result<EngineEvaluation> {
        self.search(fen, self.deep_limits()).await
    }
}

/// Extract the score from a UCI `info` line.
///
/// Bound-only scores and lines for secondary principal variations are
/// skipped.
pub fn parse_info_line(line: &str) -> Option<EngineEvaluation> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.first() != Some(&"info") {
        return None;
    }
    if tokens.contains(&"lowerbound") || tokens.contains(&"upperbound") {
        return None;
    }
    if let Some(pos) = tokens.iter().position(|t| *t == "multipv") {
        if tokens.get(pos + 1) != Some(&"1") {
            return None;
        }
    }

    let score = tokens.iter().position(|t| *t == "score")?;
    let kind = *tokens.get(score + 1)?;
    let value: i32 = tokens.get(score + 2)?.parse().ok()?;

    match kind {
        "cp" => Some(EngineEvaluation::centipawns(value)),
        "mate" => Some(EngineEvaluation::mate(value)),
        _ => None,
    }
}

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use banglish_core::Pipeline;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::time::{timeout, Duration};
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::protocol::{
    CorrectResponse, DaemonRequest, DaemonResponse, ErrorCode, ErrorResponse, GlossResponse,
    RequestBody, ResponseBody, SuggestResponse,
};

pub struct CorrectionServer {
    config: ServerConfig,
    pipeline: Arc<Pipeline>,
}

impl CorrectionServer {
    pub fn new(config: ServerConfig, pipeline: Pipeline) -> Self {
        Self {
            config,
            pipeline: Arc::new(pipeline),
        }
    }

    pub async fn run(&self) -> Result<()> {
        self.prepare_socket_path().await?;
        if self.config.socket_path.exists() {
            fs::remove_file(&self.config.socket_path)
                .await
                .with_context(|| {
                    format!(
                        "failed to cleanup stale socket {}",
                        self.config.socket_path.display()
                    )
                })?;
        }

        let listener = UnixListener::bind(&self.config.socket_path).with_context(|| {
            format!(
                "failed to bind unix socket at {}",
                self.config.socket_path.display()
            )
        })?;
        info!(
            "banglish daemon listening on {}",
            self.config.socket_path.display()
        );

        loop {
            let (stream, _) = listener.accept().await?;
            let pipeline = self.pipeline.clone();
            let timeout_ms = self.config.request_timeout_ms;
            tokio::spawn(async move {
                if let Err(error) = handle_connection(stream, pipeline, timeout_ms).await {
                    warn!("connection closed with error: {error:#}");
                }
            });
        }
    }

    async fn prepare_socket_path(&self) -> Result<()> {
        if let Some(parent) = Path::new(&self.config.socket_path).parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("failed to create socket directory {}", parent.display())
            })?;
        }
        Ok(())
    }
}

async fn handle_connection(
    stream: UnixStream,
    pipeline: Arc<Pipeline>,
    timeout_ms: u64,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = process_line(&line, &pipeline, timeout_ms).await;
        let payload = serde_json::to_string(&response)?;
        writer.write_all(payload.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    Ok(())
}

async fn process_line(line: &str, pipeline: &Pipeline, timeout_ms: u64) -> DaemonResponse {
    match serde_json::from_str::<DaemonRequest>(line) {
        Ok(request) => handle_request(request, pipeline, timeout_ms).await,
        Err(error) => {
            error!("invalid request JSON: {error}");
            DaemonResponse {
                id: String::new(),
                body: ResponseBody::Error(ErrorResponse {
                    code: ErrorCode::InvalidRequest,
                    message: format!("invalid JSON payload: {error}"),
                }),
            }
        }
    }
}

async fn handle_request(
    request: DaemonRequest,
    pipeline: &Pipeline,
    timeout_ms: u64,
) -> DaemonResponse {
    let id = request.id;
    let body = match request.body {
        RequestBody::Ping => ResponseBody::Pong,
        RequestBody::Correct(payload) => {
            let started = Instant::now();
            let budget_ms = timeout_ms.max(1);
            // Dropping the correction on timeout abandons its backend calls.
            let text = match timeout(
                Duration::from_millis(budget_ms),
                pipeline.correct(&payload.text),
            )
            .await
            {
                Ok(corrected) => corrected,
                Err(_) => {
                    warn!(budget_ms, "correction exceeded budget, returning input unchanged");
                    payload.text
                }
            };
            ResponseBody::Correct(CorrectResponse {
                text,
                elapsed_ms: started.elapsed().as_millis() as u64,
            })
        }
        RequestBody::Suggest(payload) => ResponseBody::Suggest(SuggestResponse {
            suggestions: pipeline.suggest(&payload.text),
        }),
        RequestBody::Gloss(payload) => ResponseBody::Gloss(GlossResponse {
            text: pipeline.gloss(&payload.text),
        }),
    };
    DaemonResponse { id, body }
}

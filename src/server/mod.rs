//! Connection Dispatcher Module
//!
//! Accepts client connections up to a configured limit and serves one
//! line-delimited JSON request at a time per connection, applying the
//! client-specified timeout to each.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::error::{Result, WikiError};
use crate::mediator::WikiMediator;
use crate::models::responses::render_list;
use crate::models::{Operation, WireRequest, WireResponse};

// == Connection Dispatcher ==
/// Listens for client connections and forwards their requests to the
/// mediator. Admission is a semaphore with one permit per connection slot,
/// so the count of concurrently served connections is a precise bound.
pub struct ConnectionDispatcher {
    listener: TcpListener,
    mediator: Arc<WikiMediator>,
    admission: Arc<Semaphore>,
}

impl ConnectionDispatcher {
    // == Constructor ==
    /// Binds the dispatcher to an address.
    pub async fn bind(
        addr: SocketAddr,
        mediator: Arc<WikiMediator>,
        max_connections: usize,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            mediator,
            admission: Arc::new(Semaphore::new(max_connections)),
        })
    }

    /// The address the dispatcher actually bound (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    // == Serve ==
    /// Accept loop. A connection slot is taken before `accept` and handed to
    /// the connection task, which releases it when the connection closes.
    pub async fn serve(self) -> Result<()> {
        info!("dispatcher accepting connections");
        loop {
            let permit = match self.admission.clone().acquire_owned().await {
                Ok(permit) => permit,
                // The semaphore is never closed while serve runs.
                Err(_) => return Ok(()),
            };
            let (stream, peer) = self.listener.accept().await?;
            let mediator = self.mediator.clone();

            tokio::spawn(async move {
                info!(%peer, "client connected");
                if let Err(err) = handle_connection(stream, mediator).await {
                    // A broken connection only terminates itself.
                    warn!(%peer, error = %err, "connection closed with error");
                } else {
                    info!(%peer, "client disconnected");
                }
                drop(permit);
            });
        }
    }
}

/// Serves one connection: reads a request line, executes it to completion
/// (or timeout), writes exactly one reply line, then reads the next. One
/// outstanding request per connection at a time.
async fn handle_connection(stream: TcpStream, mediator: Arc<WikiMediator>) -> Result<()> {
    let (read_half, write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();
    let mut writer = BufWriter::new(write_half);

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        debug!(request = %line, "request received");
        let reply = process_line(&mediator, &line).await;
        write_reply(&mut writer, &reply).await?;
    }
    Ok(())
}

async fn write_reply(writer: &mut BufWriter<OwnedWriteHalf>, reply: &WireResponse) -> Result<()> {
    debug!(reply = %reply.to_line(), "reply written");
    writer.write_all(reply.to_line().as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Parses and executes one request line, always producing a well-formed
/// response record.
async fn process_line(mediator: &Arc<WikiMediator>, line: &str) -> WireResponse {
    let request: WireRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(err) => {
            // Malformed line or unrecognized type: reply failed, reusing the
            // request id when it is recoverable.
            let id = serde_json::from_str::<serde_json::Value>(line)
                .ok()
                .and_then(|v| v.get("id").and_then(|id| id.as_str().map(str::to_string)))
                .unwrap_or_else(|| "unknown".to_string());
            return WireResponse::failed(id, err.to_string());
        }
    };

    let id = request.id.clone();
    let timeout = request.timeout;
    let mediator = mediator.clone();
    let mut work = tokio::spawn(async move { execute(mediator, request.op).await });

    let joined = match timeout {
        Some(secs) => {
            match tokio::time::timeout(Duration::from_secs(secs), &mut work).await {
                Ok(joined) => joined,
                Err(_elapsed) => {
                    // Best-effort cancellation; the backend call itself may
                    // run to completion in the background.
                    work.abort();
                    return WireResponse::failed(id, WikiError::Timeout.to_string());
                }
            }
        }
        None => (&mut work).await,
    };

    match joined {
        Ok(Ok(rendered)) => WireResponse::succeeded(id, rendered),
        Ok(Err(err)) => WireResponse::failed(id, err.to_string()),
        Err(join_err) => WireResponse::failed(id, join_err.to_string()),
    }
}

/// Runs one operation against the mediator and renders its result.
async fn execute(mediator: Arc<WikiMediator>, op: Operation) -> Result<String> {
    match op {
        Operation::SimpleSearch { query, limit } => {
            let titles = mediator.simple_search(&query, limit as usize).await?;
            Ok(render_list(&titles))
        }
        Operation::GetPage { page_title } => mediator.get_page(&page_title).await,
        Operation::GetConnectedPages { page_title, hops } => {
            let titles = mediator
                .get_connected_pages(&page_title, hops as u32)
                .await?;
            Ok(render_list(&titles))
        }
        Operation::Zeitgeist { limit } => {
            let keys = mediator.zeitgeist(limit as usize).await?;
            Ok(render_list(&keys))
        }
        Operation::Trending { limit } => {
            let keys = mediator.trending(limit as usize).await?;
            Ok(render_list(&keys))
        }
        Operation::PeakLoad30s => Ok(mediator.peak_load_30s().await?.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::backend::{BackendResult, WikiBackend};
    use crate::config::Config;

    struct EmptyBackend;

    #[async_trait]
    impl WikiBackend for EmptyBackend {
        async fn search(&self, _q: &str, _l: usize) -> BackendResult<Vec<String>> {
            Ok(vec!["B".to_string(), "A".to_string()])
        }
        async fn page_text(&self, _t: &str) -> BackendResult<String> {
            Ok("text".to_string())
        }
        async fn links_on_page(&self, _t: &str) -> BackendResult<Vec<String>> {
            Ok(Vec::new())
        }
        async fn category_members(&self, _c: &str) -> BackendResult<Vec<String>> {
            Ok(Vec::new())
        }
        async fn last_editor(&self, _t: &str) -> BackendResult<String> {
            Ok(String::new())
        }
        async fn categories_on_page(&self, _t: &str) -> BackendResult<Vec<String>> {
            Ok(Vec::new())
        }
        async fn contributions(&self, _a: &str) -> BackendResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn mediator() -> Arc<WikiMediator> {
        Arc::new(WikiMediator::new(Arc::new(EmptyBackend), &Config::default()))
    }

    #[tokio::test]
    async fn test_process_line_success() {
        let reply = process_line(
            &mediator(),
            r#"{"id":"1","type":"simpleSearch","query":"q","limit":"5"}"#,
        )
        .await;

        assert_eq!(reply.id, "1");
        assert_eq!(reply.status, "succeeded");
        assert_eq!(reply.response, r#"["A","B"]"#);
    }

    #[tokio::test]
    async fn test_process_line_recovers_id_from_bad_request() {
        let reply = process_line(&mediator(), r#"{"id":"42","type":"noSuchOp"}"#).await;

        assert_eq!(reply.id, "42");
        assert_eq!(reply.status, "failed");
    }

    #[tokio::test]
    async fn test_process_line_unparseable_garbage() {
        let reply = process_line(&mediator(), "not json at all").await;

        assert_eq!(reply.id, "unknown");
        assert_eq!(reply.status, "failed");
    }

    #[tokio::test]
    async fn test_execute_renders_peak_load_as_number_string() {
        let mediator = mediator();
        let rendered = execute(mediator, Operation::PeakLoad30s).await.unwrap();
        assert_eq!(rendered, "1");
    }
}

//! Stratum session management
//!
//! A session owns one pool connection and drives the
//! subscribe → authorize → notify → submit exchange. Reads, search outcomes
//! and writer failures are all handled on the session task; outbound
//! requests go through a single writer task so lines are never interleaved.
//!
//! Every `mining.notify` advances the job generation and cancels the search
//! for the previous job. Outcomes tagged with an older generation are
//! dropped, so a superseded job is never submitted.

use super::framer::LineFramer;
use super::job::Job;
use super::protocol::{InboundMessage, StratumRequest};
use crate::config::PoolConfig;
use crate::crypto::{PowHasher, ScryptHasher};
use crate::registry::PoolMiner;
use crate::worker::{mining_span, MiningStats, ScryptWorker};
use crate::{Error, JobGeneration, Nonce, Result, SubmissionResult};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn, Instrument};
use uuid::Uuid;

/// Size of the socket read buffer
const READ_BUFFER_SIZE: usize = 4096;

/// Session ID type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Protocol state of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Subscribed,
    Authorized,
    /// Terminal; there is no reconnect
    Terminated { reason: String },
}

/// Result of one search, tagged with the generation it was launched for
#[derive(Debug)]
pub struct SearchOutcome {
    pub job_id: String,
    pub generation: u64,
    pub result: Result<Nonce>,
}

/// The search currently running for the active job
#[derive(Debug)]
struct ActiveSearch {
    job_id: String,
    generation: u64,
    cancellation: CancellationToken,
}

/// Stratum mining session over a single pool connection
pub struct StratumSession<H: PowHasher = ScryptHasher> {
    id: SessionId,
    config: Arc<PoolConfig>,
    state: SessionState,
    framer: LineFramer,
    worker: ScryptWorker<H>,
    generation: JobGeneration,
    active: Option<ActiveSearch>,
    outbound_tx: mpsc::UnboundedSender<StratumRequest>,
    outbound_rx: Option<mpsc::UnboundedReceiver<StratumRequest>>,
    outcome_tx: mpsc::UnboundedSender<SearchOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<SearchOutcome>,
    stats_tx: Option<mpsc::UnboundedSender<MiningStats>>,
    stream: Option<TcpStream>,
    subscribed_at: Option<Instant>,
}

impl<H: PowHasher> StratumSession<H> {
    /// Create a new session
    pub fn new(config: PoolConfig, hasher: Arc<H>) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        Self {
            id: SessionId::new(),
            config: Arc::new(config),
            state: SessionState::Disconnected,
            framer: LineFramer::new(),
            worker: ScryptWorker::new(hasher),
            generation: JobGeneration::new(),
            active: None,
            outbound_tx,
            outbound_rx: Some(outbound_rx),
            outcome_tx,
            outcome_rx,
            stats_tx: None,
            stream: None,
            subscribed_at: None,
        }
    }

    /// Set how many hashes pass between statistics reports
    pub fn with_report_interval(mut self, hashes: u64) -> Self {
        self.worker = self.worker.with_report_interval(hashes);
        self
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Open the TCP connection to the pool
    pub async fn connect(&mut self) -> Result<()> {
        if self.state != SessionState::Disconnected {
            return Err(Error::invalid_state(format!(
                "connect called in state {:?}",
                self.state
            )));
        }

        let address = self.config.address();
        self.state = SessionState::Connecting;
        info!("Connecting to pool {}...", address);

        let started = Instant::now();
        let stream = match TcpStream::connect((self.config.host.as_str(), self.config.port)).await {
            Ok(stream) => stream,
            Err(e) => {
                let err = Error::connect(address, e.to_string());
                self.terminate(&err);
                return Err(err);
            }
        };
        // Shares should not wait on Nagle
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {}", e);
        }

        info!(elapsed = ?started.elapsed(), "Connected to pool {}", address);
        self.stream = Some(stream);
        Ok(())
    }

    /// Run the protocol over the connection opened by [`connect`](Self::connect)
    pub async fn run(&mut self) -> Result<()> {
        let stream = self
            .stream
            .take()
            .ok_or_else(|| Error::invalid_state("run called before connect"))?;
        self.run_on(stream).await
    }

    /// Run the protocol over an already connected stream
    ///
    /// Returns only with an error: the pool closing the connection is a
    /// transport error like any other.
    pub async fn run_on<S>(&mut self, stream: S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let span = tracing::info_span!("session", id = %self.id, pool = %self.config.address());
        self.drive(stream).instrument(span).await
    }

    async fn drive<S>(&mut self, stream: S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        match self.state {
            SessionState::Disconnected => self.state = SessionState::Connecting,
            SessionState::Connecting => {}
            _ => {
                return Err(Error::invalid_state(format!(
                    "run called in state {:?}",
                    self.state
                )))
            }
        }

        let outbound_rx = self
            .outbound_rx
            .take()
            .ok_or_else(|| Error::invalid_state("session already ran"))?;

        let (mut reader, writer) = tokio::io::split(stream);
        let mut writer_task = tokio::spawn(write_loop(writer, outbound_rx).in_current_span());

        let result = match self.on_connected() {
            Ok(()) => self.event_loop(&mut reader, &mut writer_task).await,
            Err(e) => Err(e),
        };

        writer_task.abort();
        let err = match result {
            Ok(()) => Error::transport("Session ended"),
            Err(e) => e,
        };
        self.terminate(&err);
        Err(err)
    }

    async fn event_loop<S>(
        &mut self,
        reader: &mut ReadHalf<S>,
        writer_task: &mut JoinHandle<Result<()>>,
    ) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let mut buf = vec![0u8; READ_BUFFER_SIZE];

        loop {
            tokio::select! {
                read = reader.read(&mut buf) => {
                    let n = read.map_err(|e| Error::transport(format!("Read failed: {}", e)))?;
                    if n == 0 {
                        return Err(Error::transport("Connection closed by pool"));
                    }
                    self.handle_chunk(&buf[..n])?;
                }
                Some(outcome) = self.outcome_rx.recv() => {
                    self.handle_outcome(outcome)?;
                }
                joined = &mut *writer_task => {
                    return match joined {
                        Ok(Ok(())) => Err(Error::transport("Writer stopped")),
                        Ok(Err(e)) => Err(e),
                        Err(e) => Err(Error::transport(format!("Writer task failed: {}", e))),
                    };
                }
            }
        }
    }

    /// Connected: subscribe right away without waiting for anything
    fn on_connected(&mut self) -> Result<()> {
        self.send(StratumRequest::subscribe())?;
        self.state = SessionState::Subscribed;
        self.subscribed_at = Some(Instant::now());
        debug!("Sent mining.subscribe");
        Ok(())
    }

    /// Feed raw bytes from the pool
    fn handle_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        for line in self.framer.push(chunk) {
            match line {
                Ok(line) => self.handle_line(&line)?,
                Err(e) => warn!("Dropping undecodable line: {}", e),
            }
        }
        Ok(())
    }

    /// Handle one complete line; malformed lines are logged and skipped
    fn handle_line(&mut self, line: &str) -> Result<()> {
        trace!(rx = %line, "Received message");

        let message = match InboundMessage::parse(line) {
            Ok(message) => message,
            Err(e) => {
                warn!(line = %line, "Error parsing JSON: {}", e);
                return Ok(());
            }
        };

        match message {
            InboundMessage::Ack { id, .. } => self.on_ack(&id),
            InboundMessage::Notify { params } => {
                self.on_notify(&params);
                Ok(())
            }
            InboundMessage::Rejected { id, error } => {
                warn!(id = %id, error = %error, "Pool returned an error");
                Ok(())
            }
            InboundMessage::Other { id, method } => {
                debug!(id = %id, method = ?method, "Ignoring message");
                Ok(())
            }
        }
    }

    fn on_ack(&mut self, id: &Value) -> Result<()> {
        match self.state {
            SessionState::Subscribed => {
                info!("Successfully subscribed to the pool, authorizing as {}", self.config.username);
                self.send(StratumRequest::authorize(
                    &self.config.username,
                    &self.config.password,
                ))?;
                self.state = SessionState::Authorized;
                if let Some(subscribed_at) = self.subscribed_at {
                    info!(elapsed = ?subscribed_at.elapsed(), "Authorization sent");
                }
            }
            SessionState::Authorized => {
                debug!(id = %id, "Pool acknowledged request");
            }
            _ => {
                warn!(id = %id, state = ?self.state, "Unexpected acknowledgement");
            }
        }
        Ok(())
    }

    fn on_notify(&mut self, params: &Value) {
        if self.state != SessionState::Authorized {
            warn!(state = ?self.state, "Ignoring mining.notify before authorization");
            return;
        }

        let decoded = Job::from_params(params)
            .and_then(|job| job.header_bytes().map(|header| (job, header)));
        match decoded {
            Ok((job, header)) => self.dispatch(job, header),
            Err(e) => warn!("Dropping malformed job: {}", e),
        }
    }

    /// Replace the active job and start searching it
    fn dispatch(&mut self, job: Job, header: Vec<u8>) {
        let generation = self.generation.advance();
        if let Some(previous) = self.active.take() {
            info!(
                job_id = %previous.job_id,
                generation = previous.generation,
                "Job superseded, cancelling its search"
            );
            previous.cancellation.cancel();
        }

        info!(job_id = %job.job_id, generation, "Received work from the pool");

        let cancellation = CancellationToken::new();
        self.active = Some(ActiveSearch {
            job_id: job.job_id.clone(),
            generation,
            cancellation: cancellation.clone(),
        });

        let worker = self.worker.clone();
        let outcome_tx = self.outcome_tx.clone();
        let stats_tx = self.stats_tx.clone();
        let job_id = job.job_id;

        tokio::task::spawn_blocking(move || {
            let span = mining_span(&job_id, generation);
            let _enter = span.enter();

            let result = worker.search(&job_id, &header, &cancellation, stats_tx.as_ref());
            // The session may already be gone
            let _ = outcome_tx.send(SearchOutcome {
                job_id,
                generation,
                result,
            });
        });
    }

    fn handle_outcome(&mut self, outcome: SearchOutcome) -> Result<()> {
        if !self.generation.is_current(outcome.generation) {
            debug!(
                job_id = %outcome.job_id,
                generation = outcome.generation,
                "Discarding outcome for superseded job"
            );
            return Ok(());
        }
        self.active = None;

        match outcome.result {
            Ok(nonce) => {
                let submission = SubmissionResult::new(outcome.job_id, nonce);
                info!(
                    job_id = %submission.job_id,
                    nonce = %submission.nonce,
                    "Submitting share"
                );
                self.send(StratumRequest::submit(&self.config.username, &submission))
            }
            Err(e) if !e.is_fatal() => {
                debug!(job_id = %outcome.job_id, "Search ended: {}", e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn send(&self, request: StratumRequest) -> Result<()> {
        self.outbound_tx
            .send(request)
            .map_err(|_| Error::transport("Outbound queue closed"))
    }

    fn terminate(&mut self, err: &Error) {
        if let Some(active) = self.active.take() {
            active.cancellation.cancel();
        }
        error!(category = err.category(), "Session terminated: {}", err);
        self.state = SessionState::Terminated {
            reason: err.to_string(),
        };
    }
}

/// Drain the outbound queue, one whole line per write
async fn write_loop<W>(
    mut writer: W,
    mut outbound_rx: mpsc::UnboundedReceiver<StratumRequest>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(request) = outbound_rx.recv().await {
        let line = request.encode()?;
        trace!(tx = %String::from_utf8_lossy(&line).trim_end(), "Sending message");

        writer
            .write_all(&line)
            .await
            .map_err(|e| Error::transport(format!("Write failed: {}", e)))?;
        writer
            .flush()
            .await
            .map_err(|e| Error::transport(format!("Flush failed: {}", e)))?;
    }
    Ok(())
}

#[async_trait]
impl<H: PowHasher> PoolMiner for StratumSession<H> {
    fn name(&self) -> &'static str {
        "scrypt-stratum"
    }

    async fn connect(&mut self) -> Result<()> {
        StratumSession::connect(self).await
    }

    async fn run(&mut self) -> Result<()> {
        StratumSession::run(self).await
    }

    fn attach_stats(&mut self, stats_tx: mpsc::UnboundedSender<MiningStats>) {
        self.stats_tx = Some(stats_tx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::fixtures::FixtureHasher;
    use assert_matches::assert_matches;
    use serde_json::json;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    fn pool() -> PoolConfig {
        PoolConfig::new("127.0.0.1", 3333, "alice", "x")
    }

    fn notify_params(job_id: &str, prev_hash: &str) -> Value {
        json!([
            job_id,
            prev_hash,
            "aabb",
            "ccdd",
            ["0102"],
            "20000000",
            "1a2b3c4d",
            "5f5e1000"
        ])
    }

    fn notify_line(job_id: &str, prev_hash: &str) -> String {
        json!({"id": null, "method": "mining.notify", "params": notify_params(job_id, prev_hash)})
            .to_string()
    }

    fn header_of(job_id: &str, prev_hash: &str) -> Vec<u8> {
        Job::from_params(&notify_params(job_id, prev_hash))
            .unwrap()
            .header_bytes()
            .unwrap()
    }

    /// Session in `state` with its outbound queue handed to the test
    fn session_in(
        state: SessionState,
        hasher: FixtureHasher,
    ) -> (
        StratumSession<FixtureHasher>,
        mpsc::UnboundedReceiver<StratumRequest>,
    ) {
        let mut session = StratumSession::new(pool(), Arc::new(hasher));
        session.state = state;
        let outbound_rx = session.outbound_rx.take().unwrap();
        (session, outbound_rx)
    }

    async fn next_outcome(session: &mut StratumSession<FixtureHasher>) -> SearchOutcome {
        timeout(WAIT, session.outcome_rx.recv())
            .await
            .expect("search did not finish")
            .expect("outcome channel closed")
    }

    #[test]
    fn test_new_session_is_disconnected() {
        let session = StratumSession::new(pool(), Arc::new(FixtureHasher::new()));
        assert_eq!(session.state(), &SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_ack_while_subscribed_authorizes_once() {
        let (mut session, mut outbound) = session_in(SessionState::Subscribed, FixtureHasher::new());

        session.handle_line(r#"{"id":1,"result":true,"error":null}"#).unwrap();

        assert_eq!(session.state(), &SessionState::Authorized);
        assert_eq!(outbound.try_recv().unwrap(), StratumRequest::authorize("alice", "x"));
        assert!(outbound.try_recv().is_err());

        // The authorize ack must not trigger another authorize
        session.handle_line(r#"{"id":2,"result":true,"error":null}"#).unwrap();
        assert_eq!(session.state(), &SessionState::Authorized);
        assert!(outbound.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_falsy_result_does_not_authorize() {
        let (mut session, mut outbound) = session_in(SessionState::Subscribed, FixtureHasher::new());

        session.handle_line(r#"{"id":1,"result":false,"error":null}"#).unwrap();
        session.handle_line(r#"{"id":1,"result":null,"error":[20,"Other",null]}"#).unwrap();

        assert_eq!(session.state(), &SessionState::Subscribed);
        assert!(outbound.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_malformed_lines_are_skipped() {
        let (mut session, mut outbound) = session_in(SessionState::Subscribed, FixtureHasher::new());

        session
            .handle_chunk(b"garbage\n{\"id\":1,\n\xff\n{\"id\":1,\"result\":true}\n")
            .unwrap();

        assert_eq!(session.state(), &SessionState::Authorized);
        assert_eq!(outbound.try_recv().unwrap().id, 2);
    }

    #[tokio::test]
    async fn test_notify_before_authorization_is_ignored() {
        let (mut session, _outbound) = session_in(SessionState::Subscribed, FixtureHasher::new());

        session.handle_line(&notify_line("job1", "00112233")).unwrap();

        assert!(session.active.is_none());
        assert_eq!(session.generation.current(), 0);
    }

    #[tokio::test]
    async fn test_malformed_job_is_dropped() {
        let (mut session, _outbound) = session_in(SessionState::Authorized, FixtureHasher::new());

        session
            .handle_line(r#"{"id":null,"method":"mining.notify","params":["j1","00"]}"#)
            .unwrap();
        session.handle_line(&notify_line("job1", "not-hex")).unwrap();

        assert!(session.active.is_none());
        assert_eq!(session.state(), &SessionState::Authorized);
    }

    #[tokio::test]
    async fn test_winning_search_is_submitted() {
        let hasher = FixtureHasher::new().win(&header_of("job7", "00112233"), 7);
        let (mut session, mut outbound) = session_in(SessionState::Authorized, hasher);

        session.handle_line(&notify_line("job7", "00112233")).unwrap();
        let outcome = next_outcome(&mut session).await;
        assert_matches!(&outcome.result, Ok(nonce) if *nonce == Nonce::new(7));
        session.handle_outcome(outcome).unwrap();

        let submit = outbound.try_recv().unwrap();
        assert_eq!(
            submit.encode().unwrap(),
            b"{\"id\":3,\"method\":\"mining.submit\",\"params\":[\"alice\",\"job7\",\"7\"]}\n"
        );
        assert!(session.active.is_none());
    }

    #[tokio::test]
    async fn test_superseded_job_is_never_submitted() {
        // Job A never wins, so its search only ends through cancellation
        let hasher = FixtureHasher::new().win(&header_of("jobB", "44556677"), 3);
        let (mut session, mut outbound) = session_in(SessionState::Authorized, hasher);

        session.handle_line(&notify_line("jobA", "00112233")).unwrap();
        session.handle_line(&notify_line("jobB", "44556677")).unwrap();
        assert_eq!(session.active.as_ref().unwrap().job_id, "jobB");

        let mut outcomes = Vec::new();
        while outcomes.len() < 2 {
            outcomes.push(next_outcome(&mut session).await);
        }
        for outcome in outcomes {
            if outcome.job_id == "jobA" {
                assert_matches!(&outcome.result, Err(Error::Cancelled { .. }));
            }
            session.handle_outcome(outcome).unwrap();
        }

        let submit = outbound.try_recv().unwrap();
        assert_eq!(submit.params, vec![json!("alice"), json!("jobB"), json!("3")]);
        assert!(outbound.try_recv().is_err());

        // A late win for the old generation is discarded as well
        session
            .handle_outcome(SearchOutcome {
                job_id: "jobA".to_string(),
                generation: 1,
                result: Ok(Nonce::new(5)),
            })
            .unwrap();
        assert!(outbound.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_exhaustion_is_fatal() {
        let (mut session, _outbound) = session_in(SessionState::Authorized, FixtureHasher::new());
        let generation = session.generation.advance();

        let result = session.handle_outcome(SearchOutcome {
            job_id: "job".to_string(),
            generation,
            result: Err(Error::NonceSpaceExhausted),
        });

        assert_matches!(result, Err(Error::NonceSpaceExhausted));
    }

    #[tokio::test]
    async fn test_run_over_duplex_stream() {
        let (client, server) = tokio::io::duplex(1024);
        let hasher = FixtureHasher::new().win(&header_of("job9", "00112233"), 2);
        let mut session = StratumSession::new(pool(), Arc::new(hasher));

        let handle = tokio::spawn(async move {
            let result = session.run_on(client).await;
            (session, result)
        });

        let (server_read, mut server_write) = tokio::io::split(server);
        let mut lines = BufReader::new(server_read).lines();

        let subscribe = timeout(WAIT, lines.next_line()).await.unwrap().unwrap().unwrap();
        assert_eq!(subscribe, r#"{"id":1,"method":"mining.subscribe","params":[]}"#);

        // Ack split across writes
        server_write.write_all(b"{\"id\":1,\"res").await.unwrap();
        server_write.write_all(b"ult\":true}\n").await.unwrap();
        let authorize = timeout(WAIT, lines.next_line()).await.unwrap().unwrap().unwrap();
        assert_eq!(
            authorize,
            r#"{"id":2,"method":"mining.authorize","params":["alice","x"]}"#
        );

        let notify = format!("{}\n", notify_line("job9", "00112233"));
        server_write.write_all(notify.as_bytes()).await.unwrap();
        let submit = timeout(WAIT, lines.next_line()).await.unwrap().unwrap().unwrap();
        assert_eq!(
            submit,
            r#"{"id":3,"method":"mining.submit","params":["alice","job9","2"]}"#
        );

        drop(server_write);
        drop(lines);
        let (session, result) = timeout(WAIT, handle).await.unwrap().unwrap();
        assert_matches!(result, Err(Error::Transport { .. }));
        assert_matches!(session.state(), SessionState::Terminated { .. });
    }

    #[tokio::test]
    async fn test_termination_stops_running_search() {
        let (client, server) = tokio::io::duplex(1024);
        let hasher = Arc::new(FixtureHasher::new());
        let mut session = StratumSession::new(pool(), Arc::clone(&hasher));

        let handle = tokio::spawn(async move {
            let result = session.run_on(client).await;
            (session, result)
        });

        let (server_read, mut server_write) = tokio::io::split(server);
        let mut lines = BufReader::new(server_read).lines();

        timeout(WAIT, lines.next_line()).await.unwrap().unwrap().unwrap();
        server_write.write_all(b"{\"id\":1,\"result\":true}\n").await.unwrap();
        timeout(WAIT, lines.next_line()).await.unwrap().unwrap().unwrap();

        // No winner for this job, so only cancellation can end its search
        let notify = format!("{}\n", notify_line("endless", "00112233"));
        server_write.write_all(notify.as_bytes()).await.unwrap();
        timeout(WAIT, async {
            while hasher.calls() == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        drop(server_write);
        drop(lines);
        let (session, result) = timeout(WAIT, handle).await.unwrap().unwrap();
        assert_matches!(result, Err(Error::Transport { .. }));
        assert_matches!(session.state(), SessionState::Terminated { .. });
        assert!(session.active.is_none());

        // Let a hash already in flight finish, then the count must stay put
        tokio::time::sleep(Duration::from_millis(20)).await;
        let settled = hasher.calls();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(hasher.calls(), settled);
    }

    #[tokio::test]
    async fn test_decode_outcome_is_not_fatal() {
        let (mut session, mut outbound) = session_in(SessionState::Authorized, FixtureHasher::new());
        let generation = session.generation.advance();

        let result = session.handle_outcome(SearchOutcome {
            job_id: "job".to_string(),
            generation,
            result: Err(Error::decode("bad header")),
        });

        assert!(result.is_ok());
        assert!(outbound.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_run_before_connect_fails() {
        let mut session = StratumSession::new(pool(), Arc::new(FixtureHasher::new()));
        assert_matches!(session.run().await, Err(Error::InvalidState { .. }));
    }
}

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bone_rs_protocol::{Request, auth, frame};
use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

pub struct MockConfig {
    pub username: String,
    pub password: String,
    pub token: String,
    pub issue_token: bool,
    /// Scripted bodies per command. Each request pops one; the last one repeats.
    pub responses: HashMap<String, VecDeque<Vec<u8>>>,
    /// Responses are written in pieces of this size to exercise partial reads.
    pub chunk_size: usize,
    /// Pause before answering, during which any early request bytes are flagged.
    pub response_delay: Duration,
    /// Pause between response pieces, also watched for early request bytes.
    pub chunk_delay: Duration,
}

impl MockConfig {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_owned(),
            password: password.to_owned(),
            token: "5f1c0ffee".to_owned(),
            issue_token: true,
            responses: HashMap::new(),
            chunk_size: 3,
            response_delay: Duration::ZERO,
            chunk_delay: Duration::ZERO,
        }
    }

    pub fn respond(mut self, command: &str, body: impl Into<Vec<u8>>) -> Self {
        self.responses
            .entry(command.to_owned())
            .or_default()
            .push_back(body.into());
        self
    }
}

#[derive(Default)]
struct Log {
    requests: Vec<Request>,
    interleaved: bool,
}

pub struct MockServer {
    addr: SocketAddr,
    log: Arc<Mutex<Log>>,
}

impl MockServer {
    pub async fn start(config: MockConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let log = Arc::new(Mutex::new(Log::default()));

        let task_log = Arc::clone(&log);
        tokio::spawn(async move {
            Self::handle_connection(listener, config, task_log).await;
        });

        Self { addr, log }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn requests(&self) -> Vec<Request> {
        self.log.lock().unwrap().requests.clone()
    }

    /// True if a request arrived while an earlier one was still unanswered.
    pub fn interleaved(&self) -> bool {
        self.log.lock().unwrap().interleaved
    }

    async fn handle_connection(listener: TcpListener, mut config: MockConfig, log: Arc<Mutex<Log>>) {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };

        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        let mut line = Vec::new();

        loop {
            line.clear();
            let n = match reader.read_until(b'\n', &mut line).await {
                Ok(n) => n,
                Err(_) => break,
            };
            if n == 0 {
                break;
            }

            if !config.response_delay.is_zero()
                && Self::request_pending(&mut reader, config.response_delay).await
            {
                log.lock().unwrap().interleaved = true;
            }

            let body = match Request::parse(&line) {
                Ok(request) => {
                    let body = Self::answer(&mut config, &request);
                    log.lock().unwrap().requests.push(request);
                    body
                }
                Err(e) => json!({"payload": {"error": e.to_string()}})
                    .to_string()
                    .into_bytes(),
            };

            let framed = frame::encode(&body).unwrap();
            let mut failed = false;
            for (i, piece) in framed.chunks(config.chunk_size.max(1)).enumerate() {
                // the frame is incomplete, so nothing may be sent yet
                if i > 0 && Self::request_pending(&mut reader, config.chunk_delay).await {
                    log.lock().unwrap().interleaved = true;
                }
                if write_half.write_all(piece).await.is_err() {
                    failed = true;
                    break;
                }
                let _ = write_half.flush().await;
                tokio::task::yield_now().await;
            }
            if failed {
                break;
            }
        }
    }

    /// Waits up to `wait` for unread request bytes; `Duration::ZERO` polls once.
    async fn request_pending<R: AsyncBufRead + Unpin>(reader: &mut R, wait: Duration) -> bool {
        matches!(
            tokio::time::timeout(wait, reader.fill_buf()).await,
            Ok(Ok(buf)) if !buf.is_empty()
        )
    }

    fn answer(config: &mut MockConfig, request: &Request) -> Vec<u8> {
        let reply = match request.command() {
            "request_token" if config.issue_token => {
                json!({"payload": {"token": config.token}})
            }
            "request_token" => json!({"payload": {}}),
            "auth" => {
                let payload = request.payload().cloned().unwrap_or_default();
                let expected = auth::sign_token(&config.password, &config.token);
                if payload["username"] == config.username.as_str()
                    && payload["signed_token"] == expected.as_str()
                {
                    json!({"payload": {"status": "ok"}})
                } else {
                    json!({"payload": {"error": "bad credentials"}})
                }
            }
            command => match config.responses.get_mut(command) {
                Some(queue) if queue.len() > 1 => return queue.pop_front().unwrap(),
                Some(queue) if queue.len() == 1 => return queue[0].clone(),
                _ => json!({"payload": {"error": format!("unknown command {command}")}}),
            },
        };
        reply.to_string().into_bytes()
    }
}

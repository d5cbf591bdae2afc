//! Minimal HTTP/1.1 server standing in for the supervised service.
//!
//! Each connection carries one request and is closed after the reply, so the
//! client never reuses a connection the fake has hung up on.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

/// Request as seen by the fake service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

/// How the fake answers a request.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Respond { status: u16, body: String },
    /// Closes the connection without writing a response.
    Hangup,
}

impl Reply {
    pub(crate) fn json(status: u16, body: &str) -> Self {
        Self::Respond {
            status,
            body: body.to_owned(),
        }
    }
}

type Handler = dyn Fn(&RecordedRequest) -> Reply + Send + Sync;

pub(crate) struct FakeService {
    port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl FakeService {
    /// Serves requests on an ephemeral port until dropped.
    pub(crate) fn spawn<F>(handler: F) -> Result<Self>
    where
        F: Fn(&RecordedRequest) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind fake service")?;
        listener
            .set_nonblocking(true)
            .context("fake service nonblocking")?;
        let port = listener.local_addr().context("local addr")?.port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let running = Arc::new(AtomicBool::new(true));
        let handler: Arc<Handler> = Arc::new(handler);
        let handle = {
            let requests = Arc::clone(&requests);
            let running = Arc::clone(&running);
            thread::spawn(move || serve(&listener, handler.as_ref(), &requests, &running))
        };
        Ok(Self {
            port,
            requests,
            running,
            handle: Some(handle),
        })
    }

    pub(crate) fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Requests received so far, excluding liveness probes.
    pub(crate) fn script_requests(&self) -> Result<Vec<RecordedRequest>> {
        let requests = self
            .requests
            .lock()
            .map_err(|error| anyhow!("lock requests: {error}"))?;
        Ok(requests
            .iter()
            .filter(|request| request.method == "POST")
            .cloned()
            .collect())
    }
}

impl Drop for FakeService {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve(
    listener: &TcpListener,
    handler: &Handler,
    requests: &Mutex<Vec<RecordedRequest>>,
    running: &AtomicBool,
) {
    while running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, _)) => {
                // A broken exchange only affects the client under test.
                let _ = handle_connection(stream, handler, requests);
            }
            Err(ref error) if error.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(5));
            }
            Err(_) => return,
        }
    }
}

fn handle_connection(
    stream: TcpStream,
    handler: &Handler,
    requests: &Mutex<Vec<RecordedRequest>>,
) -> Result<()> {
    stream.set_nonblocking(false).context("blocking stream")?;
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .context("read timeout")?;
    let request = read_request(&stream)?;
    let reply = handler(&request);
    requests
        .lock()
        .map_err(|error| anyhow!("lock requests: {error}"))?
        .push(request);
    match reply {
        Reply::Respond { status, body } => write_response(stream, status, &body),
        Reply::Hangup => {
            let _ = stream.shutdown(std::net::Shutdown::Both);
            Ok(())
        }
    }
}

fn read_request(stream: &TcpStream) -> Result<RecordedRequest> {
    let mut reader = BufReader::new(stream.try_clone().context("clone stream")?);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .context("read request line")?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_owned();
    let path = parts.next().unwrap_or_default().to_owned();

    let mut content_length = 0usize;
    let mut authorization = None;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).context("read header")?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse().context("content length")?;
            } else if name.eq_ignore_ascii_case("authorization") {
                authorization = Some(value.to_owned());
            }
        }
    }

    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).context("read body")?;
    Ok(RecordedRequest {
        method,
        path,
        authorization,
        body: String::from_utf8(body).context("utf-8 body")?,
    })
}

fn write_response(mut stream: TcpStream, status: u16, body: &str) -> Result<()> {
    let reason = match status {
        200 => "OK",
        401 => "Unauthorized",
        500 => "Internal Server Error",
        _ => "Status",
    };
    write!(
        stream,
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
    .context("write response")?;
    stream.flush().context("flush response")
}

//! Minimal HTTP/1.1 server for end-to-end tests.
//!
//! Serves a mutable set of resources keyed by request path. Each resource has a
//! status, an optional `ETag` and a body, all of which can be changed between
//! runs to simulate a new build being published.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Resource {
    status: u16,
    etag: Option<String>,
    body: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    resources: HashMap<String, Resource>,
    hits: HashMap<String, usize>,
}

#[derive(Clone)]
pub struct TestServer {
    base_url: String,
    state: Arc<Mutex<State>>,
}

impl TestServer {
    /// Starts the server in a background thread. It runs until the process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(State::default()));

        let server_state = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&server_state);
                thread::spawn(move || handle(stream, &state));
            }
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Publishes `body` at `path` with the given ETag (`None` omits the header).
    pub fn serve(&self, path: &str, etag: Option<&str>, body: &[u8]) {
        self.insert(
            path,
            Resource {
                status: 200,
                etag: etag.map(str::to_string),
                body: body.to_vec(),
            },
        );
    }

    /// Makes `path` answer with an error status.
    pub fn fail(&self, path: &str, status: u16) {
        self.insert(
            path,
            Resource {
                status,
                etag: None,
                body: b"failure".to_vec(),
            },
        );
    }

    /// Number of GET requests received for `path`.
    pub fn hits(&self, path: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.hits.get(&normalize(path)).copied().unwrap_or(0)
    }

    fn insert(&self, path: &str, resource: Resource) {
        let mut state = self.state.lock().unwrap();
        state.resources.insert(normalize(path), resource);
    }
}

fn normalize(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

    let Some(request) = read_request_head(&mut stream) else {
        return;
    };
    let mut parts = request.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or("/").to_string();

    let resource = {
        let mut state = state.lock().unwrap();
        *state.hits.entry(path.clone()).or_default() += 1;
        state.resources.get(&path).cloned()
    };
    let resource = resource.unwrap_or(Resource {
        status: 404,
        etag: None,
        body: b"not found".to_vec(),
    });

    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n",
        resource.status,
        reason(resource.status),
        resource.body.len()
    );
    if let Some(etag) = &resource.etag {
        head.push_str(&format!("ETag: {}\r\n", etag));
    }
    head.push_str("\r\n");

    tracing::trace!(%method, %path, status = resource.status, "Serving request");
    let _ = stream.write_all(head.as_bytes());
    if !method.eq_ignore_ascii_case("HEAD") {
        let _ = stream.write_all(&resource.body);
    }
    let _ = stream.flush();
}

fn read_request_head(stream: &mut TcpStream) -> Option<String> {
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8(request).ok()
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

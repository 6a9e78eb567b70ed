//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves fixed responses keyed by request path and counts hits per path.
//! Unknown paths get 404. A route can fail a number of times before it
//! starts answering, to exercise the retry policy.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Route {
    status: u16,
    body: Vec<u8>,
    location: Option<String>,
    /// Answer 503 this many times first.
    fail_first: u32,
}

#[derive(Default)]
pub struct ServerBuilder {
    routes: HashMap<String, Route>,
}

impl ServerBuilder {
    pub fn route(mut self, path: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                status,
                body: body.into(),
                location: None,
                fail_first: 0,
            },
        );
        self
    }

    pub fn flaky(mut self, path: &str, fail_first: u32, body: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                status: 200,
                body: body.into(),
                location: None,
                fail_first,
            },
        );
        self
    }

    pub fn redirect(mut self, path: &str, location: &str) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                status: 302,
                body: Vec::new(),
                location: Some(location.to_string()),
                fail_first: 0,
            },
        );
        self
    }

    /// Starts the server in a background thread. It runs until the process exits.
    pub fn start(self) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let routes = Arc::new(self.routes);
        let hits: Arc<Mutex<HashMap<String, u32>>> = Arc::default();
        let server_hits = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let hits = Arc::clone(&server_hits);
                thread::spawn(move || handle(stream, &routes, &hits));
            }
        });
        TestServer {
            base: format!("http://127.0.0.1:{port}"),
            hits,
        }
    }
}

pub struct TestServer {
    base: String,
    hits: Arc<Mutex<HashMap<String, u32>>>,
}

impl TestServer {
    /// Absolute URL for `path` on this server, e.g. `http://127.0.0.1:12345/dist`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn hits(&self, path: &str) -> u32 {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        404 => "Not Found",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Route>, hits: &Mutex<HashMap<String, u32>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    let request = String::from_utf8_lossy(&request);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    let hit = {
        let mut hits = hits.lock().unwrap();
        let n = hits.entry(path.clone()).or_insert(0);
        *n += 1;
        *n
    };

    let (status, body, location) = match routes.get(&path) {
        Some(route) if hit <= route.fail_first => (503, &b""[..], None),
        Some(route) => (route.status, &route.body[..], route.location.as_deref()),
        None => (404, &b"not found"[..], None),
    };

    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        reason(status),
        body.len()
    );
    if let Some(location) = location {
        head.push_str(&format!("Location: {location}\r\n"));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

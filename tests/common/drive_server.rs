//! Minimal HTTP/1.1 server simulating the Drive download endpoint for
//! integration tests.
//!
//! Serves a single static body at `/uc`. When a confirmation token is
//! configured, requests lacking `confirm=<token>` get an interstitial page
//! plus a `download_warning_*` cookie; requests carrying the right token get
//! the real body. Every request target is recorded so tests can assert how
//! many requests were made and with which query parameters.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, Default)]
pub struct DriveServerOptions {
    /// When set, requests without `confirm=<token>` are answered with the
    /// interstitial page and a `download_warning_*` cookie carrying this token.
    pub confirm_token: Option<String>,
    /// Body served on the interstitial page (never the real file).
    pub interstitial_body: Vec<u8>,
    /// Close this many leading connections without any response, simulating a
    /// transport-level failure.
    pub drop_first_requests: usize,
    /// Status line override, e.g. "404 Not Found". Default is "200 OK".
    pub status_line: Option<String>,
}

pub struct DriveServer {
    /// Endpoint URL to point the fetcher at (carries `export=download` like
    /// the real service, so appended parameters must not clobber it).
    pub endpoint: String,
    targets: Arc<Mutex<Vec<String>>>,
}

impl DriveServer {
    /// Request targets (path + query) seen so far, in arrival order.
    /// Dropped connections are recorded too.
    pub fn requests(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread serving `body`. The server runs
/// until the process exits.
pub fn start(body: Vec<u8>) -> DriveServer {
    start_with_options(body, DriveServerOptions::default())
}

/// Like `start` but allows simulating the interstitial, error statuses, and
/// dropped connections.
pub fn start_with_options(body: Vec<u8>, opts: DriveServerOptions) -> DriveServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let opts = Arc::new(opts);
    let targets: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let targets_srv = Arc::clone(&targets);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let opts = Arc::clone(&opts);
            let targets = Arc::clone(&targets_srv);
            thread::spawn(move || handle(stream, &body, &opts, &targets));
        }
    });
    DriveServer {
        endpoint: format!("http://127.0.0.1:{}/uc?export=download", port),
        targets,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    body: &[u8],
    opts: &DriveServerOptions,
    targets: &Mutex<Vec<String>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let target = match parse_target(request) {
        Some(t) => t,
        None => return,
    };

    let ordinal = {
        let mut seen = targets.lock().unwrap();
        seen.push(target.clone());
        seen.len()
    };
    if ordinal <= opts.drop_first_requests {
        // Close without a response; the client sees a transport error.
        return;
    }

    let status = opts.status_line.as_deref().unwrap_or("200 OK");

    let confirmed = match &opts.confirm_token {
        Some(token) => target.contains(&format!("confirm={}", token)),
        None => true,
    };
    if !confirmed {
        let token = opts.confirm_token.as_deref().unwrap_or_default();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: text/html\r\nSet-Cookie: download_warning_13058876669334088843={}; Path=/\r\nConnection: close\r\n\r\n",
            status,
            opts.interstitial_body.len(),
            token
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.write_all(&opts.interstitial_body);
        return;
    }

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body);
}

/// Returns the request target ("/uc?export=download&id=...") of a GET.
fn parse_target(request: &str) -> Option<String> {
    let line = request.lines().next()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    if !method.eq_ignore_ascii_case("GET") {
        return None;
    }
    parts.next().map(str::to_string)
}

//! Minimal HTTP/1.1 server playing the verification authority for
//! integration tests.
//!
//! Serves a scripted sequence of responses, one per request, and records
//! every request body it receives. Connections are handled sequentially so
//! response order matches attempt order.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

/// One scripted response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn error(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

/// Handle to a running scripted authority.
pub struct Authority {
    /// Endpoint URL to point the client at.
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl Authority {
    /// Request bodies received so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts the authority in a background thread. Each incoming request is
/// answered with the next scripted response; extra requests get 500.
/// The server runs until the process exits.
pub fn start(responses: Vec<Response>) -> Authority {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);
    thread::spawn(move || {
        let mut script = responses.into_iter();
        for stream in listener.incoming().flatten() {
            let response = script.next().unwrap_or(Response::error(500));
            handle(stream, &seen, response);
        }
    });
    Authority {
        url: format!("http://127.0.0.1:{}/submit-data", port),
        requests,
    }
}

fn handle(mut stream: std::net::TcpStream, seen: &Mutex<Vec<String>>, response: Response) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));

    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    // Read headers, then as much body as Content-Length promises.
    let body = loop {
        let n = match stream.read(&mut buf) {
            Ok(0) => return,
            Ok(n) => n,
            Err(_) => return,
        };
        raw.extend_from_slice(&buf[..n]);
        if let Some(split) = find_header_end(&raw) {
            let head = String::from_utf8_lossy(&raw[..split]).into_owned();
            let expected = content_length(&head);
            while raw.len() - split < expected {
                let n = match stream.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(_) => break,
                };
                raw.extend_from_slice(&buf[..n]);
            }
            break String::from_utf8_lossy(&raw[split..]).into_owned();
        }
    };
    seen.lock().unwrap().push(body);

    let reason = match response.status {
        200 => "OK",
        500 => "Internal Server Error",
        _ => "Error",
    };
    let reply = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        reason,
        response.body.len(),
        response.body
    );
    let _ = stream.write_all(reply.as_bytes());
}

/// Byte offset of the first position after the header terminator.
fn find_header_end(raw: &[u8]) -> Option<usize> {
    raw.windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|i| i + 4)
}

fn content_length(head: &str) -> usize {
    for line in head.lines() {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                return value.trim().parse().unwrap_or(0);
            }
        }
    }
    0
}

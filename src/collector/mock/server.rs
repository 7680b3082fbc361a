use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::model::HostEndpoint;

/// Loopback server that answers the n-th request line of every connection
/// with the n-th canned response, then hangs up.
pub struct MockServer {
    port: u16,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockServer {
    pub fn start(responses: Vec<String>) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                if serve(stream, &responses, &seen).is_err() {
                    continue;
                }
            }
        });

        Ok(Self { port, requests })
    }

    pub fn endpoint(&self) -> HostEndpoint {
        HostEndpoint::new("127.0.0.1", self.port)
    }

    /// Request lines received so far, without line terminators.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

fn serve(stream: TcpStream, responses: &[String], seen: &Mutex<Vec<String>>) -> io::Result<()> {
    let mut writer = stream.try_clone()?;
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    for response in responses {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }
        if let Ok(mut seen) = seen.lock() {
            seen.push(line.trim_end().to_string());
        }
        writer.write_all(response.as_bytes())?;
        writer.flush()?;
    }
    Ok(())
}

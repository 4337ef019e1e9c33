//! Minimal HTTP/1.1 server for exercising the network code in tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

type Routes = Arc<Mutex<HashMap<String, (u16, Vec<u8>)>>>;

pub struct TestServer {
    addr: SocketAddr,
    routes: Routes,
    requests: Arc<Mutex<Vec<String>>>,
}

pub struct TestServerBuilder {
    routes: HashMap<String, (u16, Vec<u8>)>,
}

impl TestServer {
    pub fn start() -> TestServerBuilder {
        TestServerBuilder {
            routes: HashMap::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Adds a route once the address is known, for bodies that link back
    /// to the server.
    pub fn add_route(&self, target: &str, status: u16, body: impl Into<Vec<u8>>) {
        self.routes
            .lock()
            .unwrap()
            .insert(target.to_string(), (status, body.into()));
    }

    /// Request targets (path and query) in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl TestServerBuilder {
    /// Serves `body` with `status` for `target`. A target with a query
    /// string must match exactly; a bare path matches any query.
    pub fn route(mut self, target: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(target.to_string(), (status, body.into()));
        self
    }

    pub async fn spawn(self) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let routes: Routes = Arc::new(Mutex::new(self.routes));

        let (served, log) = (routes.clone(), requests.clone());
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = served.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, &routes, &log).await;
                });
            }
        });

        TestServer {
            addr,
            routes,
            requests,
        }
    }
}

async fn serve(mut stream: TcpStream, routes: &Routes, log: &Mutex<Vec<String>>) -> std::io::Result<()> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        head.extend_from_slice(&buf[..n]);
    }

    let head = String::from_utf8_lossy(&head);
    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let path = target.split('?').next().unwrap_or("/").to_string();
    log.lock().unwrap().push(target.clone());

    let (status, body) = {
        let routes = routes.lock().unwrap();
        routes
            .get(&target)
            .or_else(|| routes.get(&path))
            .cloned()
            .unwrap_or((404, b"not found".to_vec()))
    };
    let header = format!(
        "HTTP/1.1 {status} X\r\nContent-Length: {}\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n",
        body.len()
    );
    stream.write_all(header.as_bytes()).await?;
    stream.write_all(&body).await?;
    stream.shutdown().await
}

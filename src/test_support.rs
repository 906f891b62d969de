//! A stand-in for the ODPT API, served by warp on an ephemeral port.

use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use warp::Filter;
use warp::http::StatusCode;
use warp::path::Tail;

#[derive(Default)]
pub struct MockOdpt {
    responses: HashMap<String, (u16, Value)>,
}

pub struct MockHandle {
    pub base_url: String,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockOdpt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, path: &str, status: u16, body: Value) -> Self {
        self.responses.insert(path.to_string(), (status, body));
        self
    }

    pub fn spawn(self) -> MockHandle {
        let responses = Arc::new(self.responses);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();

        let route = warp::path::tail()
            .and(warp::query::raw().or(warp::any().map(String::new)).unify())
            .map(move |tail: Tail, query: String| {
                log.lock()
                    .unwrap()
                    .push((tail.as_str().to_string(), query));
                let (status, body) = responses
                    .get(tail.as_str())
                    .cloned()
                    .unwrap_or((404, json!({ "error": "not found" })));
                warp::reply::with_status(
                    warp::reply::json(&body),
                    StatusCode::from_u16(status).unwrap(),
                )
            });

        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        MockHandle {
            base_url: format!("http://{addr}"),
            requests,
        }
    }
}

impl MockHandle {
    pub fn last_query(&self) -> Option<String> {
        self.requests.lock().unwrap().last().map(|(_, q)| q.clone())
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .count()
    }
}

/// A base URL nothing is listening on.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

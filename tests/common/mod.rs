#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use backcast::{FetchError, FetchOutcome, Fetcher};
use reqwest::StatusCode;
use sea_orm::DatabaseConnection;

pub async fn setup() -> DatabaseConnection {
    let _ = pretty_env_logger::try_init();
    backcast::db::connect("sqlite::memory:").await.unwrap()
}

/// Replays queued responses per URL. An exhausted queue answers 404.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: Mutex<HashMap<String, VecDeque<Result<FetchOutcome, FetchError>>>>,
    requests: Mutex<Vec<(String, Option<String>)>>,
}

impl ScriptedFetcher {
    pub fn body(&self, url: &str, body: &str, token: Option<&str>) {
        self.typed_body(url, body, token, None);
    }

    pub fn typed_body(&self, url: &str, body: &str, token: Option<&str>, content_type: Option<&str>) {
        self.push(
            url,
            Ok(FetchOutcome::Fetched {
                body: body.to_owned(),
                token: token.map(str::to_owned),
                content_type: content_type.map(str::to_owned),
            }),
        );
    }

    pub fn not_modified(&self, url: &str) {
        self.push(url, Ok(FetchOutcome::NotModified { token: None }));
    }

    pub fn fail(&self, url: &str) {
        self.push(url, Err(FetchError::Status(StatusCode::BAD_GATEWAY)));
    }

    fn push(&self, url: &str, response: Result<FetchOutcome, FetchError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(url.to_owned())
            .or_default()
            .push_back(response);
    }

    /// Every `(url, conditional token)` fetched so far.
    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, token: Option<&str>) -> Result<FetchOutcome, FetchError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_owned(), token.map(str::to_owned)));
        self.responses
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Err(FetchError::Status(StatusCode::NOT_FOUND)))
    }
}

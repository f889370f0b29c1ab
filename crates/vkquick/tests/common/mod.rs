#![allow(dead_code)]
//! Recording transport shared by the integration tests

use async_trait::async_trait;
use reqwest::Url;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use vkquick::prelude::*;

#[derive(Debug, Default)]
pub struct MockTransport {
    bodies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<Url>>,
}

impl MockTransport {
    /// Transport answering with `bodies` in order, then `{"response": 1}`
    pub fn with_bodies<I, S>(bodies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            bodies: Mutex::new(bodies.into_iter().map(Into::into).collect()),
            requests: Mutex::default(),
        })
    }

    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Url {
        self.requests().pop().expect("no request was sent")
    }

    /// Query of the last request as a map
    pub fn last_query(&self) -> HashMap<String, String> {
        self.last_request().query_pairs().into_owned().collect()
    }

    /// Query keys of the last request in wire order
    pub fn last_query_keys(&self) -> Vec<String> {
        self.last_request()
            .query_pairs()
            .map(|(k, _)| k.into_owned())
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_text(&self, url: Url) -> Result<String> {
        self.requests.lock().unwrap().push(url);
        Ok(self
            .bodies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| r#"{"response": 1}"#.to_string()))
    }
}

/// Client for a group token that never hits the network
pub async fn group_api(transport: Arc<MockTransport>) -> Api {
    Api::builder("test_token")
        .token_owner(TokenOwner::Group)
        .transport(transport)
        .build()
        .await
        .unwrap()
}

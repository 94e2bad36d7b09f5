//! Scripted advisor used by unit tests. Records every call it receives.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{AdvisorService, Endpoint, ServiceError, ServiceReply};

#[derive(Default)]
pub struct FakeAdvisor {
    replies: Mutex<HashMap<&'static str, VecDeque<Result<ServiceReply, String>>>>,
    calls: Mutex<Vec<(Endpoint, Value)>>,
}

impl FakeAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for the next call to `endpoint`.
    pub fn reply(self, endpoint: Endpoint, reply: ServiceReply) -> Self {
        self.push(endpoint, Ok(reply));
        self
    }

    /// Queues a transport failure for the next call to `endpoint`.
    pub fn fail(self, endpoint: Endpoint, message: &str) -> Self {
        self.push(endpoint, Err(message.to_string()));
        self
    }

    fn push(&self, endpoint: Endpoint, entry: Result<ServiceReply, String>) {
        self.replies
            .lock()
            .unwrap()
            .entry(endpoint.path())
            .or_default()
            .push_back(entry);
    }

    pub fn calls(&self) -> Vec<(Endpoint, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AdvisorService for FakeAdvisor {
    async fn post(&self, endpoint: Endpoint, body: Value) -> Result<ServiceReply, ServiceError> {
        self.calls.lock().unwrap().push((endpoint, body));
        let next = self
            .replies
            .lock()
            .unwrap()
            .get_mut(endpoint.path())
            .and_then(|queue| queue.pop_front());
        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(ServiceError::Malformed(message)),
            None => panic!("no scripted reply for {}", endpoint.path()),
        }
    }
}

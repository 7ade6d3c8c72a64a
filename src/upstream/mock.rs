// src/upstream/mock.rs
use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::upstream::types::{Page, TrendingSource, UpstreamError};

enum Step {
    Page(Page),
    Fail(String),
}

/// Test helper: replays a fixed sequence of pages and records every `max` it was asked for.
/// Not meant for production wiring; a poisoned lock panics.
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    pub requests: Mutex<Vec<Option<String>>>,
}

impl ScriptedSource {
    pub fn new(pages: Vec<Page>) -> Self {
        Self {
            steps: Mutex::new(pages.into_iter().map(Step::Page).collect()),
            requests: Mutex::new(vec![]),
        }
    }

    /// Queue a transport failure after the pages already scripted.
    pub fn then_fail(self, reason: &str) -> Self {
        self.steps
            .lock()
            .unwrap()
            .push_back(Step::Fail(reason.to_string()));
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl TrendingSource for ScriptedSource {
    async fn fetch_page(&self, max: Option<&str>) -> Result<Page, UpstreamError> {
        self.requests.lock().unwrap().push(max.map(str::to_string));
        match self.steps.lock().unwrap().pop_front() {
            Some(Step::Page(p)) => Ok(p),
            Some(Step::Fail(reason)) => Err(UpstreamError::Transport(anyhow!(reason).into())),
            None => Err(UpstreamError::Transport(
                anyhow!("scripted source exhausted").into(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Build an ok page holding `messages`, pointing at `max` for the next request.
pub fn page_of(messages: Vec<crate::upstream::types::Message>, max: Option<&str>) -> Page {
    use crate::upstream::types::{Cursor, ResponseMeta};
    Page {
        response: Some(ResponseMeta { status: Some(200) }),
        messages,
        cursor: Some(Cursor {
            max: max.map(str::to_string),
            since: None,
            more: Some(max.is_some()),
        }),
    }
}

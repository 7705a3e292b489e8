use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{OutboundRequest, RawResponse, Transport};

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Result<RawResponse, TransportError>>,
    sent: Vec<OutboundRequest>,
}

/// Answers requests from a fixed queue, in order. An exhausted queue is a transport error.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub(crate) fn respond(&self, status: u16, url: &str, body: &str) -> &Self {
        self.push(Ok(RawResponse {
            status,
            url: url.to_owned(),
            body: body.to_owned(),
        }));
        self
    }

    pub(crate) fn fail(&self, message: &str) -> &Self {
        self.push(Err(TransportError::new(message)));
        self
    }

    fn push(&self, reply: Result<RawResponse, TransportError>) {
        if let Ok(mut script) = self.script.lock() {
            script.replies.push_back(reply);
        }
    }

    pub(crate) fn sent(&self) -> Vec<OutboundRequest> {
        self.script
            .lock()
            .map(|script| script.sent.clone())
            .unwrap_or_default()
    }

    pub(crate) fn boxed(&self) -> Box<dyn Transport> {
        Box::new(self.clone())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
        let mut script = self
            .script
            .lock()
            .map_err(|_err| TransportError::new("script lock poisoned"))?;
        script.sent.push(request);
        script
            .replies
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("script exhausted")))
    }
}

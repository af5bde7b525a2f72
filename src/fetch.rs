use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{Post, SourceRecord};
use crate::error::HarvestError;

/// Raw answer from the posts endpoint. Status handling is left to the
/// [`Fetcher`] so transports stay dumb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    pub status: u16,
    pub body: String,
}

pub trait PostsTransport: Send + Sync {
    fn get_posts(&self, user_id: i64) -> Result<TransportReply, HarvestError>;
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, HarvestError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("post-harvest/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| HarvestError::Http(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| HarvestError::Http(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl PostsTransport for HttpTransport {
    fn get_posts(&self, user_id: i64) -> Result<TransportReply, HarvestError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("userId", user_id)])
            .send()
            .map_err(|err| HarvestError::Http(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|err| HarvestError::Http(err.to_string()))?;
        Ok(TransportReply { status, body })
    }
}

#[derive(Debug, Serialize)]
pub struct RequestFailure {
    pub user_id: i64,
    pub status: Option<u16>,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub posts: Vec<Post>,
    pub failures: Vec<RequestFailure>,
}

pub struct Fetcher<T: PostsTransport> {
    transport: T,
}

impl<T: PostsTransport> Fetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issues one request per record, in record order. A failed record
    /// contributes nothing and never stops the loop.
    pub fn fetch_all(&self, records: &[SourceRecord]) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();
        for record in records {
            let user_id = record.id;
            info!("fetching posts for user ID {user_id}");
            match self.fetch_one(user_id) {
                Ok(posts) => {
                    info!("retrieved {} posts for user ID {user_id}", posts.len());
                    outcome.posts.extend(posts);
                }
                Err(err) => {
                    let status = match &err {
                        HarvestError::Status { status, .. } => Some(*status),
                        _ => None,
                    };
                    match status {
                        Some(code) => {
                            warn!("failed to fetch posts for user ID {user_id}, status {code}")
                        }
                        None => warn!("failed to fetch posts for user ID {user_id}: {err}"),
                    }
                    outcome.failures.push(RequestFailure {
                        user_id,
                        status,
                        message: err.to_string(),
                    });
                }
            }
        }
        outcome
    }

    pub fn fetch_one(&self, user_id: i64) -> Result<Vec<Post>, HarvestError> {
        let reply = self.transport.get_posts(user_id)?;
        if reply.status != 200 {
            return Err(HarvestError::Status {
                status: reply.status,
                message: reply.body,
            });
        }
        serde_json::from_str(&reply.body).map_err(|err| HarvestError::Decode(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedTransport {
        replies: HashMap<i64, TransportReply>,
        calls: Mutex<Vec<i64>>,
    }

    impl ScriptedTransport {
        fn reply(mut self, user_id: i64, status: u16, body: &str) -> Self {
            self.replies.insert(
                user_id,
                TransportReply {
                    status,
                    body: body.to_string(),
                },
            );
            self
        }
    }

    impl PostsTransport for ScriptedTransport {
        fn get_posts(&self, user_id: i64) -> Result<TransportReply, HarvestError> {
            self.calls.lock().unwrap().push(user_id);
            self.replies
                .get(&user_id)
                .cloned()
                .ok_or_else(|| HarvestError::Http("operation timed out".to_string()))
        }
    }

    #[test]
    fn keeps_response_order_within_a_user() {
        let transport = ScriptedTransport::default().reply(
            1,
            200,
            r#"[{"userId":1,"id":5,"title":"b","body":""},{"userId":1,"id":3,"title":"a","body":""}]"#,
        );
        let fetcher = Fetcher::new(transport);
        let outcome = fetcher.fetch_all(&[SourceRecord::new(1)]);
        let ids: Vec<i64> = outcome.posts.iter().map(|post| post.id).collect();
        assert_eq!(ids, vec![5, 3]);
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn transport_error_is_recorded_and_skipped() {
        let transport = ScriptedTransport::default().reply(2, 200, "[]");
        let fetcher = Fetcher::new(transport);
        let outcome = fetcher.fetch_all(&[SourceRecord::new(1), SourceRecord::new(2)]);
        assert!(outcome.posts.is_empty());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].user_id, 1);
        assert_eq!(outcome.failures[0].status, None);
        assert_eq!(*fetcher.transport().calls.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn undecodable_body_is_a_decode_error() {
        let transport = ScriptedTransport::default().reply(4, 200, "<html>");
        let fetcher = Fetcher::new(transport);
        assert_matches!(fetcher.fetch_one(4), Err(HarvestError::Decode(_)));
    }

    #[test]
    fn non_200_carries_status() {
        let transport = ScriptedTransport::default().reply(9, 404, "{}");
        let fetcher = Fetcher::new(transport);
        assert_matches!(
            fetcher.fetch_one(9),
            Err(HarvestError::Status { status: 404, .. })
        );
    }
}

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use camino::Utf8PathBuf;

use post_harvest::config::PipelineConfig;
use post_harvest::error::HarvestError;
use post_harvest::fetch::{PostsTransport, TransportReply};

/// Answers from a fixed table and records every user id it was asked for.
#[derive(Default)]
pub struct MockTransport {
    replies: HashMap<i64, (u16, String)>,
    calls: Mutex<Vec<i64>>,
}

impl MockTransport {
    pub fn with_reply(mut self, user_id: i64, status: u16, body: &str) -> Self {
        self.replies.insert(user_id, (status, body.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<i64> {
        self.calls.lock().unwrap().clone()
    }
}

impl PostsTransport for MockTransport {
    fn get_posts(&self, user_id: i64) -> Result<TransportReply, HarvestError> {
        self.calls.lock().unwrap().push(user_id);
        match self.replies.get(&user_id) {
            Some((status, body)) => Ok(TransportReply {
                status: *status,
                body: body.clone(),
            }),
            None => Err(HarvestError::Http("connection refused".to_string())),
        }
    }
}

pub fn utf8_dir(dir: &Path) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.to_path_buf()).unwrap()
}

pub fn config_in(dir: &Path) -> PipelineConfig {
    let root = utf8_dir(dir);
    PipelineConfig {
        source_path: root.join("users.csv"),
        archive_path: root.join("users_data.json"),
        database_path: root.join("users.db"),
        api_url: "http://127.0.0.1:9/posts".to_string(),
        request_timeout_secs: 5,
    }
}

pub fn write_users(config: &PipelineConfig, ids: &[i64]) {
    let mut content = String::from("id,name,username,email\n");
    for id in ids {
        content.push_str(&format!("{id},User {id},user{id},user{id}@example.com\n"));
    }
    std::fs::write(config.source_path.as_std_path(), content).unwrap();
}

pub fn post_json(user_id: i64, id: i64) -> String {
    format!(
        r#"{{"userId":{user_id},"id":{id},"title":"Post {id}","body":"Content of post {id}"}}"#
    )
}

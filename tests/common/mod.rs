#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{Duration, Utc};
use discolog::auth::Token;
use discolog::navigate::Navigator;
use discolog::store::{KeyValueStore, StoreError};
use reqwest::Url;

/// In-memory key-value store for tests.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .values
            .lock()
            .expect("store lock poisoned")
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values
            .lock()
            .expect("store lock poisoned")
            .remove(key);
        Ok(())
    }
}

/// Recording navigator: tracks redirects and URL rewrites.
pub struct TestNavigator {
    current: Mutex<Url>,
    redirects: Mutex<Vec<String>>,
    replacements: Mutex<Vec<Url>>,
}

impl TestNavigator {
    pub fn at(url: &str) -> Self {
        Self {
            current: Mutex::new(Url::parse(url).expect("test URL")),
            redirects: Mutex::new(Vec::new()),
            replacements: Mutex::new(Vec::new()),
        }
    }

    pub fn set_url(&self, url: &str) {
        *self.current.lock().expect("navigator lock poisoned") =
            Url::parse(url).expect("test URL");
    }

    pub fn last_redirect(&self) -> Option<String> {
        self.redirects
            .lock()
            .expect("navigator lock poisoned")
            .last()
            .cloned()
    }

    pub fn last_replacement(&self) -> Option<Url> {
        self.replacements
            .lock()
            .expect("navigator lock poisoned")
            .last()
            .cloned()
    }

    pub fn redirect_count(&self) -> usize {
        self.redirects.lock().expect("navigator lock poisoned").len()
    }
}

impl Navigator for TestNavigator {
    fn current_url(&self) -> Url {
        self.current
            .lock()
            .expect("navigator lock poisoned")
            .clone()
    }

    fn replace_url(&self, url: &Url) {
        let mut current = self.current.lock().expect("navigator lock poisoned");
        *current = url.clone();
        self.replacements
            .lock()
            .expect("navigator lock poisoned")
            .push(url.clone());
    }

    fn redirect(&self, url: &str) {
        self.redirects
            .lock()
            .expect("navigator lock poisoned")
            .push(url.to_string());
    }
}

pub fn valid_token(access: &str) -> Token {
    Token {
        access_token: access.to_string(),
        expires_at: Utc::now() + Duration::hours(1),
        refresh_token: Some("refresh-1".to_string()),
    }
}

pub fn expired_token(access: &str, refresh: Option<&str>) -> Token {
    Token {
        access_token: access.to_string(),
        expires_at: Utc::now() - Duration::minutes(5),
        refresh_token: refresh.map(str::to_string),
    }
}

/// Token endpoint JSON body.
pub fn token_response_json(access: &str, refresh: Option<&str>) -> serde_json::Value {
    let mut body = serde_json::json!({
        "access_token": access,
        "token_type": "Bearer",
        "expires_in": 3600,
    });
    if let Some(refresh) = refresh {
        body["refresh_token"] = serde_json::Value::String(refresh.to_string());
    }
    body
}

//! Redis counter store implementation.
//!
//! Each counter is a hash with the fields `value`, `created` (epoch
//! seconds), and `ttl` (seconds). Writers are expected to also set a Redis
//! expiry on the key; readers re-check `created + ttl` themselves.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::{AsyncCommands, Value};
use tracing::debug;

use breakerboard_core::error::{AppError, ErrorKind};
use breakerboard_core::result::AppResult;
use breakerboard_core::traits::CounterStore;
use breakerboard_core::types::CounterEntry;

use super::client::RedisClient;

/// Hash field holding the counter value.
pub const FIELD_VALUE: &str = "value";
/// Hash field holding the creation time.
pub const FIELD_CREATED: &str = "created";
/// Hash field holding the TTL.
pub const FIELD_TTL: &str = "ttl";

/// Redis-backed counter store.
#[derive(Debug, Clone)]
pub struct RedisCounterStore {
    /// Redis client.
    client: RedisClient,
}

impl RedisCounterStore {
    /// Create a new Redis counter store.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Store, format!("Redis error: {e}"), e)
    }
}

/// Escape glob metacharacters so the prefix matches literally.
fn glob_escape(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Decode one hash into an entry.
///
/// Returns `None` for keys that expired between listing and reading, or
/// that were not written in the counter layout.
fn decode_entry(key: String, fields: &HashMap<String, String>) -> Option<CounterEntry> {
    let value = fields.get(FIELD_VALUE)?.parse().ok()?;
    let creation_time = fields.get(FIELD_CREATED)?.parse().ok()?;
    let ttl_seconds = fields.get(FIELD_TTL)?.parse().ok()?;
    Some(CounterEntry {
        key,
        value,
        creation_time,
        ttl_seconds,
    })
}

/// Read a reply as text, if it is one.
fn reply_text(reply: &Value) -> Option<String> {
    match reply {
        Value::BulkString(bytes) => String::from_utf8(bytes.clone()).ok(),
        Value::SimpleString(text) => Some(text.clone()),
        Value::Int(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read an `HGETALL` reply as a field map.
///
/// Error replies and anything that is not a hash (a key of another type
/// sharing the prefix yields `WRONGTYPE`) come back as `None`.
fn reply_fields(reply: &Value) -> Option<HashMap<String, String>> {
    match reply {
        Value::Map(pairs) => pairs
            .iter()
            .map(|(field, value)| Some((reply_text(field)?, reply_text(value)?)))
            .collect(),
        Value::Array(items) if items.len() % 2 == 0 => items
            .chunks(2)
            .map(|pair| Some((reply_text(&pair[0])?, reply_text(&pair[1])?)))
            .collect(),
        _ => None,
    }
}

/// Pair listed keys with their pipelined replies, keeping decodable entries.
fn decode_replies(keys: Vec<String>, replies: &[Value]) -> Vec<CounterEntry> {
    keys.into_iter()
        .zip(replies)
        .filter_map(|(key, reply)| decode_entry(key, &reply_fields(reply)?))
        .collect()
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn entries(&self, prefix: &str) -> AppResult<Vec<CounterEntry>> {
        let pattern = format!("{}*", glob_escape(prefix));
        let mut conn = self.client.conn_mut();

        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(&pattern)
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        pipe.ignore_errors();
        for key in &keys {
            pipe.hgetall(key);
        }
        let replies: Vec<Value> = pipe.query_async(&mut conn).await.map_err(Self::map_err)?;

        let listed = keys.len();
        let entries = decode_replies(keys, &replies);

        debug!(prefix, listed, count = entries.len(), "Listed counter entries");
        Ok(entries)
    }

    async fn get(&self, key: &str) -> AppResult<Option<i64>> {
        let mut conn = self.client.conn_mut();
        let result: Option<i64> = conn.hget(key, FIELD_VALUE).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_glob_escape() {
        assert_eq!(glob_escape("phystrix_cb_"), "phystrix_cb_");
        assert_eq!(glob_escape("a*b?[c]"), "a\\*b\\?\\[c\\]");
    }

    #[test]
    fn test_decode_entry() {
        let entry = decode_entry(
            "phystrix_cb_A_1_5".to_string(),
            &fields(&[("value", "4"), ("created", "1700000000"), ("ttl", "60")]),
        )
        .unwrap();
        assert_eq!(entry, CounterEntry::new("phystrix_cb_A_1_5", 4, 1_700_000_000, 60));
    }

    #[test]
    fn test_decode_vanished_key() {
        assert!(decode_entry("phystrix_cb_A_1_5".to_string(), &HashMap::new()).is_none());
    }

    fn bulk(text: &str) -> Value {
        Value::BulkString(text.as_bytes().to_vec())
    }

    fn hash_reply(pairs: &[(&str, &str)]) -> Value {
        Value::Array(
            pairs
                .iter()
                .flat_map(|(k, v)| [bulk(k), bulk(v)])
                .collect(),
        )
    }

    #[test]
    fn test_reply_fields_resp2_and_resp3() {
        let expected = fields(&[("value", "4"), ("created", "10")]);
        assert_eq!(
            reply_fields(&hash_reply(&[("value", "4"), ("created", "10")])),
            Some(expected.clone())
        );
        let map = Value::Map(vec![
            (bulk("value"), Value::Int(4)),
            (bulk("created"), bulk("10")),
        ]);
        assert_eq!(reply_fields(&map), Some(expected));
    }

    #[test]
    fn test_reply_fields_rejects_non_hash() {
        assert_eq!(reply_fields(&Value::Nil), None);
        assert_eq!(reply_fields(&bulk("17")), None);
        assert_eq!(reply_fields(&Value::Array(vec![bulk("value")])), None);
    }

    #[test]
    fn test_non_hash_key_does_not_drop_siblings() {
        let keys = vec![
            "phystrix_cb_A_1_5".to_string(),
            "phystrix_cb_lock".to_string(),
            "phystrix_cb_B_1_5".to_string(),
        ];
        let replies = vec![
            hash_reply(&[("value", "4"), ("created", "1700000000"), ("ttl", "60")]),
            Value::SimpleString("WRONGTYPE Operation against a key holding the wrong kind of value".to_string()),
            hash_reply(&[("value", "2"), ("created", "1700000001"), ("ttl", "60")]),
        ];

        let entries = decode_replies(keys, &replies);
        assert_eq!(
            entries,
            vec![
                CounterEntry::new("phystrix_cb_A_1_5", 4, 1_700_000_000, 60),
                CounterEntry::new("phystrix_cb_B_1_5", 2, 1_700_000_001, 60),
            ]
        );
    }

    #[test]
    fn test_decode_garbage_value() {
        let decoded = decode_entry(
            "phystrix_cb_A_1_5".to_string(),
            &fields(&[("value", "x"), ("created", "1"), ("ttl", "60")]),
        );
        assert!(decoded.is_none());
    }
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::{borrow::Cow, collections::HashMap, marker::PhantomData, sync::Arc, time::Duration};

use inception_tier::{CacheTier, Codec, Error};
use redis::aio::ConnectionManager;

use crate::builder::{DEFAULT_NAME, RedisTierBuilder};

/// A cache tier stored in Redis.
///
/// Values are encoded with the codec `C` and written with a per-entry
/// millisecond expiry. Payloads that fail to decode are logged and reported as
/// absent, so a schema change never turns into a read error.
///
/// Clones share the same connection manager.
pub struct RedisTier<V, C> {
    connection: ConnectionManager,
    codec: Arc<C>,
    key_prefix: Option<Arc<str>>,
    name: Arc<str>,
    _value: PhantomData<fn() -> V>,
}

impl<V, C> Clone for RedisTier<V, C> {
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            codec: Arc::clone(&self.codec),
            key_prefix: self.key_prefix.clone(),
            name: Arc::clone(&self.name),
            _value: PhantomData,
        }
    }
}

impl<V, C> std::fmt::Debug for RedisTier<V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisTier")
            .field("name", &self.name)
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

impl<V, C> RedisTier<V, C>
where
    C: Codec<V>,
{
    /// Creates a builder around an existing connection manager.
    ///
    /// The caller keeps ownership of the connection lifecycle; the tier only
    /// clones the handle.
    #[must_use]
    pub fn builder(connection: ConnectionManager, codec: C) -> RedisTierBuilder<V, C> {
        RedisTierBuilder::new(connection, codec)
    }

    pub(crate) fn from_builder(builder: RedisTierBuilder<V, C>) -> Self {
        Self {
            connection: builder.connection,
            codec: Arc::new(builder.codec),
            key_prefix: builder.key_prefix.map(Arc::from),
            name: Arc::from(builder.name.unwrap_or_else(|| DEFAULT_NAME.to_owned())),
            _value: PhantomData,
        }
    }

    /// Returns every decodable member of the set stored at `key`.
    ///
    /// Members that fail to decode are logged and skipped. A missing key yields an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the Redis command fails.
    pub async fn get_set(&self, key: &str) -> Result<Vec<V>, Error> {
        let key = self.key(key);
        let mut connection = self.connection.clone();
        let members: Vec<Vec<u8>> = redis::cmd("SMEMBERS")
            .arg(key.as_ref())
            .query_async(&mut connection)
            .await
            .map_err(Error::from_message)?;

        Ok(members.iter().filter_map(|payload| self.decode(&key, payload)).collect())
    }

    /// Adds `values` to the set stored at `key`.
    ///
    /// When `ttl` is given, the whole set expires after it. Adding an empty slice is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be encoded, `ttl` is zero, or the Redis
    /// command fails.
    pub async fn add_to_set(&self, key: &str, values: &[V], ttl: Option<Duration>) -> Result<(), Error> {
        if values.is_empty() {
            return Ok(());
        }

        let key = self.key(key);
        let members = self.encode_all(values)?;

        let mut pipe = redis::pipe();
        pipe.atomic().cmd("SADD").arg(key.as_ref()).arg(members).ignore();
        if let Some(ttl) = ttl {
            pipe.cmd("PEXPIRE").arg(key.as_ref()).arg(ttl_millis(ttl)?).ignore();
        }

        let mut connection = self.connection.clone();
        let (): () = pipe.query_async(&mut connection).await.map_err(Error::from_message)?;
        Ok(())
    }

    /// Removes `values` from the set stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be encoded or the Redis command fails.
    pub async fn remove_from_set(&self, key: &str, values: &[V]) -> Result<(), Error> {
        if values.is_empty() {
            return Ok(());
        }

        let key = self.key(key);
        let members = self.encode_all(values)?;

        let mut connection = self.connection.clone();
        let (): () = redis::cmd("SREM")
            .arg(key.as_ref())
            .arg(members)
            .query_async(&mut connection)
            .await
            .map_err(Error::from_message)?;
        Ok(())
    }

    fn key<'a>(&self, key: &'a str) -> Cow<'a, str> {
        prefixed(self.key_prefix.as_deref(), key)
    }

    fn encode_all(&self, values: &[V]) -> Result<Vec<Vec<u8>>, Error> {
        values.iter().map(|value| self.codec.encode(value)).collect()
    }

    fn decode(&self, key: &str, payload: &[u8]) -> Option<V> {
        match self.codec.decode(payload) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(
                    cache.tier = %self.name,
                    cache.key = key,
                    error = %error,
                    "discarding undecodable payload"
                );
                None
            }
        }
    }
}

impl<V, C> CacheTier<V> for RedisTier<V, C>
where
    V: Send,
    C: Codec<V>,
{
    async fn get(&self, key: &str) -> Result<Option<V>, Error> {
        let key = self.key(key);
        let mut connection = self.connection.clone();
        let payload: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key.as_ref())
            .query_async(&mut connection)
            .await
            .map_err(Error::from_message)?;

        Ok(payload.and_then(|payload| self.decode(&key, &payload)))
    }

    async fn get_batch(&self, keys: &[&str]) -> Result<Vec<Option<V>>, Error> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<Cow<'_, str>> = keys.iter().map(|key| self.key(key)).collect();
        let mut connection = self.connection.clone();
        let payloads: Vec<Option<Vec<u8>>> = redis::cmd("MGET")
            .arg(keys.iter().map(AsRef::as_ref).collect::<Vec<&str>>())
            .query_async(&mut connection)
            .await
            .map_err(Error::from_message)?;

        Ok(keys
            .iter()
            .zip(payloads)
            .map(|(key, payload)| payload.and_then(|payload| self.decode(key, &payload)))
            .collect())
    }

    async fn set(&self, key: &str, value: V, ttl: Duration) -> Result<(), Error> {
        let millis = ttl_millis(ttl)?;
        let payload = self.codec.encode(&value)?;
        let key = self.key(key);

        let mut connection = self.connection.clone();
        let (): () = redis::cmd("PSETEX")
            .arg(key.as_ref())
            .arg(millis)
            .arg(payload)
            .query_async(&mut connection)
            .await
            .map_err(Error::from_message)?;
        Ok(())
    }

    async fn set_batch(&self, values: HashMap<String, V>, ttl: Duration) -> Result<(), Error> {
        if values.is_empty() {
            return Ok(());
        }

        let millis = ttl_millis(ttl)?;
        let mut pipe = redis::pipe();
        for (key, value) in &values {
            let payload = self.codec.encode(value)?;
            pipe.cmd("PSETEX").arg(self.key(key).as_ref()).arg(millis).arg(payload).ignore();
        }

        let mut connection = self.connection.clone();
        let (): () = pipe.query_async(&mut connection).await.map_err(Error::from_message)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        let key = self.key(key);
        let mut connection = self.connection.clone();
        let (): () = redis::cmd("DEL")
            .arg(key.as_ref())
            .query_async(&mut connection)
            .await
            .map_err(Error::from_message)?;
        Ok(())
    }

    async fn delete_batch(&self, keys: &[&str]) -> Result<(), Error> {
        if keys.is_empty() {
            return Ok(());
        }

        let keys: Vec<Cow<'_, str>> = keys.iter().map(|key| self.key(key)).collect();
        let mut connection = self.connection.clone();
        let (): () = redis::cmd("DEL")
            .arg(keys.iter().map(AsRef::as_ref).collect::<Vec<&str>>())
            .query_async(&mut connection)
            .await
            .map_err(Error::from_message)?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn prefixed<'a>(prefix: Option<&str>, key: &'a str) -> Cow<'a, str> {
    match prefix {
        Some(prefix) => Cow::Owned(format!("{prefix}{key}")),
        None => Cow::Borrowed(key),
    }
}

/// Converts a TTL to whole milliseconds for `PSETEX`/`PEXPIRE`.
///
/// Sub-millisecond remainders are truncated; a TTL that truncates to zero is
/// rejected because Redis refuses a zero expiry.
fn ttl_millis(ttl: Duration) -> Result<u64, Error> {
    let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
    if millis == 0 {
        return Err(Error::from_message(format!("ttl {ttl:?} is shorter than one millisecond")));
    }
    Ok(millis)
}

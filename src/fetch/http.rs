use super::{ACCEPT_LANGUAGE, Opts, USER_AGENT};
use http_cache_reqwest::{
    Cache, CacheMode, HttpCache, HttpCacheOptions, MokaCache, MokaCacheBuilder, MokaManager,
};
use reqwest::{
    IntoUrl,
    header::{self, HeaderMap, HeaderValue},
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use std::{collections::hash_map::RandomState, sync::Arc};
use tracing::trace;

type MCache = MokaCache<String, Arc<Vec<u8>>, RandomState>;

impl Opts {
    fn cache_mode(&self) -> CacheMode {
        if self.cache_ttl.is_zero() {
            return CacheMode::NoStore;
        }
        // Default would revalidate on every request, which defeats the point for a page that
        // changes once a week
        CacheMode::ForceCache
    }

    fn build_cache(&self) -> MCache {
        let builder = MokaCacheBuilder::new(self.cache_capacity as u64).name("HansikPageCache");
        if self.cache_ttl.is_zero() {
            return builder.build();
        }
        builder.time_to_live(self.cache_ttl).build()
    }

    fn build_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE),
        );
        reqwest::ClientBuilder::new()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
    }
}

/// Plain HTTP client with an optional in-memory response cache
#[derive(Clone)]
pub struct Client {
    client: ClientWithMiddleware,
}

impl Client {
    pub fn build(opts: &Opts) -> reqwest::Result<Self> {
        trace!(ttl = ?opts.cache_ttl, capacity = opts.cache_capacity, "Building HTTP client");
        Ok(Self {
            client: ClientBuilder::new(opts.build_client()?)
                .with(Cache(HttpCache {
                    mode: opts.cache_mode(),
                    manager: MokaManager::new(opts.build_cache()),
                    options: HttpCacheOptions::default(),
                }))
                .build(),
        })
    }

    pub async fn get_as_string<U: IntoUrl>(&self, url: U) -> anyhow::Result<String> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
            .map_err(anyhow::Error::from)
    }
}

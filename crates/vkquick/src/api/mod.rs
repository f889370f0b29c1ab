//! Access to the VK API methods
//!
//! A method `some.method` with parameter `foo=1` is nothing more than
//! `GET https://api.vk.com/method/some.method?foo=1&access_token=...&v=...`.
//! [`Api`] takes care of the token, the version, parameter encoding,
//! request pacing and error checking.
pub mod method;
pub mod net;
pub mod ratelimit;
pub mod types;

use crate::config::CONFIG;
use crate::error::{Result, VkError};
use method::{MethodCall, is_valid_method_name, to_camel_case};
use net::{ConnectionPool, Transport};
use ratelimit::RequestPacer;
use reqwest::Url;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use types::*;

/// Client for the VK API
///
/// Cheap to clone: clones share the token, the transport and the pacer.
///
/// ```no_run
/// use vkquick::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let api = Api::builder("mytoken")
///         .autocomplete_param("group_id", 123)
///         .build()
///         .await?;
///
///     // Same request three ways
///     api.call("messages.getConversationsById", [("peer_ids", peer(1))]).await?;
///     api.method("messages.get_conversations_by_id")
///         .param("peer_ids", peer(1))
///         .send()
///         .await?;
///     api.path("messages")
///         .path("get_conversations_by_id")
///         .param("peer_ids", peer(1))
///         .autocomplete()
///         .send()
///         .await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Api {
    inner: Arc<ApiInner>,
}

struct ApiInner {
    token: Arc<str>,
    version: Arc<str>,
    base_url: Url,
    autocomplete_params: Params,
    token_owner: TokenOwner,
    pacer: RequestPacer,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("version", &self.inner.version)
            .field("base_url", &self.inner.base_url.as_str())
            .field("token_owner", &self.inner.token_owner)
            .field("autocomplete_params", &self.inner.autocomplete_params)
            .finish_non_exhaustive()
    }
}

impl Api {
    /// Start configuring a client for `token`
    pub fn builder(token: impl Into<String>) -> ApiBuilder {
        ApiBuilder::new(token)
    }

    /// Client with default settings. Detects the token owner with one request
    ///
    /// ## Errors
    /// - `VkError::Api` - token is rejected by VK
    /// - `VkError::Network` - detection request failed
    pub async fn new(token: impl Into<String>) -> Result<Self> {
        Self::builder(token).build().await
    }

    /// Client with default settings, token from `VKQUICK_TOKEN`
    ///
    /// ## Errors
    /// - `VkError::Config` - variable is not set
    pub async fn from_env() -> Result<Self> {
        let token = std::env::var(VKQUICK_TOKEN)?;
        debug!("Token successfully obtained from environment");
        Self::new(token).await
    }

    /// Start a call of the method `name`, e.g. `"messages.send"`.
    /// snake_case names are converted to camelCase
    pub fn method(&self, name: impl Into<String>) -> MethodCall<'_> {
        MethodCall::new(self, name)
    }

    /// Start a call whose name is built one segment at a time
    pub fn path(&self, segment: &str) -> MethodCall<'_> {
        MethodCall::new(self, String::new()).path(segment)
    }

    /// Call `name` with `params` and return the `response` member
    ///
    /// ## Errors
    /// - `VkError::Api` - VK answered with an error object
    /// - `VkError::Network` - request failed after retries
    /// - `VkError::Serialization` - body is not JSON
    pub async fn call<I, K, V>(&self, name: &str, params: I) -> Result<Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.method(name).params(params).send().await
    }

    pub fn token_owner(&self) -> TokenOwner {
        self.inner.token_owner
    }

    pub fn version(&self) -> &str {
        &self.inner.version
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Interval kept between two requests of this client
    pub fn request_delay(&self) -> Duration {
        self.inner.pacer.delay()
    }

    pub fn autocomplete_params(&self) -> &Params {
        &self.inner.autocomplete_params
    }

    pub fn pacer(&self) -> &RequestPacer {
        &self.inner.pacer
    }

    /// Add `access_token` and `v` in front of the caller's params.
    /// The caller may override both
    pub(crate) fn fill_request_params(&self, params: Params) -> Params {
        let mut filled = Params::from([
            ("access_token", ParamValue::from(self.inner.token.as_ref())),
            ("v", ParamValue::from(self.inner.version.as_ref())),
        ]);
        filled.extend(params);
        filled
    }

    #[tracing::instrument(skip(self, params))]
    pub(crate) async fn execute(
        &self,
        name: &str,
        params: Params,
        autocomplete: bool,
    ) -> Result<Value> {
        let method_name = to_camel_case(name);
        if method_name.is_empty() {
            return Err(VkError::Validation("Method name is empty".to_string()));
        }

        let mut params = self.fill_request_params(params);
        if autocomplete {
            params.extend(self.inner.autocomplete_params.clone());
        }

        let url = build_method_url(&self.inner.base_url, &method_name, &params)?;

        // Retries happen inside the transport, after its own backoff.
        // The default pool never backs off for less than the pacer delay
        self.inner.pacer.wait().await;
        debug!("Calling {} with {} params", method_name, params.len());
        let body = self.inner.transport.get_text(url).await?;

        parse_response(&body)
    }

    /// Find out whether `token` belongs to a user or to a group
    ///
    /// `users.get` without ids returns the token's user, and nothing for a
    /// group token.
    ///
    /// ## Errors
    /// - `VkError::Api` - token is rejected by VK
    #[tracing::instrument(skip(token, transport))]
    pub async fn define_token_owner(
        token: &str,
        version: &str,
        base_url: &Url,
        transport: &dyn Transport,
    ) -> Result<TokenOwner> {
        let params = Params::from([("access_token", token), ("v", version)]);
        let url = build_method_url(base_url, "users.get", &params)?;
        let response = parse_response(&transport.get_text(url).await?)?;

        let owner = match response {
            Value::Array(users) if !users.is_empty() => TokenOwner::User,
            _ => TokenOwner::Group,
        };
        info!("Token owner is {}", owner);
        Ok(owner)
    }
}

/// `{base_url}method/{name}?{params}`
///
/// `name` is resolved against the base URL, so anything that could change
/// the host or the path prefix is rejected before the token is attached.
pub(crate) fn build_method_url(base_url: &Url, name: &str, params: &Params) -> Result<Url> {
    if !is_valid_method_name(name) {
        return Err(VkError::Validation(format!("Invalid method name: {name:?}")));
    }
    let mut url = base_url.join("method/")?.join(name)?;
    url.query_pairs_mut().extend_pairs(params.query_pairs());
    Ok(url)
}

pub(crate) fn parse_response(body: &str) -> Result<Value> {
    let wrapper: ApiResponseWrapper = serde_json::from_str(body)?;
    wrapper.into()
}

/// Builder for [`Api`]
pub struct ApiBuilder {
    token: String,
    version: String,
    host: String,
    base_url: Option<Url>,
    autocomplete_params: Params,
    token_owner: Option<TokenOwner>,
    transport: Option<Arc<dyn Transport>>,
}

impl ApiBuilder {
    /// Builder with version and host taken from [`CONFIG`]
    pub fn new(token: impl Into<String>) -> Self {
        let cfg = &CONFIG.api;
        Self {
            token: token.into(),
            version: cfg.version.to_string(),
            host: cfg.host.to_string(),
            base_url: None,
            autocomplete_params: Params::new(),
            token_owner: None,
            transport: None,
        }
    }

    pub fn version(mut self, version: impl fmt::Display) -> Self {
        self.version = version.to_string();
        self
    }

    /// Host for `https://{host}/method/...`
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Full base URL, takes precedence over [`host`](Self::host).
    /// Handy for proxies and local test servers
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Params merged into calls marked with
    /// [`MethodCall::autocomplete`]
    pub fn autocomplete_params(mut self, params: impl Into<Params>) -> Self {
        self.autocomplete_params = params.into();
        self
    }

    pub fn autocomplete_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Self {
        self.autocomplete_params.insert(key, value);
        self
    }

    /// Skip the detection request and use `owner`
    pub fn token_owner(mut self, owner: TokenOwner) -> Self {
        self.token_owner = Some(owner);
        self
    }

    /// Use `transport` instead of [`ConnectionPool::optimized`]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client. Unless the owner was given, asks VK who owns the token
    ///
    /// ## Errors
    /// - `VkError::Validation` - token is empty
    /// - `VkError::Url` - host or base URL is not valid
    /// - `VkError::Api` - token is rejected during detection
    pub async fn build(mut self) -> Result<Api> {
        if self.token.is_empty() {
            return Err(VkError::Validation("Access token is empty".to_string()));
        }

        let base_url = match self.base_url.take() {
            Some(url) => url,
            None => Url::parse(&format!("https://{}/", self.host))?,
        };
        debug!("API base URL: {}", base_url);

        let (transport, token_owner): (Arc<dyn Transport>, _) = match self.transport.take() {
            Some(transport) => {
                let owner = self.resolve_token_owner(&base_url, transport.as_ref()).await?;
                (transport, owner)
            }
            None => {
                let pool = ConnectionPool::optimized();
                let owner = self.resolve_token_owner(&base_url, &pool).await?;
                (Arc::new(pool.with_min_backoff(owner.request_delay())), owner)
            }
        };

        Ok(Api {
            inner: Arc::new(ApiInner {
                token: Arc::from(self.token),
                version: Arc::from(self.version),
                base_url,
                autocomplete_params: self.autocomplete_params,
                pacer: RequestPacer::new(token_owner.request_delay()),
                token_owner,
                transport,
            }),
        })
    }

    async fn resolve_token_owner(
        &self,
        base_url: &Url,
        transport: &dyn Transport,
    ) -> Result<TokenOwner> {
        match self.token_owner {
            Some(owner) => Ok(owner),
            None => Api::define_token_owner(&self.token, &self.version, base_url, transport).await,
        }
    }
}

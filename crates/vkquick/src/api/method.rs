//! Building method names and per-call parameters
use crate::api::Api;
use crate::api::types::{ParamValue, Params};
use crate::error::Result;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;

static SNAKE_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_(?P<let>[a-z])").expect("valid snake_case pattern"));

static METHOD_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.]+$").expect("valid method name pattern"));

/// Convert a snake_case method name to the camelCase form VK expects
///
/// Only `_` followed by a lowercase letter is rewritten, so names that are
/// already camelCase pass through untouched.
///
/// ```
/// use vkquick::api::method::to_camel_case;
///
/// assert_eq!(to_camel_case("messages.get_conversations_by_id"), "messages.getConversationsById");
/// assert_eq!(to_camel_case("users.get"), "users.get");
/// ```
pub fn to_camel_case(name: &str) -> Cow<'_, str> {
    SNAKE_SEGMENT.replace_all(name, |caps: &Captures| caps["let"].to_uppercase())
}

/// Whether `name` may be placed after `method/` in a request URL.
/// Slashes, colons, `?` and the like would let the name escape the API host
pub fn is_valid_method_name(name: &str) -> bool {
    METHOD_NAME.is_match(name)
}

/// A single API call being put together
///
/// Created by [`Api::method`] or [`Api::path`]. Owns its name and
/// parameters, so building a call never touches the shared client.
#[derive(Debug, Clone)]
#[must_use = "a method call does nothing until `send` is awaited"]
pub struct MethodCall<'a> {
    api: &'a Api,
    name: String,
    params: Params,
    autocomplete: bool,
}

impl<'a> MethodCall<'a> {
    pub(crate) fn new(api: &'a Api, name: impl Into<String>) -> Self {
        Self {
            api,
            name: name.into(),
            params: Params::new(),
            autocomplete: false,
        }
    }

    /// Append one dotted segment to the method name
    ///
    /// `api.path("messages").path("get_by_id")` calls `messages.getById`.
    pub fn path(mut self, segment: &str) -> Self {
        if !self.name.is_empty() {
            self.name.push('.');
        }
        self.name.push_str(&to_camel_case(segment));
        self
    }

    /// Set one request parameter, replacing a previous value of `key`
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key, value);
        self
    }

    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.params.extend(params);
        self
    }

    /// Merge the client's autocomplete params into this call
    ///
    /// They are applied last and take precedence over parameters set on the
    /// call itself.
    pub fn autocomplete(mut self) -> Self {
        self.autocomplete = true;
        self
    }

    /// Method name in the form it will be sent
    pub fn name(&self) -> Cow<'_, str> {
        to_camel_case(&self.name)
    }

    pub fn get_params(&self) -> &Params {
        &self.params
    }

    /// Send the call and return the `response` member as JSON
    pub async fn send(self) -> Result<Value> {
        self.api
            .execute(&self.name, self.params, self.autocomplete)
            .await
    }

    /// Send the call and deserialize the `response` member into `T`
    pub async fn send_as<T: DeserializeOwned>(self) -> Result<T> {
        let value = self.send().await?;
        Ok(serde_json::from_value(value)?)
    }
}

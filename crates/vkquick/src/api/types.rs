//! API types
use crate::error::{ApiError, Result, VkError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;
use tracing::debug;

/// Environment variable name for the access token
pub const VKQUICK_TOKEN: &str = "VKQUICK_TOKEN";
/// API version sent when none is configured
pub const DEFAULT_API_VERSION: &str = "5.133";
/// Host serving `/method/` requests
pub const DEFAULT_API_HOST: &str = "api.vk.com";
/// Offset between a chat id and its peer id
pub const PEER_ID_OFFSET: i64 = 2_000_000_000;

/// Peer id of the chat with local id `chat_id`
///
/// ```
/// assert_eq!(vkquick::peer(1), 2_000_000_001);
/// ```
pub fn peer(chat_id: i64) -> i64 {
    chat_id + PEER_ID_OFFSET
}

/// Owner of the access token. Defines the delay between API requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenOwner {
    Group,
    User,
}

impl TokenOwner {
    /// Minimal interval between two requests made with one token
    pub fn request_delay(&self) -> Duration {
        match self {
            TokenOwner::User => Duration::from_secs_f64(1.0 / 3.0),
            TokenOwner::Group => Duration::from_millis(50),
        }
    }
}

impl Display for TokenOwner {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TokenOwner::Group => write!(f, "group"),
            TokenOwner::User => write!(f, "user"),
        }
    }
}

/// Value of a single request parameter
///
/// The API accepts only flat text values, so lists go over the wire
/// joined with `,` and booleans as `1`/`0`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<ParamValue>),
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Bool(b) => f.write_str(if *b { "1" } else { "0" }),
            ParamValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Str(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

macro_rules! param_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ParamValue {
                fn from(value: $t) -> Self {
                    ParamValue::Int(i64::from(value))
                }
            }
        )*
    };
}

param_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! param_from_wide_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ParamValue {
                fn from(value: $t) -> Self {
                    i64::try_from(value)
                        .map(ParamValue::Int)
                        .unwrap_or_else(|_| ParamValue::Str(value.to_string()))
                }
            }
        )*
    };
}

param_from_wide_int!(u64, usize);

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(f64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue> + Clone> From<&[T]> for ParamValue {
    fn from(values: &[T]) -> Self {
        ParamValue::List(values.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue>, const N: usize> From<[T; N]> for ParamValue {
    fn from(values: [T; N]) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => ParamValue::Str(s),
            Value::Bool(b) => ParamValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ParamValue::Int(i),
                None => n
                    .as_f64()
                    .map(ParamValue::Float)
                    .unwrap_or_else(|| ParamValue::Str(n.to_string())),
            },
            Value::Array(items) => ParamValue::List(items.into_iter().map(Into::into).collect()),
            Value::Null => ParamValue::Str(String::new()),
            Value::Object(_) => ParamValue::Str(value.to_string()),
        }
    }
}

/// Ordered request parameters
///
/// Keeps insertion order. Inserting an existing key replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(String, ParamValue)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`, returning the previous value
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Key/value pairs in their wire form
    pub fn query_pairs(&self) -> impl Iterator<Item = (&str, String)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.to_string()))
    }
}

impl<K: Into<String>, V: Into<ParamValue>> Extend<(K, V)> for Params {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        params.extend(iter);
        params
    }
}

impl<K: Into<String>, V: Into<ParamValue>, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl IntoIterator for Params {
    type Item = (String, ParamValue);
    type IntoIter = std::vec::IntoIter<(String, ParamValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Envelope of every API answer: either `response` or `error`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ApiResponseWrapper {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl From<ApiResponseWrapper> for Result<Value> {
    fn from(wrapper: ApiResponseWrapper) -> Self {
        match wrapper {
            ApiResponseWrapper {
                error: Some(error), ..
            } => {
                debug!("Answer contains error {}", error.error_code);
                Err(VkError::Api(error))
            }
            ApiResponseWrapper {
                response: Some(response),
                ..
            } => Ok(response),
            _ => Err(VkError::Validation(
                "Answer has neither response nor error".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_peer() {
        assert_eq!(peer(1), 2_000_000_001);
        assert_eq!(peer(0), PEER_ID_OFFSET);
    }

    #[test]
    fn test_token_owner_delay() {
        assert_eq!(TokenOwner::Group.request_delay(), Duration::from_millis(50));
        let user = TokenOwner::User.request_delay();
        assert!(user > Duration::from_millis(333) && user < Duration::from_millis(334));
    }

    #[test]
    fn test_token_owner_serde() {
        assert_eq!(serde_json::to_string(&TokenOwner::Group).unwrap(), "\"group\"");
        let owner: TokenOwner = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(owner, TokenOwner::User);
        assert_eq!(TokenOwner::User.to_string(), "user");
    }

    #[test]
    fn test_param_value_display() {
        assert_eq!(ParamValue::from("text").to_string(), "text");
        assert_eq!(ParamValue::from(42).to_string(), "42");
        assert_eq!(ParamValue::from(-7i64).to_string(), "-7");
        assert_eq!(ParamValue::from(1.5).to_string(), "1.5");
        assert_eq!(ParamValue::from(true).to_string(), "1");
        assert_eq!(ParamValue::from(false).to_string(), "0");
        assert_eq!(ParamValue::from(vec![1, 2, 3]).to_string(), "1,2,3");
        assert_eq!(ParamValue::from(["a", "b"]).to_string(), "a,b");
        assert_eq!(ParamValue::from(Vec::<i32>::new()).to_string(), "");
    }

    #[test]
    fn test_param_value_nested_list_flattens() {
        let value = ParamValue::List(vec![
            ParamValue::from(1),
            ParamValue::from(vec!["x", "y"]),
        ]);
        assert_eq!(value.to_string(), "1,x,y");
    }

    #[test]
    fn test_param_value_from_json() {
        assert_eq!(ParamValue::from(json!("s")), ParamValue::Str("s".into()));
        assert_eq!(ParamValue::from(json!(5)), ParamValue::Int(5));
        assert_eq!(ParamValue::from(json!(0.25)), ParamValue::Float(0.25));
        assert_eq!(ParamValue::from(json!([1, "a"])).to_string(), "1,a");
        assert_eq!(
            ParamValue::from(json!({"one_time": false})).to_string(),
            r#"{"one_time":false}"#
        );
    }

    #[test]
    fn test_params_insert_keeps_position() {
        let mut params = Params::from([("access_token", "t"), ("v", "5.133")]);
        params.insert("peer_id", 1);
        let old = params.insert("access_token", "other");
        assert_eq!(old, Some(ParamValue::from("t")));
        let keys: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["access_token", "v", "peer_id"]);
        assert_eq!(params.get("access_token"), Some(&ParamValue::from("other")));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_params_query_pairs() {
        let params = Params::from([("user_ids", ParamValue::from(vec![1, 2]))]);
        let pairs: Vec<_> = params.query_pairs().collect();
        assert_eq!(pairs, [("user_ids", "1,2".to_string())]);
    }

    #[test]
    fn test_response_wrapper_ok() {
        let wrapper: ApiResponseWrapper =
            serde_json::from_value(json!({"response": [{"id": 1}]})).unwrap();
        let result: Result<Value> = wrapper.into();
        assert_eq!(result.unwrap(), json!([{"id": 1}]));
    }

    #[test]
    fn test_response_wrapper_error() {
        let wrapper: ApiResponseWrapper = serde_json::from_value(json!({
            "error": {"error_code": 100, "error_msg": "One of the parameters specified was missing or invalid"}
        }))
        .unwrap();
        let result: Result<Value> = wrapper.into();
        match result.unwrap_err() {
            VkError::Api(e) => assert_eq!(e.error_code, 100),
            e => panic!("Expected Api error, got {e:?}"),
        }
    }

    #[test]
    fn test_response_wrapper_empty() {
        let result: Result<Value> = ApiResponseWrapper::default().into();
        assert!(matches!(result, Err(VkError::Validation(_))));
    }
}

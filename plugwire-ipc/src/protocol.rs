//! IPC protocol definitions and message types

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Parameters carried by CALL and REGISTER messages
pub type Params = Map<String, JsonValue>;

/// Key under which REGISTER lists the plugin's functions
pub const REGISTER_FUNCTIONS_KEY: &str = "functions";

/// Message kinds exchanged between host and plugin
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Host asks the plugin to run a function
    Call,
    /// Successful call outcome
    Result,
    /// Failed call outcome
    Error,
    /// Liveness probe
    Ping,
    /// Liveness reply
    Pong,
    /// Plugin announces its function set
    Register,
    /// Host acknowledges the function set
    RegisterAck,
    /// Host asks the plugin to shut down
    Stop,
    /// Any type string this protocol revision does not know
    Unknown(String),
}

impl MessageType {
    /// Wire name of this message type
    pub fn as_str(&self) -> &str {
        match self {
            MessageType::Call => "call",
            MessageType::Result => "result",
            MessageType::Error => "error",
            MessageType::Ping => "ping",
            MessageType::Pong => "pong",
            MessageType::Register => "register",
            MessageType::RegisterAck => "register_ack",
            MessageType::Stop => "stop",
            MessageType::Unknown(other) => other,
        }
    }

    /// Parse a wire name; unrecognised names map to `Unknown`
    pub fn from_wire(name: &str) -> Self {
        match name {
            "call" => MessageType::Call,
            "result" => MessageType::Result,
            "error" => MessageType::Error,
            "ping" => MessageType::Ping,
            "pong" => MessageType::Pong,
            "register" => MessageType::Register,
            "register_ack" => MessageType::RegisterAck,
            "stop" => MessageType::Stop,
            other => MessageType::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MessageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MessageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(MessageType::from_wire(&name))
    }
}

/// One protocol message.
///
/// Only the fields relevant to `message_type` are populated by the
/// constructors below; absent fields are left out of the JSON body and
/// unknown fields are ignored when decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub message_type: MessageType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub result: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Keeps an explicit `"result": null` distinct from a missing field
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(Some)
}

impl Message {
    fn bare(message_type: MessageType) -> Self {
        Self {
            message_type,
            id: None,
            function: None,
            params: None,
            result: None,
            error: None,
        }
    }

    /// REGISTER announcing `functions`, in order
    pub fn register<I, S>(functions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<JsonValue> = functions
            .into_iter()
            .map(|name| JsonValue::String(name.into()))
            .collect();
        let mut params = Params::new();
        params.insert(REGISTER_FUNCTIONS_KEY.to_string(), JsonValue::Array(names));

        Self {
            params: Some(params),
            ..Self::bare(MessageType::Register)
        }
    }

    pub fn register_ack() -> Self {
        Self::bare(MessageType::RegisterAck)
    }

    /// CALL of `function` with `params`, correlated by `id`
    pub fn call(id: impl Into<String>, function: impl Into<String>, params: Params) -> Self {
        Self {
            id: Some(id.into()),
            function: Some(function.into()),
            params: Some(params),
            ..Self::bare(MessageType::Call)
        }
    }

    pub fn result(id: impl Into<String>, result: JsonValue) -> Self {
        Self {
            id: Some(id.into()),
            result: Some(result),
            ..Self::bare(MessageType::Result)
        }
    }

    pub fn error(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            error: Some(error.into()),
            ..Self::bare(MessageType::Error)
        }
    }

    pub fn ping() -> Self {
        Self::bare(MessageType::Ping)
    }

    pub fn pong() -> Self {
        Self::bare(MessageType::Pong)
    }

    pub fn stop() -> Self {
        Self::bare(MessageType::Stop)
    }

    /// Correlation id and function name of a well-formed CALL.
    ///
    /// Returns `None` when either is missing or empty, in which case there is
    /// nothing to answer against.
    pub fn call_target(&self) -> Option<(&str, &str)> {
        let id = self.id.as_deref().filter(|id| !id.is_empty())?;
        let function = self.function.as_deref().filter(|f| !f.is_empty())?;
        Some((id, function))
    }

    /// Function names announced by a REGISTER message
    pub fn registered_functions(&self) -> Option<Vec<String>> {
        if self.message_type != MessageType::Register {
            return None;
        }
        let names = self.params.as_ref()?.get(REGISTER_FUNCTIONS_KEY)?.as_array()?;
        names
            .iter()
            .map(|name| name.as_str().map(str::to_string))
            .collect()
    }
}

//! User and household profile records.
//!
//! # Invariants
//! - A household is recognised by a non-empty `description`.
//! - Persisted households never carry the `user` back-reference.
//! - Decoding accepts what the API has been seen to send: ids as numbers or
//!   numeric strings, `null` lists and descriptions, and household entries
//!   that do not decode are skipped rather than failing the whole user.

use log::warn;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

/// Identifier the API sends either as a number or as a string.
///
/// Serializes back in the shape it was received in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseId {
    Number(i64),
    Text(String),
}

impl Display for LooseId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for LooseId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

/// Individual user record as persisted under `userData`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(deserialize_with = "integer_id")]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Slash-separated group path, e.g. `/brasil/df/unb/fga`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_unit_id: Option<LooseId>,
    /// Remaining API fields, kept verbatim.
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl UserRecord {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            user_name: None,
            city: None,
            group: None,
            school_unit_id: None,
            profile: Map::new(),
        }
    }

    /// Segment of `group` used as the push `group` tag.
    pub fn group_segment(&self) -> Option<&str> {
        self.group
            .as_deref()
            .and_then(|path| path.split('/').nth(3))
    }
}

/// Household profile owned by the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    #[serde(deserialize_with = "integer_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Back-reference to the owning user as sent by the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl Household {
    pub fn new(id: i64, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            user: None,
            profile: Map::new(),
        }
    }

    /// Builds the record persisted under `selectedData`.
    ///
    /// Returns a new value; `self` keeps its back-reference.
    pub fn to_persisted(&self) -> Household {
        Household {
            id: self.id,
            description: self.description.clone(),
            user: None,
            profile: self.profile.clone(),
        }
    }

    /// Key used in the household avatar map.
    pub fn avatar_key(&self) -> String {
        self.id.to_string()
    }
}

/// User payload returned by the auth endpoint.
///
/// `households` and `app` travel with the user but are kept out of the
/// persisted `userData` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    #[serde(default, deserialize_with = "decodable_households")]
    pub households: Vec<Household>,
    #[serde(default)]
    pub app: Option<Value>,
    #[serde(flatten)]
    pub user: UserRecord,
}

/// Entity passed to profile selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    Household(Household),
    Individual(UserRecord),
}

impl Profile {
    /// Classifies a raw profile JSON object.
    ///
    /// Objects with a non-empty string `description` are households; anything
    /// else that decodes as a user is the individual. Returns `None` when the
    /// value matches neither shape.
    pub fn from_json(value: &Value) -> Option<Self> {
        let has_description = value
            .get("description")
            .and_then(Value::as_str)
            .is_some_and(|description| !description.is_empty());
        if has_description {
            return serde_json::from_value(value.clone())
                .ok()
                .map(Self::Household);
        }
        serde_json::from_value(value.clone())
            .ok()
            .map(Self::Individual)
    }
}

fn integer_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| de::Error::custom(format!("id {number} is not an integer"))),
        Value::String(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("id `{text}` is not numeric"))),
        other => Err(de::Error::custom(format!("expected an id, got {other}"))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn decodable_households<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Household>, D::Error> {
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Household>(entry) {
            Ok(household) => Some(household),
            Err(err) => {
                warn!("event=profile_decode module=model status=error error_code=household_skipped error={err}");
                None
            }
        })
        .collect())
}

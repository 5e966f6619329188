use crate::errors::Error;
use core::fmt::Display;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// A setting can be either a signed integer, unsigned integer, string, map or boolean.
/// Maps are stored as comma separated strings.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Setting {
    SInt(isize),
    UInt(usize),
    String(String),
    Bool(bool),
    Map(Vec<String>),
}

impl Setting {
    /// Short type tag as used in the string encoding (`b:true`, `u:12`, ...)
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::SInt(_) => "i",
            Self::UInt(_) => "u",
            Self::String(_) => "s",
            Self::Bool(_) => "b",
            Self::Map(_) => "m",
        }
    }

    fn warn_coerced(&self, wanted: &str) {
        if self.tag() != wanted {
            warn!("setting of type '{}' read as type '{wanted}'", self.tag());
        }
    }

    #[must_use]
    pub fn to_bool(&self) -> bool {
        self.warn_coerced("b");

        match self {
            Self::Bool(value) => *value,
            Self::SInt(value) => *value != 0,
            Self::UInt(value) => *value != 0,
            Self::String(value) => is_truthy(value),
            Self::Map(values) => !values.is_empty(),
        }
    }

    #[must_use]
    pub fn to_sint(&self) -> isize {
        self.warn_coerced("i");

        match self {
            Self::SInt(value) => *value,
            Self::UInt(value) => isize::try_from(*value).unwrap_or(isize::MAX),
            Self::Bool(value) => isize::from(*value),
            Self::String(value) => isize::from(is_truthy(value)),
            Self::Map(values) => isize::try_from(values.len()).unwrap_or(isize::MAX),
        }
    }

    #[must_use]
    pub fn to_uint(&self) -> usize {
        self.warn_coerced("u");

        match self {
            Self::UInt(value) => *value,
            Self::SInt(value) => usize::try_from(*value).unwrap_or(0),
            Self::Bool(value) => usize::from(*value),
            Self::String(value) => usize::from(is_truthy(value)),
            Self::Map(values) => values.len(),
        }
    }

    /// Plain value without the type tag
    #[allow(clippy::inherent_to_string_shadow_display)]
    #[must_use]
    pub fn to_string(&self) -> String {
        self.warn_coerced("s");
        self.raw_value()
    }

    #[must_use]
    pub fn to_map(&self) -> Vec<String> {
        self.warn_coerced("m");

        match self {
            Self::Map(values) => values.clone(),
            other => vec![other.raw_value()],
        }
    }

    fn raw_value(&self) -> String {
        match self {
            Self::SInt(value) => value.to_string(),
            Self::UInt(value) => value.to_string(),
            Self::String(value) => value.clone(),
            Self::Bool(value) => value.to_string(),
            Self::Map(values) => values.join(","),
        }
    }
}

fn is_truthy(s: &str) -> bool {
    ["yes", "on", "true", "1"]
        .iter()
        .any(|truthy| s.eq_ignore_ascii_case(truthy))
}

impl Display for Setting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.tag(), self.raw_value())
    }
}

impl FromStr for Setting {
    type Err = Error;

    /// Parses the tagged encoding: `b:true`, `i:-3`, `u:12`, `s:text`, `m:a,b,c`
    fn from_str(encoded: &str) -> Result<Self, Error> {
        let Some((tag, value)) = encoded.split_once(':') else {
            return Err(Error::Config(format!("setting without type tag: {encoded}")));
        };

        let setting = match tag {
            "b" => Self::Bool(value.parse::<bool>().map_err(|e| invalid(value, e))?),
            "i" => Self::SInt(value.parse::<isize>().map_err(|e| invalid(value, e))?),
            "u" => Self::UInt(value.parse::<usize>().map_err(|e| invalid(value, e))?),
            "s" => Self::String(value.to_string()),
            "m" => Self::Map(value.split(',').map(str::to_string).collect()),
            _ => return Err(Error::Config(format!("unknown setting type: {tag}"))),
        };

        Ok(setting)
    }
}

fn invalid(value: &str, err: impl Display) -> Error {
    Error::Config(format!("error parsing {value}: {err}"))
}

impl Serialize for Setting {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Setting {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::from_str(&value)
            .map_err(|err| serde::de::Error::custom(format!("cannot deserialize: {err}")))
    }
}

/// `SettingInfo` returns information about a given setting
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SettingInfo {
    /// Name of the key in dot notation (ie: dom.slots.signal_slotchange)
    pub key: String,
    /// Description of the setting
    pub description: String,
    /// Default setting if none has been specified
    pub default: Setting,
}

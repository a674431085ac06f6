//! Configuration declarations handed from the host to a plugin

use serde::{Deserialize, Serialize};

/// A single `key value...` declaration inside a plugin block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigItem {
    pub key: String,
    #[serde(default)]
    pub values: Vec<String>,
}

impl ConfigItem {
    pub fn new<I, S>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Case-insensitive key comparison, the host treats keys that way
    pub fn is(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }

    /// First value, if the declaration has any
    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

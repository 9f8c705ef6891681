//! The persisted environment record and its JSON encoding

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use super::error::EnvFileError;

/// Variable name to value
pub type EnvMap = BTreeMap<String, String>;

/// Full set of persisted environment variables
///
/// On disk: `{"env": {"NAME": "VALUE", ...}}`. The `env` field is omitted
/// when empty and optional (or `null`) on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "null_as_empty")]
    pub env: EnvMap,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<EnvMap, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<EnvMap>::deserialize(deserializer)?.unwrap_or_default())
}

impl Record {
    pub fn new(env: EnvMap) -> Self {
        Self { env }
    }

    pub fn is_empty(&self) -> bool {
        self.env.is_empty()
    }

    pub fn len(&self) -> usize {
        self.env.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    /// Decode the on-disk bytes. Blank content and a bare `null` decode to an
    /// empty record.
    pub fn decode(bytes: &[u8], path: &Path) -> Result<Self, EnvFileError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let record: Option<Self> = serde_json::from_slice(bytes).map_err(|source| EnvFileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(record.unwrap_or_default())
    }

    /// Encode the full record
    pub fn encode(&self) -> Result<Vec<u8>, EnvFileError> {
        serde_json::to_vec(self).map_err(EnvFileError::Serialize)
    }
}

impl From<EnvMap> for Record {
    fn from(env: EnvMap) -> Self {
        Self::new(env)
    }
}

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Lifecycle status reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileStatus {
    Pending,
    Uploaded,
    Processed,
    Error,
    /// Status names this gateway does not know yet, kept verbatim.
    Other(String),
}

impl From<String> for FileStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => FileStatus::Pending,
            "uploaded" => FileStatus::Uploaded,
            "processed" => FileStatus::Processed,
            "error" => FileStatus::Error,
            _ => FileStatus::Other(value),
        }
    }
}

impl From<FileStatus> for String {
    fn from(value: FileStatus) -> Self {
        match value {
            FileStatus::Pending => "pending".to_string(),
            FileStatus::Uploaded => "uploaded".to_string(),
            FileStatus::Processed => "processed".to_string(),
            FileStatus::Error => "error".to_string(),
            FileStatus::Other(s) => s,
        }
    }
}

/// One stored blob of a file bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobInfo {
    /// Storage path of the blob.
    pub filename: String,
    /// Type tag, e.g. `c-bin`, `c-texture`, `c-preview`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub decompressed_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5_hash: Option<String>,
}

/// Accepts `true`/`false`, `1`/`0` and `"1"`/`"0"` as the backend has used all of them.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => matches!(s.as_str(), "1" | "true"),
        Some(_) => false,
    })
}

/// Lengths arrive as numbers or numeric strings. Anything unparsable reads as absent.
fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Millisecond timestamps, as numbers or numeric strings.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// A file record as owned by the backend catalog. The gateway only reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub upload_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FileStatus>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub started_at: Option<i64>,
    #[serde(
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub uploaded_at: Option<i64>,
    #[serde(
        default,
        deserialize_with = "deserialize_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_length: Option<u64>,
    #[serde(default)]
    pub files: Vec<BlobInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Either a storage path or the `{uploadId, url, ...}` object of an uploaded image.
    pub background_image: Option<Value>,
    /// Storage path of the extracted preview image, once processing produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    /// Processing error detail, visible to the owner only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Anything else the backend attaches (e.g. `model`, `texture_1`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reply of the `info` operation.
#[derive(Debug, Clone, Deserialize)]
pub struct InfoReply {
    /// Owner username of the file.
    pub username: String,
    pub file: FileRecord,
}

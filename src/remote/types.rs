//! Remote listing types and aws cli output parsing
//!
//! Defines the (key, ETag) pair the cache works with and the serde types for
//! the JSON that `aws s3api list-objects-v2` prints.

use serde::Deserialize;

/// A remote object's identity at the time it was observed: its key and the
/// ETag fingerprinting its content version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Full object key within the bucket
    pub key: String,
    /// Content fingerprint (opaque token)
    pub etag: String,
}

impl ObjectInfo {
    pub fn new(key: impl Into<String>, etag: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            etag: etag.into(),
        }
    }
}

/// Top-level JSON document printed by `aws s3api list-objects-v2`.
///
/// The `Contents` field is omitted entirely when the prefix matches nothing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ListObjectsOutput {
    #[serde(default)]
    pub contents: Vec<S3Object>,
}

/// One entry of the `Contents` array. Extra fields (Size, LastModified,
/// StorageClass, Owner) are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct S3Object {
    pub key: String,
    #[serde(default)]
    pub e_tag: String,
}

impl From<S3Object> for ObjectInfo {
    fn from(object: S3Object) -> Self {
        ObjectInfo {
            key: object.key,
            etag: strip_etag_quotes(&object.e_tag).to_string(),
        }
    }
}

/// The cli wraps ETag values in literal double quotes (`"\"d41d8cd9...\""`);
/// strip them so the cache stores the bare fingerprint.
pub(crate) fn strip_etag_quotes(raw: &str) -> &str {
    raw.trim_matches('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_listing() {
        let json = r#"{
            "Contents": [
                {
                    "Key": "logs/2021/a.txt",
                    "LastModified": "2021-03-01T10:00:00+00:00",
                    "ETag": "\"9a0364b9e99bb480dd25e1f0284c8555\"",
                    "Size": 1024,
                    "StorageClass": "STANDARD"
                },
                {
                    "Key": "logs/2021/",
                    "LastModified": "2021-03-01T09:00:00+00:00",
                    "ETag": "\"d41d8cd98f00b204e9800998ecf8427e\"",
                    "Size": 0,
                    "StorageClass": "STANDARD"
                }
            ],
            "IsTruncated": false
        }"#;
        let output: ListObjectsOutput = serde_json::from_str(json).unwrap();
        assert_eq!(output.contents.len(), 2);
        assert_eq!(output.contents[0].key, "logs/2021/a.txt");
        // Directory markers come through; the cache core filters them.
        assert_eq!(output.contents[1].key, "logs/2021/");
    }

    #[test]
    fn test_deserialize_empty_listing_omits_contents() {
        let json = r#"{"RequestCharged": null}"#;
        let output: ListObjectsOutput = serde_json::from_str(json).unwrap();
        assert!(output.contents.is_empty());
    }

    #[test]
    fn test_etag_quotes_stripped_on_conversion() {
        let object = S3Object {
            key: "a.txt".to_string(),
            e_tag: "\"9a0364b9e99bb480dd25e1f0284c8555\"".to_string(),
        };
        let info = ObjectInfo::from(object);
        assert_eq!(info.etag, "9a0364b9e99bb480dd25e1f0284c8555");
    }

    #[test]
    fn test_strip_etag_quotes_handles_bare_value() {
        assert_eq!(strip_etag_quotes("abc-2"), "abc-2");
        assert_eq!(strip_etag_quotes("\"abc-2\""), "abc-2");
        assert_eq!(strip_etag_quotes(""), "");
    }

    #[test]
    fn test_deserialize_entry_without_etag() {
        let json = r#"{"Contents": [{"Key": "a.txt", "Size": 0}]}"#;
        let output: ListObjectsOutput = serde_json::from_str(json).unwrap();
        assert_eq!(output.contents[0].e_tag, "");
    }
}

//! Share-link token codec
//!
//! Token = URL-safe base64 (no padding) of compact JSON:
//! `{"customImages":{"2":"data:..."},"score":42}`
//!
//! Keys are written in ascending tier order so equal state always encodes to
//! the same token. Legacy links (padded standard
//! base64 with `customImages` as a per-tier list, `""` meaning default) are
//! still accepted.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GameError, Result};
use crate::sim::CustomizationSnapshot;

/// Decoded share state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub customization: CustomizationSnapshot,
    pub score: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireOut<'a> {
    custom_images: &'a CustomizationSnapshot,
    score: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct WireIn {
    custom_images: Value,
    score: u64,
}

/// Encoder/decoder bound to a tier count (for key validation)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareCodec {
    tier_count: usize,
}

impl ShareCodec {
    pub fn new(tier_count: usize) -> Self {
        Self { tier_count }
    }

    pub fn encode(&self, customization: &CustomizationSnapshot, score: u64) -> Result<String> {
        let wire = WireOut {
            custom_images: customization,
            score,
        };
        let json = serde_json::to_vec(&wire).map_err(|err| {
            log::error!("Could not encode share payload: {err}");
            GameError::malformed(err)
        })?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decode a token. Either the whole payload is valid or nothing is returned.
    pub fn decode(&self, token: &str) -> Result<SharePayload> {
        let token = token.trim();
        let bytes = match URL_SAFE_NO_PAD.decode(token) {
            Ok(bytes) => bytes,
            // Legacy tokens: padded standard alphabet, `+` may arrive as a space
            Err(_) => STANDARD
                .decode(token.replace(' ', "+"))
                .map_err(GameError::malformed)?,
        };

        let wire: WireIn = serde_json::from_slice(&bytes).map_err(GameError::malformed)?;
        let customization = match wire.custom_images {
            Value::Object(map) => self.images_from_map(map)?,
            Value::Array(list) => self.images_from_list(list)?,
            other => {
                return Err(GameError::malformed(format!(
                    "customImages must be an object or list, got {other}"
                )));
            }
        };
        customization.validate(self.tier_count)?;

        Ok(SharePayload {
            customization,
            score: wire.score,
        })
    }

    fn images_from_map(
        &self,
        map: serde_json::Map<String, Value>,
    ) -> Result<CustomizationSnapshot> {
        let mut images = BTreeMap::new();
        for (key, value) in map {
            let tier: usize = key
                .parse()
                .ok()
                .filter(|tier: &usize| tier.to_string() == key)
                .ok_or_else(|| GameError::malformed(format!("invalid tier key {key:?}")))?;
            let Value::String(payload) = value else {
                return Err(GameError::malformed(format!(
                    "custom image for tier {tier} is not a string"
                )));
            };
            images.insert(tier, payload);
        }
        Ok(CustomizationSnapshot::new(images))
    }

    fn images_from_list(&self, list: Vec<Value>) -> Result<CustomizationSnapshot> {
        let mut images = BTreeMap::new();
        for (tier, value) in list.into_iter().enumerate() {
            let Value::String(payload) = value else {
                return Err(GameError::malformed(format!(
                    "custom image for tier {tier} is not a string"
                )));
            };
            if !payload.is_empty() {
                images.insert(tier, payload);
            }
        }
        Ok(CustomizationSnapshot::new(images))
    }
}

/// `base_url?key=token`
pub fn share_link(base_url: &str, key: &str, token: &str) -> String {
    format!("{base_url}?{key}={token}")
}

/// Pull the token for `key` out of a full share link
pub fn token_from_link<'a>(link: &'a str, key: &str) -> Option<&'a str> {
    let (_, query) = link.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn codec() -> ShareCodec {
        ShareCodec::new(10)
    }

    fn raw(json: &str) -> String {
        URL_SAFE_NO_PAD.encode(json)
    }

    fn snapshot(entries: &[(usize, &str)]) -> CustomizationSnapshot {
        CustomizationSnapshot::new(entries.iter().map(|&(t, p)| (t, p.to_string())).collect())
    }

    #[test]
    fn test_encode_is_deterministic_and_ordered() {
        let snap = snapshot(&[(9, "Z"), (2, "X"), (3, "Y")]);
        let token = codec().encode(&snap, 42).unwrap();
        assert_eq!(token, codec().encode(&snap.clone(), 42).unwrap());

        let json = URL_SAFE_NO_PAD.decode(&token).unwrap();
        assert_eq!(
            String::from_utf8(json).unwrap(),
            r#"{"customImages":{"2":"X","3":"Y","9":"Z"},"score":42}"#
        );
    }

    #[test]
    fn test_token_is_url_safe() {
        let snap = snapshot(&[(0, "data:image/png;base64,//+/??>>")]);
        let token = codec().encode(&snap, 7).unwrap();
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_round_trip_empty() {
        let token = codec().encode(&CustomizationSnapshot::default(), 0).unwrap();
        // An empty state still produces a real token, never an empty string
        assert_eq!(token, raw(r#"{"customImages":{},"score":0}"#));
        let payload = codec().decode(&token).unwrap();
        assert!(payload.customization.is_empty());
        assert_eq!(payload.score, 0);
    }

    #[test]
    fn test_rejects_bad_scores() {
        for json in [
            r#"{"customImages":{},"score":-1}"#,
            r#"{"customImages":{},"score":1.5}"#,
            r#"{"customImages":{},"score":"3"}"#,
            r#"{"customImages":{},"score":null}"#,
            r#"{"customImages":{}}"#,
        ] {
            assert!(
                matches!(codec().decode(&raw(json)), Err(GameError::MalformedPayload(_))),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn test_rejects_bad_images() {
        for json in [
            r#"{"customImages":{"10":"X"},"score":1}"#,
            r#"{"customImages":{"abc":"X"},"score":1}"#,
            r#"{"customImages":{"-1":"X"},"score":1}"#,
            r#"{"customImages":{"01":"X"},"score":1}"#,
            r#"{"customImages":{"2":5},"score":1}"#,
            r#"{"customImages":{"2":""},"score":1}"#,
            r#"{"customImages":"X","score":1}"#,
            r#"{"customImages":{},"score":1,"extra":true}"#,
            r#"["X",1]"#,
        ] {
            assert!(
                matches!(codec().decode(&raw(json)), Err(GameError::MalformedPayload(_))),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(codec().decode("").is_err());
        assert!(codec().decode("not base64 at all!!").is_err());
        assert!(codec().decode(&raw("not json")).is_err());
    }

    #[test]
    fn test_accepts_legacy_links() {
        let json = r#"{"customImages":["","","X","","","","","","",""],"score":3}"#;
        let token = STANDARD.encode(json);

        let payload = codec().decode(&token).unwrap();
        assert_eq!(payload.score, 3);
        assert_eq!(payload.customization, snapshot(&[(2, "X")]));

        // Out-of-range entries in the list form are still rejected
        let json = r#"{"customImages":["","","","","","","","","","","X"],"score":3}"#;
        assert!(codec().decode(&STANDARD.encode(json)).is_err());
    }

    #[test]
    fn test_share_link_and_extract() {
        let link = share_link("https://example.com/play", "game", "abc_-1");
        assert_eq!(link, "https://example.com/play?game=abc_-1");
        assert_eq!(token_from_link(&link, "game"), Some("abc_-1"));
        assert_eq!(token_from_link("https://x.y/?a=1&game=tok#top", "game"), Some("tok"));
        assert_eq!(token_from_link("https://x.y/?a=1", "game"), None);
        assert_eq!(token_from_link("https://x.y/", "game"), None);
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            images in prop::collection::btree_map(0usize..10, "\\PC{1,24}", 0..10),
            score in any::<u64>(),
        ) {
            let snap = CustomizationSnapshot::new(images);
            let token = codec().encode(&snap, score).unwrap();
            let payload = codec().decode(&token).unwrap();
            prop_assert_eq!(payload, SharePayload { customization: snap, score });
        }

        #[test]
        fn prop_truncated_tokens_rejected(
            images in prop::collection::btree_map(0usize..10, "[a-z]{1,8}", 0..4),
            score in any::<u64>(),
            cut in 0usize..1000,
        ) {
            let token = codec().encode(&CustomizationSnapshot::new(images), score).unwrap();
            let cut = cut % token.len();
            prop_assert!(matches!(
                codec().decode(&token[..cut]),
                Err(GameError::MalformedPayload(_))
            ));
        }
    }
}

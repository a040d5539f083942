//! The list-protocol engine.
//!
//! Pure functions shared by `ListObjects` (v1) and `ListObjectsV2`: prefix
//! filtering, byte-lexicographic ordering, cursor skipping, truncation,
//! delimiter rollup into common prefixes, and optional URL encoding of
//! emitted keys. No I/O; every decision here depends only on key strings,
//! which is what lets the GitLab store probe truncation with skeletal
//! descriptors before paying for metadata.

use std::collections::BTreeSet;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use boxdrive_model::types::{EncodingType, ListObjectsInfo, ListObjectsV2Info, ObjectInfo};

/// Characters left untouched by `encoding-type=url`, besides alphanumerics.
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'/')
    .remove(b'*');

/// Filter candidates into a v1 listing result.
///
/// The algorithm, in order: prefix filter, ascending sort by key, strict
/// skip past `marker`, truncation against `max_keys`, delimiter rollup,
/// optional URL encoding, and the v1 next-marker rule (last common prefix if
/// any were produced, else the last content key).
#[must_use]
pub fn filter_objects(
    objects: Vec<ObjectInfo>,
    prefix: Option<&str>,
    delimiter: Option<&str>,
    max_keys: usize,
    marker: Option<&str>,
    encoding_type: Option<EncodingType>,
) -> ListObjectsInfo {
    let prefix = prefix.unwrap_or("");
    let objects = select_page(objects, prefix, marker.unwrap_or(""), max_keys);
    let is_truncated = objects.is_truncated;

    let (contents, common_prefixes) = split_contents_and_prefixes(objects.page, prefix, delimiter);
    let (contents, common_prefixes) =
        encode_keys_and_prefixes(contents, common_prefixes, encoding_type);

    let next_marker = if is_truncated {
        common_prefixes
            .last()
            .cloned()
            .or_else(|| contents.last().map(|obj| obj.key.clone()))
            .unwrap_or_default()
    } else {
        String::new()
    };

    ListObjectsInfo {
        objects: contents,
        common_prefixes,
        is_truncated,
        next_marker,
    }
}

/// Filter candidates into a v2 listing result.
///
/// Identical to [`filter_objects`] except that the cursor is
/// `continuation-token` (falling back to `start-after`) and no next marker
/// is computed; the facade synthesizes the continuation token.
#[must_use]
pub fn filter_objects_v2(
    objects: Vec<ObjectInfo>,
    prefix: Option<&str>,
    delimiter: Option<&str>,
    max_keys: usize,
    continuation_token: Option<&str>,
    start_after: Option<&str>,
    encoding_type: Option<EncodingType>,
) -> ListObjectsV2Info {
    let prefix = prefix.unwrap_or("");
    let after = continuation_token
        .filter(|t| !t.is_empty())
        .or(start_after)
        .unwrap_or("");
    let objects = select_page(objects, prefix, after, max_keys);
    let is_truncated = objects.is_truncated;

    let (contents, common_prefixes) = split_contents_and_prefixes(objects.page, prefix, delimiter);
    let (contents, common_prefixes) =
        encode_keys_and_prefixes(contents, common_prefixes, encoding_type);

    ListObjectsV2Info {
        objects: contents,
        common_prefixes,
        is_truncated,
    }
}

/// One page of candidates plus the truncation flag.
struct Page {
    page: Vec<ObjectInfo>,
    is_truncated: bool,
}

/// Apply the prefix filter, sort, cursor skip, and truncation probe.
fn select_page(objects: Vec<ObjectInfo>, prefix: &str, after: &str, max_keys: usize) -> Page {
    let mut objects: Vec<ObjectInfo> = objects
        .into_iter()
        .filter(|obj| obj.key.starts_with(prefix))
        .filter(|obj| after.is_empty() || obj.key.as_str() > after)
        .collect();
    objects.sort_unstable_by(|a, b| a.key.cmp(&b.key));

    let is_truncated = objects.len() > max_keys;
    objects.truncate(max_keys);
    Page {
        page: objects,
        is_truncated,
    }
}

/// Roll keys containing the delimiter past the prefix into common prefixes.
///
/// Every input key starts with `prefix`. A key whose suffix contains the
/// delimiter contributes `key[..prefix + first-delimiter + delimiter]` to
/// the (sorted, deduplicated) common-prefix set instead of the contents.
fn split_contents_and_prefixes(
    objects: Vec<ObjectInfo>,
    prefix: &str,
    delimiter: Option<&str>,
) -> (Vec<ObjectInfo>, Vec<String>) {
    let Some(delimiter) = delimiter.filter(|d| !d.is_empty()) else {
        return (objects, Vec::new());
    };

    let plen = prefix.len();
    let mut contents = Vec::new();
    let mut common_prefixes = BTreeSet::new();
    for obj in objects {
        debug_assert!(obj.key.starts_with(prefix));
        let suffix = &obj.key[plen..];
        if let Some(idx) = suffix.find(delimiter) {
            common_prefixes.insert(obj.key[..plen + idx + delimiter.len()].to_owned());
        } else {
            contents.push(obj);
        }
    }
    (contents, common_prefixes.into_iter().collect())
}

/// Percent-encode emitted keys and prefixes when `encoding-type=url`.
fn encode_keys_and_prefixes(
    mut objects: Vec<ObjectInfo>,
    mut common_prefixes: Vec<String>,
    encoding_type: Option<EncodingType>,
) -> (Vec<ObjectInfo>, Vec<String>) {
    if encoding_type != Some(EncodingType::Url) {
        return (objects, common_prefixes);
    }

    for obj in &mut objects {
        obj.key = encode_key(&obj.key);
    }
    for prefix in &mut common_prefixes {
        *prefix = encode_key(prefix);
    }
    (objects, common_prefixes)
}

/// Percent-encode a key with the listing safe set (`-`, `_`, `.`, `/`, `*`).
#[must_use]
pub fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, KEY_ENCODE_SET).to_string()
}

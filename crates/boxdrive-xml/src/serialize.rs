//! Converting BoxDrive output types to S3-compatible XML.
//!
//! Implementors of [`S3Serialize`] write their content as child elements
//! inside the current XML context; the root element name and namespace are
//! handled by the top-level [`to_xml`] function.

use std::io::{self, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesText, Event};

use boxdrive_model::constants::{
    DEFAULT_STORAGE_CLASS, OWNER_DISPLAY_NAME, OWNER_ID, S3_XML_NAMESPACE,
};
use boxdrive_model::output::{ListBucketsOutput, ListObjectsOutput, ListObjectsV2Output};
use boxdrive_model::types::{BucketInfo, ObjectInfo};

use crate::error::XmlError;

/// Trait for serializing BoxDrive types to XML.
///
/// Uses `io::Result` because `quick_xml::Writer` closures require
/// `io::Result<()>`.
pub trait S3Serialize {
    /// Serialize this value as XML child elements into the given writer.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if writing to the underlying writer fails.
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()>;
}

/// Serialize a value as S3-compatible XML with declaration and namespace.
///
/// # Errors
///
/// Returns `XmlError` if serialization fails.
pub fn to_xml<T: S3Serialize>(root_element: &str, value: &T) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(512);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(quick_xml::events::BytesDecl::new(
        "1.0",
        Some("UTF-8"),
        None,
    )))?;

    writer
        .create_element(root_element)
        .with_attribute(("xmlns", S3_XML_NAMESPACE))
        .write_inner_content(|w| value.serialize_xml(w))?;

    Ok(buf)
}

// ---------------------------------------------------------------------------
// Helper functions for writing common XML patterns
// ---------------------------------------------------------------------------

/// Write a simple `<tag>text</tag>` element.
fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

/// Write `<tag>text</tag>` only if the value is `Some`.
fn write_optional_text<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: Option<&str>,
) -> io::Result<()> {
    if let Some(v) = value {
        write_text_element(writer, tag, v)?;
    }
    Ok(())
}

/// Write `<tag>true|false</tag>`.
fn write_bool<W: Write>(writer: &mut Writer<W>, tag: &str, value: bool) -> io::Result<()> {
    write_text_element(writer, tag, if value { "true" } else { "false" })
}

/// Format a `DateTime<Utc>` as ISO 8601 with milliseconds and `Z` suffix.
fn format_timestamp(dt: &chrono::DateTime<chrono::Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Write the fixed BoxDrive owner element.
fn write_owner<W: Write>(writer: &mut Writer<W>) -> io::Result<()> {
    writer.create_element("Owner").write_inner_content(|w| {
        write_text_element(w, "ID", OWNER_ID)?;
        write_text_element(w, "DisplayName", OWNER_DISPLAY_NAME)?;
        Ok(())
    })?;
    Ok(())
}

/// Write a `<Contents>` element for one object.
fn write_contents<W: Write>(writer: &mut Writer<W>, obj: &ObjectInfo) -> io::Result<()> {
    writer.create_element("Contents").write_inner_content(|w| {
        write_text_element(w, "Key", &obj.key)?;
        write_text_element(w, "LastModified", &format_timestamp(&obj.last_modified))?;
        // ETags travel quoted; skeletal entries with no etag stay empty.
        let etag = if obj.etag.is_empty() {
            String::new()
        } else {
            format!("\"{}\"", obj.etag)
        };
        write_text_element(w, "ETag", &etag)?;
        write_text_element(w, "Size", &obj.size.to_string())?;
        write_text_element(w, "StorageClass", DEFAULT_STORAGE_CLASS)?;
        write_owner(w)?;
        Ok(())
    })?;
    Ok(())
}

/// Write a `<CommonPrefixes>` element for one rolled-up prefix.
fn write_common_prefix<W: Write>(writer: &mut Writer<W>, prefix: &str) -> io::Result<()> {
    writer
        .create_element("CommonPrefixes")
        .write_inner_content(|w| {
            write_text_element(w, "Prefix", prefix)?;
            Ok(())
        })?;
    Ok(())
}

// ---------------------------------------------------------------------------
// S3Serialize implementations
// ---------------------------------------------------------------------------

impl S3Serialize for BucketInfo {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Bucket").write_inner_content(|w| {
            write_text_element(w, "Name", &self.name)?;
            write_text_element(w, "CreationDate", &format_timestamp(&self.creation_date))?;
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for ListBucketsOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_owner(writer)?;
        writer.create_element("Buckets").write_inner_content(|w| {
            for bucket in &self.buckets {
                bucket.serialize_xml(w)?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

impl S3Serialize for ListObjectsOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Name", &self.name)?;
        write_text_element(writer, "Prefix", &self.prefix)?;
        write_optional_text(writer, "Marker", self.marker.as_deref())?;
        write_text_element(writer, "MaxKeys", &self.max_keys.to_string())?;
        write_optional_text(writer, "Delimiter", self.delimiter.as_deref())?;
        write_bool(writer, "IsTruncated", self.is_truncated)?;
        write_optional_text(
            writer,
            "EncodingType",
            self.encoding_type.map(|e| e.as_str()),
        )?;
        write_optional_text(writer, "NextMarker", self.next_marker.as_deref())?;
        for obj in &self.contents {
            write_contents(writer, obj)?;
        }
        for cp in &self.common_prefixes {
            write_common_prefix(writer, cp)?;
        }
        Ok(())
    }
}

impl S3Serialize for ListObjectsV2Output {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Name", &self.name)?;
        write_text_element(writer, "Prefix", &self.prefix)?;
        write_text_element(writer, "KeyCount", &self.key_count.to_string())?;
        write_text_element(writer, "MaxKeys", &self.max_keys.to_string())?;
        write_optional_text(writer, "Delimiter", self.delimiter.as_deref())?;
        write_bool(writer, "IsTruncated", self.is_truncated)?;
        write_optional_text(
            writer,
            "EncodingType",
            self.encoding_type.map(|e| e.as_str()),
        )?;
        write_optional_text(
            writer,
            "ContinuationToken",
            self.continuation_token.as_deref(),
        )?;
        write_optional_text(
            writer,
            "NextContinuationToken",
            self.next_continuation_token.as_deref(),
        )?;
        write_optional_text(writer, "StartAfter", self.start_after.as_deref())?;
        for obj in &self.contents {
            write_contents(writer, obj)?;
        }
        for cp in &self.common_prefixes {
            write_common_prefix(writer, cp)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn object(key: &str) -> ObjectInfo {
        ObjectInfo {
            key: key.to_owned(),
            size: 42,
            last_modified: Utc.with_ymd_and_hms(2024, 2, 3, 16, 45, 9).unwrap(),
            etag: "abc123".to_owned(),
            content_type: "text/plain".to_owned(),
        }
    }

    #[test]
    fn test_should_serialize_list_buckets() {
        let output = ListBucketsOutput {
            buckets: vec![BucketInfo {
                name: "photos".to_owned(),
                creation_date: Utc.with_ymd_and_hms(2024, 2, 3, 16, 45, 9).unwrap(),
            }],
        };

        let xml = to_xml("ListAllMyBucketsResult", &output).expect("serialization should succeed");
        let xml_str = std::str::from_utf8(&xml).expect("valid UTF-8");

        assert!(xml_str.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml_str.contains(
            "<ListAllMyBucketsResult xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">"
        ));
        assert!(xml_str.contains("<Owner><ID>boxdrive</ID><DisplayName>BoxDrive</DisplayName>"));
        assert!(xml_str.contains("<Bucket><Name>photos</Name>"));
        assert!(xml_str.contains("<CreationDate>2024-02-03T16:45:09.000Z</CreationDate>"));
    }

    #[test]
    fn test_should_serialize_list_objects_v1() {
        let output = ListObjectsOutput {
            name: "photos".to_owned(),
            prefix: "2024/".to_owned(),
            marker: None,
            delimiter: Some("/".to_owned()),
            max_keys: 2,
            is_truncated: true,
            next_marker: Some("2024/feb.jpg".to_owned()),
            encoding_type: None,
            contents: vec![object("2024/feb.jpg")],
            common_prefixes: vec!["2024/raw/".to_owned()],
        };

        let xml = to_xml("ListBucketResult", &output).expect("serialization should succeed");
        let xml_str = std::str::from_utf8(&xml).expect("valid UTF-8");

        assert!(xml_str.contains("<Name>photos</Name>"));
        assert!(xml_str.contains("<Prefix>2024/</Prefix>"));
        assert!(xml_str.contains("<MaxKeys>2</MaxKeys>"));
        assert!(xml_str.contains("<IsTruncated>true</IsTruncated>"));
        assert!(xml_str.contains("<NextMarker>2024/feb.jpg</NextMarker>"));
        assert!(xml_str.contains("<Key>2024/feb.jpg</Key>"));
        assert!(xml_str.contains("<ETag>\"abc123\"</ETag>"));
        assert!(xml_str.contains("<Size>42</Size>"));
        assert!(xml_str.contains("<StorageClass>STANDARD</StorageClass>"));
        assert!(xml_str.contains("<CommonPrefixes><Prefix>2024/raw/</Prefix></CommonPrefixes>"));
    }

    #[test]
    fn test_should_serialize_list_objects_v2() {
        let output = ListObjectsV2Output {
            name: "photos".to_owned(),
            prefix: String::new(),
            delimiter: None,
            max_keys: 1000,
            key_count: 1,
            is_truncated: false,
            continuation_token: None,
            next_continuation_token: None,
            start_after: Some("a".to_owned()),
            encoding_type: None,
            contents: vec![object("b")],
            common_prefixes: vec![],
        };

        let xml = to_xml("ListBucketResult", &output).expect("serialization should succeed");
        let xml_str = std::str::from_utf8(&xml).expect("valid UTF-8");

        assert!(xml_str.contains("<KeyCount>1</KeyCount>"));
        assert!(xml_str.contains("<StartAfter>a</StartAfter>"));
        assert!(xml_str.contains("<IsTruncated>false</IsTruncated>"));
        assert!(!xml_str.contains("NextContinuationToken"));
    }

    #[test]
    fn test_should_escape_keys_with_special_characters() {
        let output = ListObjectsOutput {
            name: "b".to_owned(),
            prefix: String::new(),
            marker: None,
            delimiter: None,
            max_keys: 1000,
            is_truncated: false,
            next_marker: None,
            encoding_type: None,
            contents: vec![object("a&b<c>.txt")],
            common_prefixes: vec![],
        };

        let xml = to_xml("ListBucketResult", &output).expect("serialization should succeed");
        let xml_str = std::str::from_utf8(&xml).expect("valid UTF-8");

        assert!(xml_str.contains("<Key>a&amp;b&lt;c&gt;.txt</Key>"));
    }
}

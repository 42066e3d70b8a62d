//! Attribute lookups on XML start tags.
//!
//! Layout and icon pack resources are read with `quick-xml`. These helpers
//! return attribute values unescaped, or `None` when the tag lacks the
//! attribute.

use quick_xml::events::BytesStart;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::Result;

/// The value of the attribute at `index`, in document order.
pub fn attribute_at(start: &BytesStart<'_>, index: usize) -> Result<Option<String>> {
    match start.attributes().nth(index) {
        Some(attr) => Ok(Some(attr?.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

/// The value of the attribute named `key`, matched against the full
/// (possibly prefixed) name.
pub fn attribute(start: &BytesStart<'_>, key: &str) -> Result<Option<String>> {
    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// The value of the attribute `key` in `namespace`.
///
/// `start` must be the event `reader` produced last, so its namespace
/// bindings are in scope. A `None` namespace matches attributes without a
/// prefix.
pub fn attribute_ns<R>(
    reader: &NsReader<R>,
    start: &BytesStart<'_>,
    namespace: Option<&str>,
    key: &str,
) -> Result<Option<String>> {
    for attr in start.attributes() {
        let attr = attr?;
        let (resolved, local) = reader.resolve_attribute(attr.key);
        if local.as_ref() != key.as_bytes() {
            continue;
        }
        let in_namespace = match (resolved, namespace) {
            (ResolveResult::Bound(ns), Some(expected)) => ns.as_ref() == expected.as_bytes(),
            (ResolveResult::Unbound, None) => true,
            _ => false,
        };
        if in_namespace {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;

    const ANDROID: &str = "http://schemas.android.com/apk/res/android";

    const LAYOUT: &str = r#"<LinearLayout
        xmlns:android="http://schemas.android.com/apk/res/android"
        xmlns:app="http://schemas.android.com/apk/res-auto"
        android:id="@+id/root"
        app:id="custom"
        title="Tools &amp; Games"/>"#;

    fn with_root(check: impl FnOnce(&NsReader<&[u8]>, &BytesStart<'_>)) {
        let mut reader = NsReader::from_str(LAYOUT);
        loop {
            match reader.read_event().unwrap() {
                Event::Start(start) | Event::Empty(start) => {
                    check(&reader, &start);
                    return;
                }
                Event::Eof => panic!("no root element"),
                _ => {}
            }
        }
    }

    #[test]
    fn test_attribute_by_index() {
        with_root(|_, start| {
            assert_eq!(attribute_at(start, 2).unwrap().as_deref(), Some("@+id/root"));
            assert_eq!(attribute_at(start, 9).unwrap(), None);
        });
    }

    #[test]
    fn test_attribute_by_key_unescapes() {
        with_root(|_, start| {
            assert_eq!(attribute(start, "title").unwrap().as_deref(), Some("Tools & Games"));
            assert_eq!(attribute(start, "android:id").unwrap().as_deref(), Some("@+id/root"));
            assert_eq!(attribute(start, "id").unwrap(), None);
        });
    }

    #[test]
    fn test_attribute_by_namespace() {
        with_root(|reader, start| {
            assert_eq!(
                attribute_ns(reader, start, Some(ANDROID), "id").unwrap().as_deref(),
                Some("@+id/root")
            );
            assert_eq!(
                attribute_ns(reader, start, None, "title").unwrap().as_deref(),
                Some("Tools & Games")
            );
            assert_eq!(attribute_ns(reader, start, None, "id").unwrap(), None);
            assert_eq!(attribute_ns(reader, start, Some(ANDROID), "title").unwrap(), None);
        });
    }
}

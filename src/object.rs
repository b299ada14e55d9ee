//! Pipeline object model.
//!
//! Everything that travels a pipeline channel or reaches a sink is an
//! [`Object`]. Hosts that render to a text terminal use the string
//! projection; richer hosts can match on the variants.

use std::collections::BTreeMap;
use std::fmt;

use unicode_width::UnicodeWidthStr;

/// A value flowing between pipeline stages and into a sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    String(String),
    /// Structured record with ordered fields.
    Record(BTreeMap<String, Object>),
    /// An error spliced into the output stream (`2>&1`).
    Error(String),
    Warning(String),
    Debug(String),
}

impl Object {
    /// Convenience constructor for string objects.
    pub fn text(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Build a record from field/value pairs.
    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Object)>,
        K: Into<String>,
    {
        Self::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        )
    }

    /// String projection used by terminal hosts and file redirection.
    ///
    /// Records render one `key : value` line per field, keys padded to a
    /// common display width.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Self::String(s) | Self::Error(s) | Self::Warning(s) | Self::Debug(s) => s.clone(),
            Self::Record(fields) => {
                let key_width = fields.keys().map(|k| k.as_str().width()).max().unwrap_or(0);
                let mut out = String::new();
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    let pad = key_width - key.as_str().width();
                    out.push_str(key);
                    out.extend(std::iter::repeat_n(' ', pad));
                    out.push_str(" : ");
                    out.push_str(&value.to_display_string());
                }
                out
            }
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_projection_is_identity() {
        assert_eq!(Object::text("hello").to_display_string(), "hello");
    }

    #[test]
    fn record_fields_align_by_display_width() {
        let record = Object::record([
            ("name", Object::text("write-output")),
            ("ok", Object::text("yes")),
        ]);
        assert_eq!(
            record.to_display_string(),
            "name : write-output\nok   : yes"
        );
    }

    #[test]
    fn record_alignment_counts_wide_keys_correctly() {
        // The Arabic key occupies its display width, not its char count.
        let record = Object::record([
            ("اسم", Object::text("a")),
            ("value", Object::text("b")),
        ]);
        let text = record.to_display_string();
        for line in text.lines() {
            let key_part = line.split(" : ").next().expect("key part");
            assert_eq!(key_part.width(), 5);
        }
    }

    #[test]
    fn error_projection_is_the_message() {
        assert_eq!(Object::Error("boom".into()).to_display_string(), "boom");
    }
}

//! MIME content type handling.

use std::fmt;

use crate::encoding::encode_parameter;

/// MIME content type with ordered parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Main type (e.g., "text", "application", "multipart").
    pub main_type: String,
    /// Subtype (e.g., "plain", "octet-stream", "mixed").
    pub sub_type: String,
    /// Parameters in output order (e.g., charset, boundary, name).
    pub parameters: Vec<(String, String)>,
}

impl ContentType {
    /// Creates a new content type.
    #[must_use]
    pub fn new(main_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            main_type: main_type.into(),
            sub_type: sub_type.into(),
            parameters: Vec::new(),
        }
    }

    /// Creates a `text/plain; charset="utf-8"` content type.
    #[must_use]
    pub fn text_plain() -> Self {
        Self::new("text", "plain").with_parameter("charset", "utf-8")
    }

    /// Creates an `application/octet-stream` content type named after a file.
    #[must_use]
    pub fn octet_stream(name: impl Into<String>) -> Self {
        Self::new("application", "octet-stream").with_parameter("name", name)
    }

    /// Creates a multipart/mixed content type with boundary.
    #[must_use]
    pub fn multipart_mixed(boundary: impl Into<String>) -> Self {
        Self::new("multipart", "mixed").with_parameter("boundary", boundary)
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.sub_type)?;
        for (key, value) in &self.parameters {
            write!(f, "; {}", encode_parameter(key, value))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_plain() {
        let ct = ContentType::text_plain();
        assert_eq!(ct.parameters, vec![("charset".to_string(), "utf-8".to_string())]);
        assert_eq!(ct.to_string(), "text/plain; charset=\"utf-8\"");
    }

    #[test]
    fn test_multipart_mixed() {
        let ct = ContentType::multipart_mixed("boundary123");
        assert_eq!(ct.main_type, "multipart");
        assert_eq!(ct.to_string(), "multipart/mixed; boundary=\"boundary123\"");
    }

    #[test]
    fn test_octet_stream_quotes_name() {
        let ct = ContentType::octet_stream("my \"app\".log");
        assert_eq!(
            ct.to_string(),
            "application/octet-stream; name=\"my \\\"app\\\".log\""
        );
    }

    #[test]
    fn test_octet_stream_non_ascii_name() {
        let ct = ContentType::octet_stream("journal-é.log");
        assert_eq!(
            ct.to_string(),
            "application/octet-stream; name*=utf-8''journal-%C3%A9.log"
        );
    }
}

//! On-disk representation of the state store.

use serde::{Deserialize, Serialize};

use crate::entry::LogEntry;
use crate::error::Error;

/// One buffered entry as written to the state file.
///
/// Field order here is the field order on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    /// Logger name.
    pub name: String,
    /// Upper-case severity name.
    pub levelname: String,
    /// Finished message text.
    pub message: String,
    /// Source file path.
    pub pathname: String,
    /// Source line.
    pub lineno: u32,
    /// Formatted timestamp, or `null`.
    pub asctime: Option<String>,
    /// Call-site function. Omitted when unknown; older files lack it.
    #[serde(rename = "funcName", default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

/// The whole state document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredState {
    /// Path the document was saved to.
    pub filepath: String,
    /// Pending entries in send order.
    pub buffer: Vec<StoredEntry>,
}

impl From<&LogEntry> for StoredEntry {
    fn from(entry: &LogEntry) -> Self {
        Self {
            name: entry.name.clone(),
            levelname: entry.level.as_str().to_string(),
            message: entry.message.clone(),
            pathname: entry.pathname.clone(),
            lineno: entry.lineno,
            asctime: entry.asctime.clone(),
            function: entry.function.clone(),
        }
    }
}

impl TryFrom<StoredEntry> for LogEntry {
    type Error = Error;

    fn try_from(stored: StoredEntry) -> Result<Self, Self::Error> {
        let level = stored.levelname.parse()?;
        Ok(Self {
            name: stored.name,
            level,
            message: stored.message,
            pathname: stored.pathname,
            lineno: stored.lineno,
            function: stored.function,
            asctime: stored.asctime,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entry::Level;

    #[test]
    fn test_stored_entry_from_log_entry() {
        let entry = LogEntry::new("app.db", Level::Critical, "disk full", "/srv/db.py", 88)
            .with_function("flush_pages");
        let stored = StoredEntry::from(&entry);

        assert_eq!(stored.levelname, "CRITICAL");
        assert_eq!(stored.lineno, 88);
        assert_eq!(stored.asctime, None);
        assert_eq!(stored.function.as_deref(), Some("flush_pages"));
    }

    #[test]
    fn test_function_round_trips_as_func_name() {
        let entry = LogEntry::new("app", Level::Error, "boom", "a.py", 1).with_function("main");
        let json = serde_json::to_string(&StoredEntry::from(&entry)).unwrap();
        assert!(json.ends_with(r#""asctime":null,"funcName":"main"}"#));

        let stored: StoredEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(LogEntry::try_from(stored).unwrap(), entry);
    }

    #[test]
    fn test_entry_without_func_name_loads() {
        let stored: StoredEntry = serde_json::from_str(
            r#"{"name":"app","levelname":"ERROR","message":"m","pathname":"a.py","lineno":3,"asctime":null}"#,
        )
        .unwrap();
        assert_eq!(LogEntry::try_from(stored).unwrap().function, None);
    }

    #[test]
    fn test_stored_entry_serializes_null_timestamp_in_order() {
        let entry = LogEntry::new("app", Level::Error, "boom", "a.py", 1);
        let json = serde_json::to_string(&StoredEntry::from(&entry)).unwrap();
        assert_eq!(
            json,
            r#"{"name":"app","levelname":"ERROR","message":"boom","pathname":"a.py","lineno":1,"asctime":null}"#
        );
    }

    #[test]
    fn test_unknown_levelname_is_rejected() {
        let stored = StoredEntry {
            name: "app".into(),
            levelname: "NOISY".into(),
            message: "x".into(),
            pathname: "a.py".into(),
            lineno: 1,
            asctime: None,
            function: None,
        };
        assert!(matches!(
            LogEntry::try_from(stored),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_missing_field_fails_to_parse() {
        let result = serde_json::from_str::<StoredEntry>(r#"{"name":"app","levelname":"ERROR"}"#);
        assert!(result.is_err());
    }
}

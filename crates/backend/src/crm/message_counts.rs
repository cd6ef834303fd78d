use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Счётчики сообщений CRM-кампаний по каналам
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCounts {
    /// Код канала (whatsapp, email, sms, ...) -> отправлено сообщений
    #[serde(default)]
    pub channels: BTreeMap<String, u64>,
    #[serde(default)]
    pub unread: u64,
}

impl MessageCounts {
    pub fn total(&self) -> u64 {
        self.channels.values().sum()
    }
}

/// Источник счётчиков без кэша: каждый вызов видит текущее значение
pub trait MessageCountSource: Send + Sync {
    fn current(&self) -> anyhow::Result<MessageCounts>;
}

/// Счётчики в JSON-файле, который пишет рассылка
pub struct FileMessageCounts {
    path: PathBuf,
}

impl FileMessageCounts {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MessageCountSource for FileMessageCounts {
    fn current(&self) -> anyhow::Result<MessageCounts> {
        if !self.path.exists() {
            tracing::debug!("Message counts file not found: {}", self.path.display());
            return Ok(MessageCounts::default());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(MessageCounts::default());
        }

        serde_json::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("invalid message counts in {}: {}", self.path.display(), e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("finance-crm-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_missing_file_means_zero() {
        let source = FileMessageCounts::new(temp_path("missing"));
        assert_eq!(source.current().unwrap(), MessageCounts::default());
    }

    #[test]
    fn test_changes_are_observed_between_calls() {
        let path = temp_path("live");
        let source = FileMessageCounts::new(&path);

        std::fs::write(&path, r#"{"channels": {"email": 3, "whatsapp": 7}, "unread": 2}"#).unwrap();
        let first = source.current().unwrap();
        assert_eq!(first.total(), 10);
        assert_eq!(first.unread, 2);

        std::fs::write(&path, r#"{"channels": {"email": 4}}"#).unwrap();
        let second = source.current().unwrap();
        assert_eq!(second.total(), 4);
        assert_eq!(second.unread, 0);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_garbage_is_an_error() {
        let path = temp_path("garbage");
        std::fs::write(&path, "not json").unwrap();
        assert!(FileMessageCounts::new(&path).current().is_err());
        std::fs::remove_file(&path).unwrap();
    }
}

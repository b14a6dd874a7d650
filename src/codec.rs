// Persistence document codec

use crate::error::{Error, Result};
use crate::model::Task;

/// Serialize the full task collection as a single JSON array document,
/// preserving order.
pub fn encode(tasks: &[Task]) -> Result<String> {
    serde_json::to_string(tasks).map_err(|err| Error::Storage(err.to_string()))
}

/// Parse a persisted document back into the ordered task collection.
/// Anything that is not a well-formed array of task records is corrupt.
pub fn decode(document: &str) -> Result<Vec<Task>> {
    serde_json::from_str(document).map_err(|err| Error::CorruptState(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;

    fn task(id: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {id}"),
            description: "some detail".to_string(),
            due_date: "2024-01-10".parse().unwrap(),
            status,
            created_at: "2024-01-01T09:00:00Z".parse().unwrap(),
            completed_at: match status {
                TaskStatus::Completed => Some("2024-01-09T18:00:00Z".parse().unwrap()),
                _ => None,
            },
        }
    }

    #[test]
    fn test_round_trip_preserves_order_and_fields() {
        let tasks = vec![
            task("a", TaskStatus::Completed),
            task("b", TaskStatus::Scheduled),
            task("c", TaskStatus::InProgress),
        ];

        let document = encode(&tasks).unwrap();
        let decoded = decode(&document).unwrap();

        assert_eq!(decoded, tasks);
    }

    #[test]
    fn test_empty_collection() {
        assert_eq!(encode(&[]).unwrap(), "[]");
        assert!(decode("[]").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_document_is_corrupt() {
        let err = decode("{ not json").unwrap_err();
        assert!(matches!(err, Error::CorruptState(_)));
    }

    #[test]
    fn test_non_array_document_is_corrupt() {
        let err = decode("{\"tasks\": []}").unwrap_err();
        assert!(matches!(err, Error::CorruptState(_)));
    }

    #[test]
    fn test_unknown_status_tag_is_corrupt() {
        let document = r#"[{"id":"1","title":"x","description":"","dueDate":"2024-01-10","status":"paused","createdAt":"2024-01-01T09:00:00Z","completedAt":null}]"#;
        let err = decode(document).unwrap_err();
        assert!(matches!(err, Error::CorruptState(_)));
    }

    #[test]
    fn test_missing_description_defaults_to_empty() {
        let document = r#"[{"id":"1","title":"x","dueDate":"2024-01-10","status":"scheduled","createdAt":"2024-01-01T09:00:00Z","completedAt":null}]"#;
        let tasks = decode(document).unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].description.is_empty());
    }
}

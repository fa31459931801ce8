use serde::{Deserialize, Serialize};

/// A single to-do item. Serialized field names are camelCase so the stored
/// array keeps the same shape across rebuilds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    pub created_at: i64,
    #[serde(default)]
    pub deadline: Option<i64>,
    #[serde(default)]
    pub notification_id: Option<String>,
}

impl Task {
    pub fn has_pending_alert(&self) -> bool {
        self.notification_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Input for `TaskStore::add`. Identity fields (`id`, `created_at`) are
/// assigned by the store; `completed` always starts false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub text: String,
    pub priority: Priority,
    pub deadline: Option<i64>,
    pub notification_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{Priority, Task};

    #[test]
    fn task_serializes_with_camel_case_field_names() {
        let task = Task {
            id: 1,
            text: "demo".to_string(),
            completed: false,
            priority: Priority::High,
            created_at: 2,
            deadline: Some(3),
            notification_id: Some("alert-1".to_string()),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["createdAt"], 2);
        assert_eq!(json["notificationId"], "alert-1");
        assert_eq!(json["priority"], "high");
    }

    #[test]
    fn task_deserializes_without_optional_fields() {
        let json = r#"{"id":1,"text":"demo","completed":true,"priority":"low","createdAt":2}"#;
        let task: Task = serde_json::from_str(json).unwrap();

        assert!(task.completed);
        assert_eq!(task.deadline, None);
        assert_eq!(task.notification_id, None);
    }
}

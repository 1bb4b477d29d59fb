use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    UploadError,
}

/// A dismissible, user-visible failure report. The engine only ever pushes
/// these; rendering and dismissal UI belong to the host.
#[derive(Clone, Debug)]
pub struct Notice {
    pub id: String,
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
    pub created_at_ms: i64,
    pub read: bool,
}

impl Notice {
    pub fn upload_error(message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: NoticeKind::UploadError,
            title: "Upload failed".to_string(),
            message: message.into(),
            created_at_ms: chrono::Utc::now().timestamp_millis(),
            read: false,
        }
    }
}

pub fn unread_count(items: &[Notice]) -> usize {
    items.iter().filter(|item| !item.read).count()
}

pub fn mark_all_read(items: &mut [Notice]) {
    for item in items {
        item.read = true;
    }
}

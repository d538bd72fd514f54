/// Default notice display duration in milliseconds.
const DEFAULT_DURATION_MS: u64 = 4000;

/// Error notice display duration in milliseconds (longer for visibility).
const ERROR_DURATION_MS: u64 = 6000;

/// The visual category of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// In-progress; sticky until resolved into success or error.
    Loading,
    Success,
    Error,
    Info,
}

/// A transient notification for the upload front end.
#[derive(Debug, Clone)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub text: String,
    /// `None` = no auto-dismissal (loading notices).
    pub duration_ms: Option<u64>,
}

/// In-memory notice queue with monotonic ID assignment.
///
/// Timer-based auto-dismissal is the consumer's concern; this struct
/// just holds the queue and supports the loading → success/error
/// replacement flow.
#[derive(Debug, Clone, Default)]
pub struct NoticeQueue {
    notices: Vec<Notice>,
    next_id: u64,
}

impl NoticeQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: NoticeKind, text: String, duration_ms: Option<u64>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.notices.push(Notice {
            id,
            kind,
            text,
            duration_ms,
        });
        id
    }

    /// Pushes a sticky loading notice. Returns its ID for later resolution.
    pub fn loading(&mut self, text: impl Into<String>) -> u64 {
        self.push(NoticeKind::Loading, text.into(), None)
    }

    /// Pushes a success notice with the default duration.
    pub fn success(&mut self, text: impl Into<String>) -> u64 {
        self.push(NoticeKind::Success, text.into(), Some(DEFAULT_DURATION_MS))
    }

    /// Pushes an error notice with the extended duration.
    pub fn error(&mut self, text: impl Into<String>) -> u64 {
        self.push(NoticeKind::Error, text.into(), Some(ERROR_DURATION_MS))
    }

    /// Pushes an info notice with the default duration.
    pub fn info(&mut self, text: impl Into<String>) -> u64 {
        self.push(NoticeKind::Info, text.into(), Some(DEFAULT_DURATION_MS))
    }

    /// Resolves an existing notice (usually loading) into a success.
    ///
    /// Keeps the ID and queue position. Returns `false` if the ID is gone.
    pub fn resolve_success(&mut self, id: u64, text: impl Into<String>) -> bool {
        self.resolve(id, NoticeKind::Success, text.into(), DEFAULT_DURATION_MS)
    }

    /// Resolves an existing notice (usually loading) into an error.
    pub fn resolve_error(&mut self, id: u64, text: impl Into<String>) -> bool {
        self.resolve(id, NoticeKind::Error, text.into(), ERROR_DURATION_MS)
    }

    fn resolve(&mut self, id: u64, kind: NoticeKind, text: String, duration_ms: u64) -> bool {
        match self.notices.iter_mut().find(|n| n.id == id) {
            Some(notice) => {
                notice.kind = kind;
                notice.text = text;
                notice.duration_ms = Some(duration_ms);
                true
            }
            None => false,
        }
    }

    /// Removes a notice by ID. Returns `true` if found and removed.
    pub fn remove(&mut self, id: u64) -> bool {
        let len_before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != len_before
    }

    /// Looks up a notice by ID.
    pub fn get(&self, id: u64) -> Option<&Notice> {
        self.notices.iter().find(|n| n.id == id)
    }

    /// Iterates over notices in insertion order (oldest first).
    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    /// Number of notices currently queued.
    pub fn len(&self) -> usize {
        self.notices.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    /// Removes all notices.
    pub fn clear(&mut self) {
        self.notices.clear();
    }
}

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A server-confirmed message as delivered by the history endpoint or a
/// `message:create` hub event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedMessage {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// One row of the rendered conversation: either a locally-issued message
/// still waiting for its server echo, or the authoritative record.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEntry {
    Pending {
        author_id: String,
        content: String,
        created_at: DateTime<Utc>,
    },
    Confirmed(ConfirmedMessage),
}

impl TimelineEntry {
    pub fn is_pending(&self) -> bool {
        matches!(self, TimelineEntry::Pending { .. })
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            TimelineEntry::Pending { .. } => None,
            TimelineEntry::Confirmed(m) => Some(&m.id),
        }
    }

    pub fn author_id(&self) -> &str {
        match self {
            TimelineEntry::Pending { author_id, .. } => author_id,
            TimelineEntry::Confirmed(m) => &m.author_id,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            TimelineEntry::Pending { content, .. } => content,
            TimelineEntry::Confirmed(m) => &m.content,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            TimelineEntry::Pending { created_at, .. } => *created_at,
            TimelineEntry::Confirmed(m) => m.created_at,
        }
    }
}

/// One room's message view on the client. Absorbs optimistic sends,
/// at-least-once hub events (repeats and reordering are no-ops), and
/// incremental history pages, keeping everything sorted by
/// `(created_at, id)`.
#[derive(Debug)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
    server_total: u64,
    pending_horizon: Duration,
}

impl Timeline {
    /// `pending_horizon` bounds how far apart in time an optimistic
    /// entry and its server echo may be and still be considered the
    /// same message.
    pub fn new(pending_horizon: Duration) -> Self {
        Self {
            entries: Vec::new(),
            server_total: 0,
            pending_horizon,
        }
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Messages the server knows about that we have not loaded yet.
    pub fn has_more(&self) -> bool {
        (self.confirmed_count() as u64) < self.server_total
    }

    fn confirmed_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_pending()).count()
    }

    /// Renders a just-sent message immediately, before the server
    /// confirms it.
    pub fn push_local(&mut self, author_id: &str, content: &str, now: DateTime<Utc>) {
        self.entries.push(TimelineEntry::Pending {
            author_id: author_id.to_string(),
            content: content.to_string(),
            created_at: now,
        });
        self.resort();
    }

    /// Merges a delivered event. The optimistic entry has no id yet, so
    /// matching is by author and content within the horizon; with no
    /// match the event is appended (covers delivery races and reconnect
    /// replay). Returns false for an already-known id.
    pub fn apply_event(&mut self, message: ConfirmedMessage) -> bool {
        if self.contains_id(&message.id) {
            return false;
        }

        let matched = self.entries.iter().position(|e| {
            e.is_pending()
                && e.author_id() == message.author_id
                && e.content() == message.content
                && within(e.created_at(), message.created_at, self.pending_horizon)
        });

        match matched {
            Some(idx) => {
                debug!(id = %message.id, "Optimistic entry confirmed");
                self.entries[idx] = TimelineEntry::Confirmed(message);
            }
            None => {
                self.entries.push(TimelineEntry::Confirmed(message));
            }
        }
        self.resort();
        true
    }

    /// Merges an older-history page and updates the server-side total
    /// for the has-more computation.
    pub fn merge_page(&mut self, page: Vec<ConfirmedMessage>, total: u64) {
        for message in page {
            if !self.contains_id(&message.id) {
                self.entries.push(TimelineEntry::Confirmed(message));
            }
        }
        self.server_total = total;
        self.resort();
    }

    /// Periodic reconciliation against a full refetch: merges everything
    /// by id, then purges optimistic entries that turned up confirmed —
    /// the recovery path for missed hub delivery.
    pub fn reconcile_refetch(&mut self, full: Vec<ConfirmedMessage>, total: u64) {
        self.entries.retain(|e| {
            !(e.is_pending()
                && full
                    .iter()
                    .any(|m| m.author_id == e.author_id() && m.content == e.content()))
        });
        self.merge_page(full, total);
    }

    fn contains_id(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id() == Some(id))
    }

    fn resort(&mut self) {
        self.entries.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().unwrap_or("").cmp(b.id().unwrap_or("")))
        });
    }
}

fn within(a: DateTime<Utc>, b: DateTime<Utc>, horizon: Duration) -> bool {
    (a - b).abs() <= horizon
}

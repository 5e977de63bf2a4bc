//! Per-operation sequence numbers for overlapping asynchronous requests.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// The kinds of asynchronous collaborator calls a search issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Places,
    Pricing,
    BrandConfig,
    Advisor,
}

impl OperationKind {
    fn index(self) -> usize {
        match self {
            Self::Places => 0,
            Self::Pricing => 1,
            Self::BrandConfig => 2,
            Self::Advisor => 3,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Places => "places",
            Self::Pricing => "pricing",
            Self::BrandConfig => "brand_config",
            Self::Advisor => "advisor",
        };
        f.write_str(name)
    }
}

/// Identifies one issued request. Completions carry their ticket back so
/// the reducer can discard anything older than what it already applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RequestTicket {
    pub kind: OperationKind,
    pub seq: u64,
}

/// Hands out strictly increasing tickets, one counter per [`OperationKind`].
///
/// Sequence numbers start at 1 so that 0 can mean "nothing committed yet".
#[derive(Debug, Default)]
pub struct RequestSequencer {
    counters: [AtomicU64; 4],
}

impl RequestSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket for `kind`.
    pub fn begin(&self, kind: OperationKind) -> RequestTicket {
        let seq = self.counters[kind.index()].fetch_add(1, Ordering::Relaxed) + 1;
        RequestTicket { kind, seq }
    }

    /// Sequence number of the most recently issued ticket for `kind`, or 0.
    #[must_use]
    pub fn latest(&self, kind: OperationKind) -> u64 {
        self.counters[kind.index()].load(Ordering::Relaxed)
    }

    /// `true` when `ticket` is the newest ticket issued for its kind.
    #[must_use]
    pub fn is_latest(&self, ticket: RequestTicket) -> bool {
        self.latest(ticket.kind) == ticket.seq
    }
}

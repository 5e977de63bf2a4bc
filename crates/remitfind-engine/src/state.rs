//! Per-screen search state and the reducer that is its only writer.
//!
//! Every completion is tagged with the [`RequestTicket`] it was issued under.
//! Only the newest issued ticket of a kind may commit: a completion that is
//! not newer than the last one applied, or that a later ticket of the same
//! kind has superseded, is dropped.
//! Annotations, the recommendation and the selection are derived values and
//! are rebuilt after every data-changing action.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::fusion::{derive_hints, fuse, Recommendation};
use crate::matcher::annotate_locations;
use crate::resolve::AliasTable;
use crate::selector::SelectionResult;
use crate::sequence::{OperationKind, RequestTicket};
use crate::types::{
    AdvisorResponse, AnnotatedLocation, BrandConfigOverride, Coordinates, PricedChannel,
    RawLocation,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// A collaborator call failed; its data is empty for this search.
    NetworkFailure,
    /// The advisor replied without a structured pick.
    AdvisorDegraded,
}

/// A user-visible message about a recoverable failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub operation: OperationKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Begin a new search. Clears every per-search field; the alias table
    /// and brand configuration survive.
    SearchStarted { origin: Option<Coordinates> },
    RequestStarted(RequestTicket),
    LocationsLoaded {
        ticket: RequestTicket,
        locations: Vec<RawLocation>,
    },
    ChannelsPriced {
        ticket: RequestTicket,
        channels: Vec<PricedChannel>,
    },
    /// `None` means the service had nothing to offer; the current rules stay.
    BrandConfigLoaded {
        ticket: RequestTicket,
        config: Option<BrandConfigOverride>,
    },
    AdvisorResponded {
        ticket: RequestTicket,
        response: AdvisorResponse,
    },
    RequestFailed {
        ticket: RequestTicket,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub aliases: AliasTable,
    /// Brands priced when no location carries a recognised brand.
    pub configured_brands: Vec<String>,
    pub search_terms: Vec<String>,
    pub travel_speed_kmh: f64,

    pub origin: Option<Coordinates>,
    pub raw_locations: Vec<RawLocation>,
    pub priced_channels: Vec<PricedChannel>,
    pub advisor_reply: Option<AdvisorResponse>,

    pub annotated: Vec<AnnotatedLocation>,
    pub recommendation: Option<Recommendation>,
    pub selection: SelectionResult,

    pub in_flight: BTreeSet<OperationKind>,
    pub notices: Vec<Notice>,

    committed: BTreeMap<OperationKind, u64>,
    started: BTreeMap<OperationKind, u64>,
}

impl SearchState {
    #[must_use]
    pub fn new(aliases: AliasTable, travel_speed_kmh: f64) -> Self {
        let configured_brands = aliases.known_brands();
        Self {
            aliases,
            configured_brands,
            search_terms: Vec::new(),
            travel_speed_kmh,
            origin: None,
            raw_locations: Vec::new(),
            priced_channels: Vec::new(),
            advisor_reply: None,
            annotated: Vec::new(),
            recommendation: None,
            selection: SelectionResult::default(),
            in_flight: BTreeSet::new(),
            notices: Vec::new(),
            committed: BTreeMap::new(),
            started: BTreeMap::new(),
        }
    }

    /// Highest sequence number applied for `kind`, or 0.
    #[must_use]
    pub fn committed(&self, kind: OperationKind) -> u64 {
        self.committed.get(&kind).copied().unwrap_or(0)
    }

    /// Latest sequence number issued for `kind`, or 0.
    fn started(&self, kind: OperationKind) -> u64 {
        self.started.get(&kind).copied().unwrap_or(0)
    }

    /// Record a completion for `ticket` if it is the latest one issued for its
    /// kind and newer than anything applied.
    fn accept(&mut self, ticket: RequestTicket) -> bool {
        let committed = self.committed(ticket.kind);
        let started = self.started(ticket.kind);
        if ticket.seq <= committed || ticket.seq < started {
            tracing::debug!(
                kind = %ticket.kind,
                seq = ticket.seq,
                committed,
                started,
                "dropping stale completion"
            );
            return false;
        }
        self.committed.insert(ticket.kind, ticket.seq);
        self.in_flight.remove(&ticket.kind);
        true
    }

    fn start_search(&mut self, origin: Option<Coordinates>) {
        // Anything issued before this point belongs to the previous search.
        for (kind, started) in &self.started {
            let committed = self.committed.entry(*kind).or_insert(0);
            *committed = (*committed).max(*started);
        }
        self.in_flight.clear();
        self.origin = origin;
        self.raw_locations.clear();
        self.priced_channels.clear();
        self.advisor_reply = None;
        self.notices.clear();
    }

    fn apply_brand_config(&mut self, config: Option<BrandConfigOverride>) {
        let Some(config) = config.filter(|c| !c.is_empty()) else {
            tracing::debug!("no brand configuration override; keeping current alias rules");
            return;
        };
        tracing::debug!(
            aliases = config.aliases.len(),
            brands = config.brands.len(),
            "installing brand configuration override"
        );
        self.aliases.set_dynamic(config.aliases);
        self.configured_brands = if config.brands.is_empty() {
            self.aliases.known_brands()
        } else {
            config.brands
        };
        if !config.search_terms.is_empty() {
            self.search_terms = config.search_terms;
        }
    }

    fn apply_failure(&mut self, ticket: RequestTicket, message: String) {
        match ticket.kind {
            OperationKind::BrandConfig => {
                tracing::debug!(error = %message, "brand configuration unavailable; keeping current alias rules");
                return;
            }
            OperationKind::Places => self.raw_locations.clear(),
            OperationKind::Pricing => self.priced_channels.clear(),
            OperationKind::Advisor => self.advisor_reply = None,
        }
        tracing::warn!(kind = %ticket.kind, error = %message, "request failed");
        self.notices.push(Notice {
            kind: NoticeKind::NetworkFailure,
            operation: ticket.kind,
            message,
        });
    }

    /// Rebuild annotations, the recommendation and the selection from the
    /// current inputs.
    fn rederive(&mut self) {
        self.annotated =
            annotate_locations(&self.raw_locations, &self.priced_channels, &self.aliases);

        let Some(reply) = self.advisor_reply.as_ref() else {
            self.recommendation = None;
            self.selection = SelectionResult::default();
            return;
        };
        let hints = derive_hints(&self.annotated);
        let (recommendation, selection) =
            fuse(reply, &self.annotated, &hints, self.travel_speed_kmh);
        self.recommendation = Some(recommendation);
        self.selection = selection;
    }

    fn note_degraded(&mut self) {
        let degraded = self
            .recommendation
            .as_ref()
            .is_some_and(Recommendation::is_degraded);
        let already = self
            .notices
            .iter()
            .any(|n| n.kind == NoticeKind::AdvisorDegraded);
        if degraded && !already {
            self.notices.push(Notice {
                kind: NoticeKind::AdvisorDegraded,
                operation: OperationKind::Advisor,
                message: "the advisor returned a text-only recommendation".to_string(),
            });
        }
    }
}

/// Apply `action` to `state`.
#[must_use]
pub fn reduce(mut state: SearchState, action: Action) -> SearchState {
    match action {
        Action::SearchStarted { origin } => {
            state.start_search(origin);
        }
        Action::RequestStarted(ticket) => {
            let started = state.started.entry(ticket.kind).or_insert(0);
            *started = (*started).max(ticket.seq);
            state.in_flight.insert(ticket.kind);
            return state;
        }
        Action::LocationsLoaded { ticket, locations } => {
            if !state.accept(ticket) {
                return state;
            }
            state.raw_locations = locations;
        }
        Action::ChannelsPriced { ticket, channels } => {
            if !state.accept(ticket) {
                return state;
            }
            state.priced_channels = channels;
        }
        Action::BrandConfigLoaded { ticket, config } => {
            if !state.accept(ticket) {
                return state;
            }
            state.apply_brand_config(config);
        }
        Action::AdvisorResponded { ticket, response } => {
            if !state.accept(ticket) {
                return state;
            }
            state.advisor_reply = Some(response);
        }
        Action::RequestFailed { ticket, message } => {
            if !state.accept(ticket) {
                return state;
            }
            state.apply_failure(ticket, message);
        }
    }
    state.rederive();
    state.note_degraded();
    state
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;

//! Brand matching and nearest-channel selection for the "find best rate" flow.
//!
//! Everything in this crate is synchronous and free of I/O: the HTTP clients
//! live in `remitfind-client` and the orchestration in `remitfind-cli`.
//! Re-running any function here with the same inputs yields the same output.

pub mod canonical;
pub mod distance;
pub mod error;
pub mod fusion;
pub mod matcher;
pub mod places;
pub mod resolve;
pub mod selector;
pub mod sequence;
pub mod state;
pub mod types;

pub use canonical::canonicalize;
pub use distance::{estimate_travel_minutes, haversine_km, EARTH_RADIUS_KM};
pub use error::EngineError;
pub use fusion::{
    build_advisor_request, build_pricing_request, derive_hints, fuse, reconcile, AdvisorHints,
    Recommendation, StructuredRecommendation, TransferQuery,
};
pub use matcher::annotate_locations;
pub use places::{make_place_id, parse_places, ParsedPlaces};
pub use resolve::{resolve_brand, AliasTable};
pub use selector::{select_nearest, SelectionResult};
pub use sequence::{OperationKind, RequestSequencer, RequestTicket};
pub use state::{reduce, Action, Notice, NoticeKind, SearchState};
pub use types::{
    parse_pricing_channels, AdvisorBest, AdvisorRequest, AdvisorResponse, AnnotatedLocation,
    BrandConfigOverride, Coordinates, PricedChannel, PricingRequest, RawLocation,
    RecommendationOption,
};

//! Extraction pipeline: parsing, transport, sequencing and normalization.

pub mod credentials;
pub mod extractor;
pub mod fallback;
pub mod fetch_plan;
pub mod http;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod transport;

pub use credentials::{PlaylistCredentials, Scheme};
pub use extractor::{Extractor, ExtractorConfig};
pub use fetch_plan::{
    AttemptOutcome, DirectPolicy, ExtractionAttempt, FetchPlan, ProxyDescriptor, Strategy,
    default_proxies,
};
pub use http::HttpTransport;
pub use models::{
    AccountProfile, AccountStatus, ExtractReport, Extraction, ExtractionOutcome, Inspection,
    PlanTier, ProfileSource, RobotOutput, StrategyChain,
};
pub use progress::{ProgressSink, Silent};
pub use transport::{Transport, TransportResponse};

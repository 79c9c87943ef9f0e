pub mod audit;
pub mod error;
pub mod input;
pub mod orifice;
pub mod report;
pub mod search;
pub mod session;

pub use audit::{FileSink, LogSink, MemorySink, SearchRecord, SearchSink};
pub use error::{AuditError, FlowError, InputError, SearchError};
pub use input::SearchForm;
pub use orifice::{flow, velocity_of_approach, FlowParameters};
pub use search::{relax_tolerance, search, BetaRange, SearchRequest, SearchResult};
pub use session::Session;

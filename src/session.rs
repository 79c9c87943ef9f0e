use log::{debug, warn};

use crate::audit::{SearchRecord, SearchSink};
use crate::search::{relax_tolerance, search, SearchRequest, SearchResult};

/// Runs searches against an injected audit sink and remembers the last
/// request so it can be retried with a wider tolerance.
pub struct Session<S: SearchSink> {
    sink: S,
    last: Option<SearchRequest>,
}

impl<S: SearchSink> Session<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, last: None }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn last_request(&self) -> Option<&SearchRequest> {
        self.last.as_ref()
    }

    pub fn run(&mut self, request: SearchRequest) -> SearchResult {
        debug!(
            "searching beta over {} with {} samples, Q={} +/- {}",
            request.beta_range, request.sample_count, request.desired_flow, request.tolerance
        );

        let result = search(&request);

        let anomalies = result.anomaly_count();
        if anomalies > 0 {
            warn!(
                "{} of {} samples left the flow equation's domain",
                anomalies, request.sample_count
            );
        }

        // Audit failures never fail the search
        if let Err(e) = self.sink.record(&SearchRecord::new(&request, &result)) {
            warn!("could not record search: {e}");
        }

        self.last = Some(request);
        result
    }

    /// Repeats the last search with twice its tolerance. `None` until a search has run.
    pub fn relax(&mut self) -> Option<(SearchRequest, SearchResult)> {
        let request = relax_tolerance(self.last.as_ref()?);
        let result = self.run(request.clone());
        Some((request, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemorySink;
    use crate::error::AuditError;
    use crate::orifice::FlowParameters;

    struct FailingSink;

    impl SearchSink for FailingSink {
        fn record(&self, _: &SearchRecord) -> Result<(), AuditError> {
            Err(AuditError::Poisoned)
        }
    }

    fn request() -> SearchRequest {
        let params = FlowParameters::new(0.1, 0.6, 5000.0, 1000.0).unwrap();
        SearchRequest::new(params, 0.002, 1e-6).unwrap()
    }

    #[test]
    fn relax_before_run_is_none() {
        let mut session = Session::new(MemorySink::default());
        assert!(session.relax().is_none());
        assert!(session.sink().records().is_empty());
    }

    #[test]
    fn run_records_once() {
        let mut session = Session::new(MemorySink::default());
        let result = session.run(request());
        assert_eq!(result, search(&request()));
        assert_eq!(session.last_request(), Some(&request()));

        let records = session.sink().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].optimal_beta, None);
    }

    #[test]
    fn relax_chains_from_last_request() {
        let mut session = Session::new(MemorySink::default());
        session.run(request());
        let (first, _) = session.relax().unwrap();
        let (second, _) = session.relax().unwrap();
        assert_eq!(first.tolerance, 2e-6);
        assert_eq!(second.tolerance, 4e-6);
        assert_eq!(second.desired_flow, 0.002);

        let tolerances: Vec<f64> = session
            .sink()
            .records()
            .iter()
            .map(|r| r.tolerance)
            .collect();
        assert_eq!(tolerances, vec![1e-6, 2e-6, 4e-6]);
    }

    #[test]
    fn sink_failure_does_not_fail_search() {
        let mut session = Session::new(FailingSink);
        let result = session.run(request());
        assert_eq!(result.sampled_flows.len(), 1000);
    }
}

use uuid::Uuid;

use crate::{ResultBuckets, SiftService};
use sift_domain::SearchIntent;

pub const ANALYSIS_FALLBACK: &str = "analysis unavailable, raw results returned";

impl SiftService {
	/// Summarizes non-empty results when the intent asks for it. Summarizer failures are
	/// never propagated; the caller gets the fallback text instead.
	pub(crate) async fn analyze(
		&self,
		intent: &SearchIntent,
		results: &ResultBuckets,
		trace_id: Uuid,
	) -> Option<String> {
		if !intent.deep_analysis || results.is_empty() {
			return None;
		}

		match self
			.providers
			.summarizer
			.summarize(&self.cfg.providers.summarizer, results, intent)
			.await
		{
			Ok(text) => Some(text),
			Err(err) => {
				tracing::warn!(trace_id = %trace_id, error = %err, "Analysis failed; returning raw results.");

				Some(ANALYSIS_FALLBACK.to_string())
			},
		}
	}
}

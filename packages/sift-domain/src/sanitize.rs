/// Characters the discovery language treats as operators.
pub const RESERVED_OPERATORS: [char; 5] = ['&', '%', '*', '?', '~'];

/// Replaces reserved operators with spaces, collapses whitespace, trims, and drops terms
/// left empty. Total and idempotent.
pub fn sanitize_keywords<S>(raw: &[S]) -> Vec<String>
where
	S: AsRef<str>,
{
	raw.iter().filter_map(|keyword| sanitize_keyword(keyword.as_ref())).collect()
}

pub fn sanitize_keyword(raw: &str) -> Option<String> {
	let replaced: String =
		raw.chars().map(|c| if RESERVED_OPERATORS.contains(&c) { ' ' } else { c }).collect();
	let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");

	if collapsed.is_empty() { None } else { Some(collapsed) }
}

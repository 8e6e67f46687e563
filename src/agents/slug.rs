//! Agent slug (uid) generation.

use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;

/// Base used when a name has no ASCII alphanumerics at all
const FALLBACK_BASE: &str = "agent";

fn separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("[^a-z0-9]+").expect("static regex"))
}

/// Slug for `name` stamped with the current time in milliseconds
pub fn generate_slug(name: &str) -> String {
    slug_at(name, Utc::now().timestamp_millis())
}

/// Slug for `name` stamped with `millis`.
///
/// `"Sales Bot"` at 1712345678901 becomes `sales-bot-1712345678901`. The
/// result is never empty, never purely numeric and never starts or ends
/// with a hyphen.
pub fn slug_at(name: &str, millis: i64) -> String {
    let lowered = name.to_lowercase();
    let collapsed = separators().replace_all(&lowered, "-");
    let base = collapsed.trim_matches('-');
    let base = if base.is_empty() { FALLBACK_BASE } else { base };
    format!("{}-{}", base, millis)
}

/// Uid of the knowledge base that belongs to `agent_slug`
pub fn knowledge_base_slug(agent_slug: &str) -> String {
    format!("{}-kb", agent_slug)
}

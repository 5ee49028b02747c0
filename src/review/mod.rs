mod openai;

pub use openai::{OpenAiReviewer, OPENAI_API_URL};

pub const REVIEW_PROMPT: &str = "Check grammar and spelling mistakes of the news item. \
If there are no mistakes, reply: OK. \
If there are any mistakes, reply: Caution, and list all found mistakes, one per line.";

/// What the grammar reviewer produced for one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    Verdict(String),
    Failure(String),
}

/// Reduce a raw model reply to verdict text: `OK` for a clean reply, otherwise
/// the listed mistakes without the leading `Caution` marker.
pub fn normalize_verdict(raw: &str) -> String {
    let reply = raw.trim();

    if has_prefix(reply, "ok") {
        return "OK".to_string();
    }

    if has_prefix(reply, "caution") {
        let mistakes = reply["caution".len()..]
            .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | ',' | '-' | '.'))
            .trim_end();
        return if mistakes.is_empty() {
            reply.to_string()
        } else {
            mistakes.to_string()
        };
    }

    let lower = reply.to_lowercase();
    if lower.contains("no mistakes") || lower.contains("no errors") {
        return "OK".to_string();
    }

    reply.to_string()
}

fn has_prefix(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .map(|p| p.eq_ignore_ascii_case(prefix))
        .unwrap_or(false)
}

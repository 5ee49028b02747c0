use crate::checker::{RuleCategory, Violation};
use crate::filter::FilterOutcome;
use crate::NewsLink;
use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Caution,
    /// Content could not be extracted; recorded so the URL is not fetched again.
    Skipped,
    /// The grammar review failed and the rule checks found nothing.
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Ok => "OK",
            Status::Caution => "Caution",
            Status::Skipped => "Skipped",
            Status::Error => "Error",
        };
        f.write_str(s)
    }
}

/// Aggregate verdict for one article: rule violations followed by model findings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assessment {
    pub violations: Vec<Violation>,
    /// Why the grammar review could not be used, when it failed.
    pub review_failure: Option<String>,
}

impl Assessment {
    pub fn new(rule_violations: Vec<Violation>, model: &FilterOutcome) -> Self {
        let mut violations = rule_violations;
        violations.extend(
            model
                .findings()
                .iter()
                .map(|line| Violation::new(RuleCategory::GrammarModel, line.as_str())),
        );
        Assessment {
            violations,
            review_failure: None,
        }
    }

    /// Rule findings alone, for an article whose grammar review failed.
    pub fn without_review<S: Into<String>>(rule_violations: Vec<Violation>, reason: S) -> Self {
        Assessment {
            violations: rule_violations,
            review_failure: Some(reason.into()),
        }
    }

    pub fn status(&self) -> Status {
        match (self.violations.is_empty(), &self.review_failure) {
            (false, _) => Status::Caution,
            (true, Some(_)) => Status::Error,
            (true, None) => Status::Ok,
        }
    }

    /// Numbered violation list, `None` when clean.
    pub fn mistakes(&self) -> Option<String> {
        if self.violations.is_empty() {
            return None;
        }
        Some(
            self.violations
                .iter()
                .enumerate()
                .map(|(i, v)| format!("{}. {}", i + 1, v))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}

/// Operator notification for one checked article.
#[derive(Debug)]
pub struct Report<'a> {
    pub index: usize,
    pub link: &'a NewsLink,
    pub assessment: &'a Assessment,
    pub checked_at: DateTime<Utc>,
}

impl<'a> Report<'a> {
    pub fn subject(&self) -> String {
        format!(
            "News Grammar Check - News #{} - {}",
            self.index,
            self.assessment.status()
        )
    }

    pub fn body(&self) -> String {
        let mut body = format!(
            "News #{}\nTitle: {}\nArticle Link: {}\nStatus: {}\n",
            self.index,
            self.link.title,
            self.link.url,
            self.assessment.status()
        );
        if let Some(reason) = &self.assessment.review_failure {
            body.push_str(&format!("Grammar review failed: {}\n", reason));
        }
        if let Some(mistakes) = self.assessment.mistakes() {
            body.push_str("\nMistakes Found:\n");
            body.push_str(&mistakes);
            body.push('\n');
        }
        body.push_str(&format!(
            "\nChecked at: {}",
            self.checked_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        body
    }
}

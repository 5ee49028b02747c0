use itertools::Itertools;
use lazy_regex::{regex, Regex};
use tracing::debug;

const CRITICAL_KEYWORDS: &[&str] = &[
    "spelling",
    "verb",
    "agreement",
    "incorrect",
    "wrong",
    "should be",
];

const DEFAULT_TRIVIAL_RATIO: f64 = 0.7;

/// Result of filtering a model verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    Clean,
    Findings(Vec<String>),
}

impl FilterOutcome {
    pub fn is_clean(&self) -> bool {
        matches!(self, FilterOutcome::Clean)
    }

    pub fn findings(&self) -> &[String] {
        match self {
            FilterOutcome::Clean => &[],
            FilterOutcome::Findings(lines) => lines.as_slice(),
        }
    }

    /// Verdict text as it would be fed back into the filter.
    pub fn to_verdict_text(&self) -> String {
        match self {
            FilterOutcome::Clean => "OK".to_string(),
            FilterOutcome::Findings(lines) => lines.join("\n"),
        }
    }
}

/// Discounts model verdicts made only of stylistic nitpicks.
///
/// A verdict surfaces when any line carries a substantive-error keyword, or when
/// fewer than `trivial_ratio` of its lines match a trivial pattern. Empty,
/// `OK`, and boilerplate-only verdicts are clean.
#[derive(Debug, Clone)]
pub struct FalsePositiveFilter {
    trivial_ratio: f64,
    critical_keywords: Vec<String>,
    trivial_patterns: Vec<&'static Regex>,
    ignorable_patterns: Vec<&'static Regex>,
}

impl Default for FalsePositiveFilter {
    fn default() -> Self {
        FalsePositiveFilter {
            trivial_ratio: DEFAULT_TRIVIAL_RATIO,
            critical_keywords: CRITICAL_KEYWORDS.iter().map(ToString::to_string).collect(),
            trivial_patterns: vec![
                regex!(r"(?i)capitali[sz]|\bcasing\b|lower ?case|upper ?case|title case"),
                regex!(r"(?i)\bcommas?\b|\bperiods?\b|punctuation|spacing|\bspaces?\b|full stop|hyphen"),
                regex!(r"(?i)quotation|quote marks|\bquotes?\b"),
                regex!(r"(?i)redundan|repetiti|unnecessary word"),
                regex!(r"(?i)date format|format of the date"),
                regex!(r"(?i)unclear|awkward|wording|phrasing|clarity|could be clearer"),
                regex!(r"(?i)\bSPA\b|press agency|agency (text|name|tag)|dateline"),
            ],
            ignorable_patterns: vec![
                regex!(r"(?i)copyright|all rights reserved|reserved rights|©"),
                regex!(r"(?i)^ok\.?$"),
            ],
        }
    }
}

impl FalsePositiveFilter {
    pub fn with_trivial_ratio(mut self, ratio: f64) -> Self {
        self.trivial_ratio = ratio;
        self
    }

    /// Order of evaluation: blank or `OK` is clean; then non-empty lines are
    /// trimmed, boilerplate lines dropped (unless they carry a critical keyword)
    /// and duplicates removed. The keyword override and the trivial ratio both
    /// work on that reduced set, so feeding the findings back in is a no-op.
    pub fn apply(&self, verdict: &str) -> FilterOutcome {
        let verdict = verdict.trim();
        if verdict.is_empty() || verdict.eq_ignore_ascii_case("ok") {
            return FilterOutcome::Clean;
        }

        let lines = verdict
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && (self.is_critical(l) || !self.is_ignorable(l)))
            .unique()
            .map(ToString::to_string)
            .collect::<Vec<_>>();

        if lines.is_empty() {
            return FilterOutcome::Clean;
        }

        if lines.iter().any(|l| self.is_critical(l)) {
            return FilterOutcome::Findings(lines);
        }

        let trivial = lines.iter().filter(|l| self.is_trivial(l)).count();
        let ratio = trivial as f64 / lines.len() as f64;
        if ratio >= self.trivial_ratio {
            debug!(trivial, total = lines.len(), "Discarded verdict as false positive");
            FilterOutcome::Clean
        } else {
            FilterOutcome::Findings(lines)
        }
    }

    fn is_critical(&self, line: &str) -> bool {
        let line = line.to_lowercase();
        self.critical_keywords.iter().any(|k| line.contains(k.as_str()))
    }

    fn is_trivial(&self, line: &str) -> bool {
        self.trivial_patterns.iter().any(|re| re.is_match(line))
    }

    fn is_ignorable(&self, line: &str) -> bool {
        self.ignorable_patterns.iter().any(|re| re.is_match(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filter() -> FalsePositiveFilter {
        FalsePositiveFilter::default()
    }

    #[test]
    fn ok_and_blank_are_clean() {
        assert_eq!(filter().apply("OK"), FilterOutcome::Clean);
        assert_eq!(filter().apply("  ok \n"), FilterOutcome::Clean);
        assert_eq!(filter().apply(""), FilterOutcome::Clean);
        assert_eq!(filter().apply(" \n\n "), FilterOutcome::Clean);
    }

    #[test]
    fn single_trivial_line_is_clean() {
        assert_eq!(
            filter().apply("Consider capitalizing the date format."),
            FilterOutcome::Clean
        );
    }

    #[test]
    fn critical_keyword_overrides_ratio() {
        let verdict = "The verb agreement is incorrect here.";
        assert_eq!(
            filter().apply(verdict),
            FilterOutcome::Findings(vec![verdict.to_string()])
        );

        let mixed = "Missing comma after Riyadh\nExtra space before period\nCapitalize 'minister'\n'recieve' should be 'receive'";
        assert_eq!(filter().apply(mixed).findings().len(), 4);
    }

    #[test]
    fn mostly_trivial_is_discarded() {
        let verdict = "Missing comma after Riyadh\nExtra space before period\nUse title case in the headline\nThe sentence about the visit is vague";
        assert_eq!(filter().apply(verdict), FilterOutcome::Clean);
    }

    #[test]
    fn substantive_below_ratio_surfaces() {
        let verdict = "Missing comma after Riyadh\nThe second paragraph repeats the first one\nThe figure 30 billion contradicts the headline";
        assert_eq!(
            filter().apply(verdict),
            FilterOutcome::Findings(vec![
                "Missing comma after Riyadh".to_string(),
                "The second paragraph repeats the first one".to_string(),
                "The figure 30 billion contradicts the headline".to_string(),
            ])
        );
    }

    #[test]
    fn boilerplate_and_duplicates_are_stripped() {
        let verdict = "Ministre is misspelled, spelling error\nAll rights reserved to the agency\nMinistre is misspelled, spelling error\n© 2024";
        assert_eq!(
            filter().apply(verdict),
            FilterOutcome::Findings(vec!["Ministre is misspelled, spelling error".to_string()])
        );
    }

    #[test]
    fn critical_line_mentioning_boilerplate_surfaces() {
        let verdict = "The copyright year in the footer is wrong";
        assert_eq!(
            filter().apply(verdict),
            FilterOutcome::Findings(vec![verdict.to_string()])
        );
        assert_eq!(
            filter().apply("© 2024
The © line has an incorrect year"),
            FilterOutcome::Findings(vec!["The © line has an incorrect year".to_string()])
        );
    }

    #[test]
    fn ratio_counts_lines_after_dedupe() {
        let verdict = "Missing comma after Riyadh
Extra space before period
Use title case in the headline
Figures do not add up
Figures do not add up";
        assert_eq!(filter().apply(verdict), FilterOutcome::Clean);
    }

    #[test]
    fn boilerplate_only_is_clean() {
        assert_eq!(
            filter().apply("Copyright notice\nAll rights reserved"),
            FilterOutcome::Clean
        );
    }

    #[test]
    fn refiltering_is_idempotent() {
        let verdicts = [
            "The verb agreement is incorrect here.\nThe verb agreement is incorrect here.",
            "Comma missing\nComma missing\nComma missing\nDates are inconsistent\nNames differ between paragraphs",
            "OK\nOK",
            "Figures do not add up\nCopyright 2024",
            "The copyright year is wrong\nCopyright 2024",
        ];
        for verdict in verdicts {
            let once = filter().apply(verdict);
            let twice = filter().apply(&once.to_verdict_text());
            assert_eq!(once, twice, "verdict: {verdict}");
        }
    }

    #[test]
    fn threshold_is_configurable() {
        let verdict = "Missing comma after Riyadh\nThe figure contradicts the headline";
        assert!(!filter().apply(verdict).is_clean());
        assert!(filter().with_trivial_ratio(0.5).apply(verdict).is_clean());
    }
}

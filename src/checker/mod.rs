mod rules;
mod style;

pub use rules::{RegionNameEntry, RuleBook};
pub use style::{standard_style_rules, Pattern, Scope, StyleRule};

use crate::ArticleText;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    NameForm,
    RegionForm,
    StyleRule,
    GrammarModel,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleCategory::NameForm => "Name form",
            RuleCategory::RegionForm => "Region form",
            RuleCategory::StyleRule => "Style rule",
            RuleCategory::GrammarModel => "Grammar",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub category: RuleCategory,
    pub message: String,
}

impl Violation {
    pub fn new<S: Into<String>>(category: RuleCategory, message: S) -> Self {
        Violation {
            category,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

/// Deterministic style-guide checks over article text.
///
/// All checks always run. Output is ordered: name entries in table order, region
/// entries in table order, then the style rules in their declared order.
#[derive(Debug, Clone)]
pub struct ViolationChecker {
    rules: RuleBook,
    style_rules: Vec<StyleRule>,
}

impl ViolationChecker {
    pub fn new(rules: RuleBook) -> Self {
        ViolationChecker {
            rules,
            style_rules: standard_style_rules(),
        }
    }

    pub fn with_style_rules(rules: RuleBook, style_rules: Vec<StyleRule>) -> Self {
        ViolationChecker { rules, style_rules }
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    pub fn check(&self, text: &ArticleText) -> Vec<Violation> {
        let text = text.as_str();
        let mut violations = vec![];
        self.check_names(text, &mut violations);
        self.check_regions(text, &mut violations);
        self.check_style(text, &mut violations);
        violations
    }

    fn check_names(&self, text: &str, out: &mut Vec<Violation>) {
        for canonical in &self.rules.official_names {
            if text.contains(canonical.as_str()) {
                continue;
            }
            let needle = canonical.to_lowercase();
            if text.lines().any(|line| line.to_lowercase().contains(&needle)) {
                out.push(Violation::new(
                    RuleCategory::NameForm,
                    format!("Official name should be written as \"{}\"", canonical),
                ));
            }
        }
    }

    fn check_regions(&self, text: &str, out: &mut Vec<Violation>) {
        for region in &self.rules.regions {
            for variant in region.variants.iter().filter(|v| !v.is_empty()) {
                if text.contains(variant.as_str()) {
                    out.push(Violation::new(
                        RuleCategory::RegionForm,
                        format!("\"{}\" → \"{}\"", variant, region.canonical),
                    ));
                }
            }
        }
    }

    fn check_style(&self, text: &str, out: &mut Vec<Violation>) {
        for rule in self.style_rules.iter().filter(|r| r.fires(text)) {
            out.push(Violation::new(
                RuleCategory::StyleRule,
                format!("{}: {}", rule.id, rule.message),
            ));
        }
    }
}

impl Default for ViolationChecker {
    fn default() -> Self {
        ViolationChecker::new(RuleBook::default())
    }
}

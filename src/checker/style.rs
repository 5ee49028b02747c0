use lazy_regex::{regex, Regex};

/// Part of the article a style rule looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Headline,
    FullText,
}

#[derive(Debug, Clone)]
pub enum Pattern {
    /// Trimmed text ends with `.`
    TrailingPeriod,
    /// Any of the words, ignoring case.
    AnyIgnoreCase(&'static [&'static str]),
    Literal(&'static str),
    AnyLiteral(&'static [&'static str]),
    Regex(&'static Regex),
}

impl Pattern {
    pub fn is_match(&self, haystack: &str) -> bool {
        match self {
            Pattern::TrailingPeriod => haystack.trim().ends_with('.'),
            Pattern::AnyIgnoreCase(words) => {
                let haystack = haystack.to_lowercase();
                words.iter().any(|w| haystack.contains(&w.to_lowercase()))
            }
            Pattern::Literal(s) => haystack.contains(s),
            Pattern::AnyLiteral(items) => items.iter().any(|s| haystack.contains(s)),
            Pattern::Regex(re) => re.is_match(haystack),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StyleRule {
    pub id: &'static str,
    pub scope: Scope,
    pub pattern: Pattern,
    pub message: &'static str,
}

impl StyleRule {
    /// Whether the rule fires on `text`. Headline rules see only the first line.
    pub fn fires(&self, text: &str) -> bool {
        match self.scope {
            Scope::Headline => text
                .lines()
                .next()
                .map(|headline| self.pattern.is_match(headline))
                .unwrap_or(false),
            Scope::FullText => self.pattern.is_match(text),
        }
    }
}

/// House style rules, evaluated in this order.
pub fn standard_style_rules() -> Vec<StyleRule> {
    vec![
        StyleRule {
            id: "R1",
            scope: Scope::Headline,
            pattern: Pattern::TrailingPeriod,
            message: "Headline should not end with a period",
        },
        StyleRule {
            id: "R2",
            scope: Scope::Headline,
            pattern: Pattern::AnyIgnoreCase(&["started", "concluded"]),
            message: "Headline should use the present tense (\"starts\", \"concludes\")",
        },
        StyleRule {
            id: "R3",
            scope: Scope::FullText,
            pattern: Pattern::Literal("\""),
            message: "Use single quotation marks instead of double quotation marks",
        },
        StyleRule {
            id: "R4",
            scope: Scope::FullText,
            pattern: Pattern::Regex(regex!(
                r"Minister(s?), [A-Z][a-z]+ [A-Z][a-z]+ discuss(es?) cooperation"
            )),
            message: "Subject-verb agreement: check \"discuss\"/\"discusses\" against its subject",
        },
        StyleRule {
            id: "R5",
            scope: Scope::FullText,
            pattern: Pattern::Literal("at Riyadh"),
            message: "Use \"in Riyadh\" instead of \"at Riyadh\"",
        },
        StyleRule {
            id: "R6",
            scope: Scope::FullText,
            pattern: Pattern::AnyLiteral(&["meat in Cairo", "sing MoU"]),
            message: "Typo: \"meat\" should be \"meet\", \"sing\" should be \"sign\"",
        },
        StyleRule {
            id: "R7",
            scope: Scope::FullText,
            pattern: Pattern::Regex(regex!(r"\s+,|\.\.")),
            message: "Punctuation spacing: no space before a comma and no double periods",
        },
        StyleRule {
            id: "R8",
            scope: Scope::FullText,
            pattern: Pattern::Literal("The Minister"),
            message: "Use lowercase \"the minister\" in running text",
        },
    ]
}

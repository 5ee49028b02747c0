use std::fmt;

/// A candidate article found on the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsLink {
    pub url: String,
    pub title: String,
}

/// Cleaned body text of one article. The first line is the headline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleText(String);

impl ArticleText {
    pub fn new<S: Into<String>>(text: S) -> Self {
        ArticleText(text.into())
    }

    pub fn from_parts<S: AsRef<str>>(headline: &str, paragraphs: &[S]) -> Self {
        let mut text = headline.trim().to_string();
        for p in paragraphs {
            text.push('\n');
            text.push_str(p.as_ref());
        }
        ArticleText(text)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn headline(&self) -> Option<&str> {
        self.0.lines().next()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl AsRef<str> for ArticleText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ArticleText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.0.lines() {
            writeln!(f, "> {}", line)?;
        }
        Ok(())
    }
}

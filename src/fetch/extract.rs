use crate::NewsLink;
use itertools::Itertools;
use lazy_regex::regex;
use lazy_static::lazy_static;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

pub const MAX_CONTENT_CHARS: usize = 4000;
const MIN_TITLE_CHARS: usize = 10;
const MIN_PARAGRAPH_CHARS: usize = 20;

const E: &str = "Invalid selector";
lazy_static! {
    static ref LINK_SELECTORS: Vec<Selector> = [
        r#"a[href*="/viewfullstory/"]"#,
        r#"a[href*="/news/"]"#,
        ".news-item a",
        ".article-title a",
        ".story-link",
        "h3 a",
        "h2 a",
        ".title a",
        r#"a[href*="story"]"#,
        r#"a[href*="article"]"#,
    ]
    .iter()
    .map(|s| Selector::parse(s).expect(E))
    .collect();
    static ref CONTENT_SELECTORS: Vec<Selector> = [
        ".story-content",
        ".article-content",
        ".news-content",
        ".content-body",
        ".story-body",
        ".article-body",
        ".news-body",
        ".main-content",
        ".post-content",
        "article .content",
        "#content",
        ".text-content",
        ".story-text",
    ]
    .iter()
    .map(|s| Selector::parse(s).expect(E))
    .collect();
    static ref A: Selector = Selector::parse("a[href]").expect(E);
    static ref DIV: Selector = Selector::parse("div[class]").expect(E);
    static ref H1: Selector = Selector::parse("h1").expect(E);
    static ref P: Selector = Selector::parse("p").expect(E);
}

const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "menu", "form",
];
const CONTENT_CLASS_HINTS: &[&str] = &["content", "story", "article", "text", "body"];
const FALLBACK_HREF_HINTS: &[&str] = &["news", "story", "article", "viewfullstory"];
const UNWANTED_PHRASES: &[&str] = &[
    "Skip to main content",
    "Cookie Policy",
    "Privacy Policy",
    "Terms of Service",
    "Subscribe to newsletter",
    "Follow us on",
    "Share this article",
];

#[derive(Debug, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub headline: Option<String>,
    pub paragraphs: Vec<String>,
}

/// Article links on a listing page, resolved against `base`, in page order.
pub fn extract_links(doc: &Html, base: &Url) -> Vec<NewsLink> {
    let mut links = vec![];
    for selector in LINK_SELECTORS.iter() {
        for el in doc.select(selector) {
            if let Some(link) = to_link(el, base) {
                if link.title.chars().count() > MIN_TITLE_CHARS
                    && link.url.to_lowercase().contains("news")
                {
                    links.push(link);
                }
            }
        }
    }

    if links.is_empty() {
        for el in doc.select(&A) {
            let href = el.value().attr("href").unwrap_or_default().to_lowercase();
            if !FALLBACK_HREF_HINTS.iter().any(|h| href.contains(h)) {
                continue;
            }
            if let Some(link) = to_link(el, base) {
                if link.title.chars().count() > MIN_TITLE_CHARS {
                    links.push(link);
                }
            }
        }
    }

    links.into_iter().unique_by(|l| l.url.clone()).collect()
}

fn to_link(el: ElementRef, base: &Url) -> Option<NewsLink> {
    let href = el.value().attr("href").map(str::trim)?;
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let url = base.join(href).ok()?;
    let text = normalize_whitespace(&el.text().collect::<String>());
    let title = if text.is_empty() {
        el.value()
            .attr("title")
            .map(normalize_whitespace)
            .unwrap_or_else(|| "No title".to_string())
    } else {
        text
    };
    Some(NewsLink {
        url: url.to_string(),
        title,
    })
}

/// Headline and body paragraphs of an article page, `None` when no text is found.
pub fn extract_article(doc: &Html) -> Option<ExtractedArticle> {
    let headline = doc
        .select(&H1)
        .map(visible_text)
        .map(|t| normalize_whitespace(&t))
        .find(|t| !t.is_empty());

    let paragraphs = CONTENT_SELECTORS
        .iter()
        .find_map(|selector| doc.select(selector).next())
        .map(body_paragraphs)
        .filter(|p| !p.is_empty())
        .or_else(|| largest_content_div(doc).map(body_paragraphs))
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| {
            doc.select(&P)
                .map(visible_text)
                .map(|t| normalize_whitespace(&t))
                .filter(|t| t.chars().count() > MIN_PARAGRAPH_CHARS)
                .collect()
        });

    let paragraphs = cap_length(clean_paragraphs(paragraphs), MAX_CONTENT_CHARS);
    if paragraphs.is_empty() {
        None
    } else {
        Some(ExtractedArticle {
            headline,
            paragraphs,
        })
    }
}

fn largest_content_div(doc: &Html) -> Option<ElementRef> {
    doc.select(&DIV)
        .filter(|el| {
            let class = el.value().attr("class").unwrap_or_default().to_lowercase();
            CONTENT_CLASS_HINTS.iter().any(|h| class.contains(h))
        })
        .max_by_key(|el| visible_text(*el).trim().len())
}

fn body_paragraphs(container: ElementRef) -> Vec<String> {
    let paragraphs = container
        .select(&P)
        .map(visible_text)
        .map(|t| normalize_whitespace(&t))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>();
    if paragraphs.is_empty() {
        let text = normalize_whitespace(&visible_text(container));
        if text.is_empty() {
            vec![]
        } else {
            vec![text]
        }
    } else {
        paragraphs
    }
}

/// Text of `el`, leaving out scripts, navigation and other page chrome.
fn visible_text(el: ElementRef) -> String {
    let mut text = String::new();
    for node in el.descendants() {
        if let Some(t) = node.value().as_text() {
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .map(|e| EXCLUDED_TAGS.contains(&e.name()))
                    .unwrap_or(false)
            });
            if !hidden {
                text.push_str(t);
                text.push(' ');
            }
        }
    }
    text
}

fn normalize_whitespace(s: &str) -> String {
    regex!(r"\s+").replace_all(s.trim(), " ").into_owned()
}

fn clean_paragraphs(paragraphs: Vec<String>) -> Vec<String> {
    let mut cleaned = paragraphs
        .into_iter()
        .map(|p| {
            let mut p = p;
            for phrase in UNWANTED_PHRASES {
                p = p.replace(phrase, "");
            }
            normalize_whitespace(&p)
        })
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>();
    cleaned.dedup();
    cleaned
}

/// Keep paragraphs until `max` characters; the cut paragraph ends with `…`.
fn cap_length(paragraphs: Vec<String>, max: usize) -> Vec<String> {
    let mut total = 0;
    let mut capped = vec![];
    for p in paragraphs {
        let len = p.chars().count();
        if total + len <= max {
            total += len;
            capped.push(p);
            continue;
        }
        let remaining = max - total;
        if remaining > 0 {
            let mut cut = p.chars().take(remaining).collect::<String>();
            cut.push('…');
            capped.push(cut);
        }
        break;
    }
    capped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn base() -> Url {
        Url::parse("https://www.spa.gov.sa").unwrap()
    }

    #[test]
    fn listing_links() {
        let html = fs::read_to_string("tests/htmls/listing.html").expect("Invalid file path");
        let doc = Html::parse_document(&html);

        assert_eq!(
            extract_links(&doc, &base()),
            vec![
                NewsLink {
                    url: "https://www.spa.gov.sa/news/viewfullstory/2401".to_string(),
                    title: "Crown Prince receives phone call from French President".to_string(),
                },
                NewsLink {
                    url: "https://www.spa.gov.sa/news/2402".to_string(),
                    title: "Riyadh Region hosts international water forum".to_string(),
                },
                NewsLink {
                    url: "https://www.spa.gov.sa/news/2403".to_string(),
                    title: "Ministers discuss cooperation in energy sector".to_string(),
                },
            ]
        );
    }

    #[test]
    fn listing_fallback_to_any_news_anchor() {
        let doc = Html::parse_document(
            r#"<html><body>
                <a href="/en/article-2405">Saudi Arabia participates in summit</a>
                <a href="/en/about">About the agency website</a>
                <a href="/en/article-2406">Short</a>
            </body></html>"#,
        );
        assert_eq!(
            extract_links(&doc, &base()),
            vec![NewsLink {
                url: "https://www.spa.gov.sa/en/article-2405".to_string(),
                title: "Saudi Arabia participates in summit".to_string(),
            }]
        );
    }

    #[test]
    fn article_from_content_selector() {
        let html = fs::read_to_string("tests/htmls/article.html").expect("Invalid file path");
        let doc = Html::parse_document(&html);

        assert_eq!(
            extract_article(&doc),
            Some(ExtractedArticle {
                headline: Some("Riyadh Region hosts international water forum".to_string()),
                paragraphs: vec![
                    "Riyadh, May 1, 2024, SPA -- The Riyadh Region hosted the international water forum on Wednesday.".to_string(),
                    "The forum brings together experts from more than 40 countries.".to_string(),
                ],
            })
        );
    }

    #[test]
    fn article_from_largest_div() {
        let doc = Html::parse_document(
            r#"<html><body>
                <div class="story-wrapper"><p>Short one.</p></div>
                <div class="article-text">
                    <p>First paragraph of the article body.</p>
                    <script>var tracking = 1;</script>
                    <p>Second paragraph of the article body.</p>
                </div>
            </body></html>"#,
        );
        assert_eq!(
            extract_article(&doc),
            Some(ExtractedArticle {
                headline: None,
                paragraphs: vec![
                    "First paragraph of the article body.".to_string(),
                    "Second paragraph of the article body.".to_string(),
                ],
            })
        );
    }

    #[test]
    fn article_from_long_paragraphs() {
        let doc = Html::parse_document(
            r#"<html><body>
                <h1> The headline </h1>
                <p>Too short</p>
                <p>This paragraph is long enough to be kept.   Share this article</p>
            </body></html>"#,
        );
        assert_eq!(
            extract_article(&doc),
            Some(ExtractedArticle {
                headline: Some("The headline".to_string()),
                paragraphs: vec!["This paragraph is long enough to be kept.".to_string()],
            })
        );
    }

    #[test]
    fn empty_page_has_no_article() {
        let doc = Html::parse_document("<html><body><nav>Menu</nav></body></html>");
        assert_eq!(extract_article(&doc), None);
    }

    #[test]
    fn length_cap_marks_cut() {
        let paragraphs = vec!["abcdef".to_string(), "ghijkl".to_string(), "mnop".to_string()];
        assert_eq!(
            cap_length(paragraphs, 9),
            vec!["abcdef".to_string(), "ghi…".to_string()]
        );
        assert_eq!(cap_length(vec!["abc".to_string()], 3), vec!["abc".to_string()]);
    }
}

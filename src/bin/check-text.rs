use clap::Parser;
use news_grammar_monitor::assessment::Assessment;
use news_grammar_monitor::checker::{RuleBook, ViolationChecker};
use news_grammar_monitor::filter::{FalsePositiveFilter, FilterOutcome};
use news_grammar_monitor::review::normalize_verdict;
use news_grammar_monitor::{ArticleText, MonitorError};
use std::path::PathBuf;

/// Run the style-guide checks over a saved article, without network access.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Article text file; the first line is the headline
    text: PathBuf,

    /// Saved model reply to pass through the false-positive filter
    #[arg(long)]
    verdict: Option<PathBuf>,

    /// Rule tables in JSON instead of the built-in ones
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Echo the article text before the findings
    #[arg(long)]
    show: bool,
}

fn main() -> Result<(), MonitorError> {
    let args = Args::parse();

    let checker = ViolationChecker::new(RuleBook::load(args.rules.as_deref())?);
    let text = ArticleText::new(std::fs::read_to_string(&args.text)?);
    if args.show {
        print!("{}", text);
    }

    let model = match &args.verdict {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let outcome = FalsePositiveFilter::default().apply(&normalize_verdict(&raw));
            if outcome.is_clean() {
                println!("Model verdict: clean");
            }
            outcome
        }
        None => FilterOutcome::Clean,
    };

    let assessment = Assessment::new(checker.check(&text), &model);
    println!("Status: {}", assessment.status());
    if let Some(mistakes) = assessment.mistakes() {
        println!("{}", mistakes);
    }
    Ok(())
}

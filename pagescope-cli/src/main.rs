//! Line-oriented front end for a pagescope session.
//!
//! Reads commands from stdin while background fetches and extractions
//! report progress, so `cancel` works while a task is running.

use anyhow::{anyhow, Context, Result};
use pagescope::observability::{init_logging, LogFormat};
use pagescope::prelude::*;
use std::env;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  fetch <url> [timeout] [user agent]  fetch a page and make it current
  select <css selector>               extract from the current page
  facets <text,links,images,html>     choose what each element shows
  history                             list fetched pages, newest first
  recall [n]                          fetch the newest (or nth) history entry
  clear-history                       forget all fetched pages
  save <path>                         write the output pane to a file
  clear                               empty the output pane
  cancel                              stop running tasks
  help                                show this text
  quit                                exit";

enum Input {
    Line(Option<String>),
    Notification(Notification),
    Interrupt,
}

struct Repl {
    session: Session,
    facets: ExtractionConfig,
}

impl Repl {
    fn new(session: Session) -> Self {
        let facets = session.config().extraction;
        Self { session, facets }
    }

    /// Runs one command line. Returns false on `quit`.
    fn handle_line(&mut self, line: &str) -> bool {
        let line = line.trim();
        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "" => {}
            "fetch" => self.fetch(rest),
            "select" => self.select(rest),
            "facets" => self.set_facets(rest),
            "history" => println!("{}", self.session.history().render()),
            "recall" => self.recall(rest),
            "clear-history" => match self.session.clear_history() {
                Ok(()) => println!("History cleared."),
                Err(e) => eprintln!("{e}"),
            },
            "save" => self.save(rest),
            "clear" => {
                self.session.clear_output();
                println!("Output cleared.");
            }
            "cancel" => {
                if !self.session.has_activity() {
                    println!("Nothing is running.");
                }
                self.session.cancel_all("cancelled by user");
            }
            "help" => println!("{HELP}"),
            "quit" | "exit" => return false,
            other => eprintln!("Unknown command '{other}'. Type 'help' for a list."),
        }
        true
    }

    fn fetch(&mut self, args: &str) {
        let mut parts = args.splitn(3, char::is_whitespace);
        let url = parts.next().unwrap_or_default();
        let timeout = parts.next();
        let user_agent = parts.next().map(str::trim);

        match self.session.start_fetch(url, timeout, user_agent) {
            Ok(receipt) => {
                for warning in receipt.warnings {
                    eprintln!("Warning: {warning}");
                }
            }
            Err(e) => eprintln!("{e}"),
        }
    }

    fn select(&mut self, selector: &str) {
        if let Err(e) = self.session.start_extraction(selector, Some(self.facets)) {
            eprintln!("{e}");
        }
    }

    fn set_facets(&mut self, list: &str) {
        if list.is_empty() {
            let names: Vec<&str> = self.facets.facets().iter().map(Facet::as_str).collect();
            println!("Facets: {}", names.join(", "));
            return;
        }
        let parsed: Result<Vec<Facet>, _> = list
            .split([',', ' '])
            .filter(|name| !name.is_empty())
            .map(str::parse::<Facet>)
            .collect();
        match parsed {
            Ok(facets) => {
                self.facets = ExtractionConfig::only(&facets);
                println!("Facets set.");
            }
            Err(e) => eprintln!("{e}"),
        }
    }

    fn recall(&mut self, arg: &str) {
        let position = if arg.is_empty() {
            None
        } else {
            match arg.parse::<usize>() {
                Ok(n) => Some(n),
                Err(_) => {
                    eprintln!("'{arg}' is not a history position");
                    return;
                }
            }
        };
        match self.session.recall_url(position) {
            Some(url) => {
                println!("Fetching {url}");
                self.fetch(&url);
            }
            None => eprintln!("No such history entry."),
        }
    }

    fn save(&self, path: &str) {
        let path = if path.is_empty() { "scrape_results.txt" } else { path };
        match self.session.save_output(path) {
            Ok(()) => println!("Results saved to {path}"),
            Err(e) => eprintln!("{e}"),
        }
    }

    fn show(&self, notification: &Notification) {
        match notification {
            Notification::Progress { kind, percent } => eprintln!("[{kind}] {percent}%"),
            Notification::Notice(message) => eprintln!("Warning: {message}"),
            _ => println!("{}", self.session.output()),
        }
    }
}

fn load_config() -> Result<ScraperConfig> {
    match env::var("PAGESCOPE_CONFIG") {
        Ok(path) => ScraperConfig::from_file(&path)
            .with_context(|| format!("loading configuration from {path}")),
        Err(_) => Ok(ScraperConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let format: LogFormat = env::var("PAGESCOPE_LOG_FORMAT")
        .unwrap_or_default()
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    init_logging(format, "warn").map_err(|e| anyhow!(e))?;

    let session = Session::with_http(load_config()?)?;
    let mut repl = Repl::new(session);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    loop {
        let active = repl.session.has_activity();
        let input = tokio::select! {
            line = lines.next_line() => Input::Line(line?),
            Some(notification) = repl.session.next_notification(), if active => {
                Input::Notification(notification)
            }
            _ = tokio::signal::ctrl_c() => Input::Interrupt,
        };

        match input {
            Input::Line(Some(line)) => {
                if !repl.handle_line(&line) {
                    break;
                }
            }
            Input::Line(None) => break,
            Input::Notification(notification) => repl.show(&notification),
            Input::Interrupt => {
                if !repl.session.has_activity() {
                    break;
                }
                repl.session.cancel_all("interrupted");
            }
        }
    }

    repl.session.cancel_all("shutting down");
    let drain = async {
        while let Some(notification) = repl.session.next_notification().await {
            tracing::debug!(?notification, "Discarded during shutdown");
        }
    };
    if tokio::time::timeout(Duration::from_secs(2), drain).await.is_err() {
        tracing::warn!("Tasks still running at exit");
    }
    Ok(())
}

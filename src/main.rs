use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use return_scout::cache::{FilePolicyCache, MemoryPolicyCache, PolicyCache};
use return_scout::config::load_scout_config;
use return_scout::region::detect_region;
use return_scout::scraping::fetch::{fetch_html, parse_page_url};
use return_scout::{evaluate, AppState, Language, Outcome, StaticPage};

const USAGE: &str = "\
Usage: return-scout --url <page-url> [--html <file>] [--json] [--no-cache]

  --url <page-url>   product page URL (hostname and query are read from it)
  --html <file>      evaluate a saved page instead of fetching --url
  --json             print the outcome as JSON
  --no-cache         keep seller policies in memory only";

#[derive(Debug, Default)]
struct CliArgs {
    url: Option<String>,
    html: Option<PathBuf>,
    json: bool,
    no_cache: bool,
    help: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut out = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(a) = args.next() {
        match a.as_str() {
            "--url" => out.url = Some(args.next().ok_or("--url needs a value")?),
            "--html" => out.html = Some(args.next().ok_or("--html needs a value")?.into()),
            "--json" => out.json = true,
            "--no-cache" => out.no_cache = true,
            "-h" | "--help" => out.help = true,
            other => {
                if let Some(rest) = other.strip_prefix("--url=") {
                    out.url = Some(rest.to_string());
                } else if let Some(rest) = other.strip_prefix("--html=") {
                    out.html = Some(rest.into());
                } else {
                    return Err(format!("unknown argument: {other}"));
                }
            }
        }
    }
    Ok(out)
}

fn usage_error(msg: &str) -> ! {
    eprintln!("error: {msg}\n\n{USAGE}");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the result.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1)).unwrap_or_else(|e| usage_error(&e));
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }
    let Some(raw_url) = args.url.as_deref() else {
        usage_error("--url is required");
    };
    let page_url = parse_page_url(raw_url).unwrap_or_else(|e| usage_error(&e.to_string()));

    let config = load_scout_config();
    let http_client = reqwest::Client::builder()
        .timeout(config.resolve_http_timeout())
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()?;

    let cache: Arc<dyn PolicyCache> = match config.resolve_cache_path() {
        Some(path) if !args.no_cache => {
            info!("Seller cache at {}", path.display());
            Arc::new(FilePolicyCache::new(path, config.resolve_cache_ttl()))
        }
        _ => Arc::new(MemoryPolicyCache::new(config.resolve_cache_ttl())),
    };

    let state = AppState::new(http_client)
        .with_config(config)
        .with_cache(cache);

    let html = match &args.html {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let language = page_url
                .host_str()
                .and_then(|h| detect_region(h, &state.config))
                .map(|r| r.language)
                .unwrap_or(Language::En);
            fetch_html(&state.http_client, page_url.as_str(), language).await?
        }
    };

    let page = StaticPage::new(page_url, html);
    let outcome = evaluate(&state, &page).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        match &outcome {
            Outcome::Rendered { widget, .. } => println!("{}", widget.to_text()),
            Outcome::AlreadyPresent => println!("Return information already present."),
            Outcome::Abstained { reason } => {
                println!("No return information inferred ({reason:?}).")
            }
            Outcome::UnsupportedDomain { host } => {
                println!("Unsupported marketplace: {host}")
            }
        }
    }

    if let Outcome::UnsupportedDomain { host } = &outcome {
        warn!("{} is not a supported marketplace", host);
        std::process::exit(2);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_saved_page_args() {
        let parsed = parse_args(args(&[
            "--html",
            "page.html",
            "--url=https://www.amazon.de/dp/B1",
            "--json",
        ]))
        .unwrap();
        assert_eq!(parsed.html, Some(PathBuf::from("page.html")));
        assert_eq!(parsed.url.as_deref(), Some("https://www.amazon.de/dp/B1"));
        assert!(parsed.json);
        assert!(!parsed.no_cache);
    }

    #[test]
    fn test_missing_value_and_unknown_flag() {
        assert!(parse_args(args(&["--url"])).is_err());
        assert!(parse_args(args(&["--port", "5000"])).is_err());
    }
}

//! Command handlers.

use crate::commands::QueryArgs;
use crate::config::{CliConfig, OutputFormat};
use console::style;
use fetch_cache::{CacheStorage, RequestLike, Response};
use serde::Serialize;

/// A stored response as printed by `match`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutput {
    pub url: Option<String>,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl MatchOutput {
    pub async fn from_response(mut response: Response) -> fetch_cache::Result<Self> {
        let body = response.bytes().await?;
        Ok(Self {
            url: response.url().map(str::to_string),
            status: response.status(),
            status_text: response.status_text().to_string(),
            headers: response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

/// List cache names.
pub async fn list_caches(
    storage: &CacheStorage,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let names = storage.keys().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
        OutputFormat::Table if names.is_empty() => {
            println!("{} No caches in {}", style("i").blue(), storage.root().display());
        }
        OutputFormat::Table => {
            for name in &names {
                println!("{}", name);
            }
        }
    }
    Ok(())
}

/// Check whether a cache exists.
pub async fn has_cache(
    storage: &CacheStorage,
    name: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let exists = storage.has(name).await?;
    if exists {
        println!("{} Cache {} exists", style("✓").green(), style(name).bold());
    } else {
        println!("{} Cache {} not found", style("!").yellow(), style(name).bold());
    }
    Ok(exists)
}

/// Delete a cache.
pub async fn delete_cache(
    storage: &CacheStorage,
    name: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let deleted = storage.delete(name).await?;
    if deleted {
        println!("{} Cache {} deleted", style("✓").green(), style(name).bold());
    } else {
        println!("{} Cache {} not found", style("!").yellow(), style(name).bold());
    }
    Ok(deleted)
}

/// List the stored URLs of a cache.
pub async fn list_keys(
    storage: &CacheStorage,
    cache: &str,
    url: Option<&str>,
    query: &QueryArgs,
    format: OutputFormat,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let named = storage.open(cache).await?;
    let request: Option<RequestLike> = url.map(|u| query.request(u).into());
    let urls: Vec<String> = named
        .keys(request, query.options())
        .await?
        .into_iter()
        .map(|r| r.url().to_string())
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&urls)?),
        OutputFormat::Table if urls.is_empty() => {
            println!("{} No entries in {}", style("i").blue(), style(cache).bold());
        }
        OutputFormat::Table => {
            for url in &urls {
                println!("{}", url);
            }
        }
    }
    Ok(urls)
}

/// Look up a URL in one cache, or in every cache.
pub async fn match_url(
    storage: &CacheStorage,
    url: &str,
    cache: Option<&str>,
    query: &QueryArgs,
    format: OutputFormat,
) -> Result<Option<MatchOutput>, Box<dyn std::error::Error>> {
    let request = query.request(url);
    let found = match cache {
        Some(name) => {
            storage
                .open(name)
                .await?
                .match_request(request, query.options())
                .await?
        }
        None => storage.match_request(request, query.options()).await?,
    };

    let Some(response) = found else {
        println!("{} No match for {}", style("!").yellow(), url);
        return Ok(None);
    };

    let output = MatchOutput::from_response(response).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Table => {
            println!(
                "{} {} {}",
                style(output.status).bold(),
                output.status_text,
                style(output.url.as_deref().unwrap_or(url)).dim()
            );
            for (name, value) in &output.headers {
                println!("{}: {}", name, value);
            }
            println!();
            print!("{}", output.body);
        }
    }
    Ok(Some(output))
}

/// Fetch URLs into a cache.
pub async fn add_urls(
    storage: &CacheStorage,
    cache: &str,
    urls: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let named = storage.open(cache).await?;
    println!(
        "Fetching {} URL(s) into {}...",
        urls.len(),
        style(cache).bold()
    );

    named.add_all(urls.iter().map(String::as_str)).await?;

    println!("{} Stored {} response(s)", style("✓").green(), urls.len());
    Ok(())
}

/// Remove entries for a URL.
pub async fn remove_entry(
    storage: &CacheStorage,
    cache: &str,
    url: &str,
    query: &QueryArgs,
) -> Result<bool, Box<dyn std::error::Error>> {
    let named = storage.open(cache).await?;
    let removed = named.delete(query.request(url), query.options()).await?;

    if removed {
        println!("{} Removed {}", style("✓").green(), url);
    } else {
        println!("{} No entry for {}", style("!").yellow(), url);
    }
    Ok(removed)
}

/// Show configuration.
pub fn show_config(
    config: &CliConfig,
    storage: &CacheStorage,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Current configuration:");
    println!(
        "  cache_dir: {}",
        config
            .cache_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!("  output_format: {:?}", config.output_format);
    println!("  effective root: {}", storage.root().display());

    if let Ok(path) = CliConfig::config_path() {
        println!("\nConfig file: {}", path.display());
    }

    Ok(())
}

/// Set configuration.
pub fn set_config(key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    // A malformed file must not be silently replaced by defaults on save.
    let mut config = CliConfig::load()?;
    config.set(key, value)?;
    config.save()?;

    println!("{} Set {} = {}", style("✓").green(), key, value);
    Ok(())
}

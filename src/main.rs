// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use book_scout::llm::prompt;
use book_scout::utils::logging::{format_error, format_info, format_success};
use book_scout::{
    Config, OpenAiClient, RatingExtractor, RecommendationParser, SearchStore, Validator,
};
use clap::{ArgAction, Parser, Subcommand};
use futures::StreamExt;
use std::io::{Read, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "book_scout")]
#[command(version = "0.1.0")]
#[command(about = "Streaming book recommendations from OpenAI-compatible models", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the recommendation HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Stream recommendations for a book to the terminal
    Recommend {
        book_name: String,

        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// Infer genre tags for a book or author
    Tags { book_name: String },

    /// Parse recommendation text from a file (or stdin) into entries
    Parse {
        file: Option<PathBuf>,

        #[arg(short, long)]
        pretty: bool,
    },

    /// Show cache and search-history statistics
    Stats,

    /// Clear stored recommendations and search history
    Reset {
        #[arg(long)]
        confirm: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    book_scout::utils::logging::init_logger(cli.color, cli.verbose);

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        tracing::warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|_| Config::default_config())
    };

    match cli.command {
        Commands::Serve { host, port } => {
            cmd_serve(config, host, port).await?;
        }
        Commands::Recommend {
            book_name,
            tags,
            json,
        } => {
            cmd_recommend(&config, &book_name, tags, json).await?;
        }
        Commands::Tags { book_name } => {
            cmd_tags(&config, &book_name).await?;
        }
        Commands::Parse { file, pretty } => {
            cmd_parse(&config, file, pretty)?;
        }
        Commands::Stats => {
            cmd_stats(&config)?;
        }
        Commands::Reset { confirm } => {
            cmd_reset(&config, confirm)?;
        }
    }

    Ok(())
}

async fn cmd_serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    book_scout::server::serve(config)
        .await
        .context("Server failed")?;

    Ok(())
}

async fn cmd_recommend(
    config: &Config,
    book_name: &str,
    tags: Vec<String>,
    json: bool,
) -> Result<()> {
    let book_name =
        Validator::validate_book_name(book_name, config.limits.max_book_name_len)?;
    let tags = Validator::sanitize_tags(&tags, config.limits.max_tags, config.limits.max_tag_len);

    let api_key = config.require_api_key()?.to_string();
    let client = OpenAiClient::new(&config.openai, api_key)?;

    let sanitized = prompt::sanitize_for_prompt(&book_name);
    let user_prompt = prompt::build_recommendation_prompt(&sanitized, &tags);

    if !json {
        println!("{}", format_info(&format!("Recommendations for: {book_name}")));
    }

    let mut stream = client
        .chat_stream(
            prompt::RECOMMEND_SYSTEM_PROMPT,
            &user_prompt,
            config.openai.max_tokens,
            Some(config.openai.temperature),
        )
        .await
        .context("Failed to open recommendation stream")?;

    let mut accumulated = String::new();
    let mut stdout = std::io::stdout();

    while let Some(delta) = stream.next().await {
        let content = delta.context("Stream interrupted")?;
        if !json {
            print!("{content}");
            stdout.flush().ok();
        }
        accumulated.push_str(&content);
    }

    if !json {
        println!();
    }

    if accumulated.is_empty() {
        println!("{}", format_error("No content received from the model"));
        return Ok(());
    }

    let parser = RecommendationParser::with_tuning(&config.extraction);
    let entries = parser.parse(&accumulated);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries_with_ratings(&entries))?);
        return Ok(());
    }

    println!();
    println!(
        "{}",
        format_success(&format!("Parsed {} recommendation(s)", entries.len()))
    );
    print_entries(&entries);

    Ok(())
}

async fn cmd_tags(config: &Config, book_name: &str) -> Result<()> {
    let book_name =
        Validator::validate_book_name(book_name, config.limits.max_book_name_len)?;

    let api_key = config.require_api_key()?.to_string();
    let client = OpenAiClient::new(&config.openai, api_key)?;

    let tags_prompt = prompt::build_tags_prompt(&book_name);
    let response = client
        .chat(
            prompt::TAGS_SYSTEM_PROMPT,
            &tags_prompt,
            config.openai.tags_max_tokens,
            None,
        )
        .await
        .context("Failed to fetch tags")?;

    let tags = prompt::parse_tag_response(&response, config.limits.max_inferred_tags);

    if tags.is_empty() {
        println!("{}", format_error(&format!("No tags found for: {book_name}")));
    } else {
        println!("{}", format_success(&format!("Tags for {book_name}:")));
        for tag in tags {
            println!("  - {tag}");
        }
    }

    Ok(())
}

fn cmd_parse(config: &Config, file: Option<PathBuf>, pretty: bool) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    let parser = RecommendationParser::with_tuning(&config.extraction);
    let entries = parser.parse(&text);
    let output = entries_with_ratings(&entries);

    if pretty {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", serde_json::to_string(&output)?);
    }

    Ok(())
}

fn cmd_stats(config: &Config) -> Result<()> {
    let store = SearchStore::open(&config.storage).context("Failed to open search store")?;
    let stats = store.stats()?;

    println!("{}", format_info("Search store statistics"));
    println!("  Stored recommendations: {}", stats.total_recommendations);
    println!("  Total requests:         {}", stats.total_requests);
    println!("  Total searches:         {}", stats.total_searches);

    let popular = store.popular_searches(10)?;
    if !popular.is_empty() {
        println!();
        println!("{}", format_info("Most searched books"));
        for entry in popular {
            println!("  {:>4}  {}", entry.search_count, entry.book_name);
        }
    }

    Ok(())
}

fn cmd_reset(config: &Config, confirm: bool) -> Result<()> {
    if !confirm {
        println!(
            "{}",
            format_error("This will delete all stored data. Use --confirm to proceed")
        );
        return Ok(());
    }

    let store = SearchStore::open(&config.storage).context("Failed to open search store")?;
    store.reset()?;
    println!("{}", format_success("Search store cleared"));

    Ok(())
}

fn entries_with_ratings(entries: &[book_scout::BookEntry]) -> Vec<serde_json::Value> {
    let extractor = RatingExtractor::new();

    entries
        .iter()
        .map(|entry| {
            let ratings = extractor.extract(&entry.details, &entry.title, &entry.author);
            serde_json::json!({
                "title": entry.title,
                "author": entry.author,
                "header_text": entry.header_text,
                "details": entry.details,
                "blurb": entry.blurb,
                "ratings": ratings,
            })
        })
        .collect()
}

fn print_entries(entries: &[book_scout::BookEntry]) {
    let extractor = RatingExtractor::new();

    for entry in entries {
        println!();
        if entry.author.is_empty() {
            println!("{}", entry.display_title());
        } else {
            println!("{} by {}", entry.title, entry.author);
        }

        let ratings = extractor.extract(&entry.details, &entry.title, &entry.author);
        if let Some(goodreads) = ratings.goodreads {
            println!("  Goodreads {}  {}", goodreads.value, goodreads.search_url);
        }
        if let Some(amazon) = ratings.amazon {
            println!("  Amazon    {}  {}", amazon.value, amazon.search_url);
        }

        for detail in &entry.details {
            println!("  - {detail}");
        }

        if entry.has_blurb() {
            println!();
            for line in entry.blurb.lines() {
                println!("  {line}");
            }
        }
    }
}

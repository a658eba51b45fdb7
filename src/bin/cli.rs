//! Book Finder CLI
//!
//! Command-line client for the Book Finder API:
//! - Register, log in, and log out
//! - Browse and search the catalog
//! - Manage favorites
//! - Read and write reviews

use bookfinder::api::dto::{AuthResponse, MeResponse, MessageResponse};
use bookfinder::db::{Book, BookReviews, FavoriteBook, PublicUser, RatingSummary};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bookfinder-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find, favorite, and review books")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8800", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and start a session
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Log in and start a session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the user behind the stored session
    Whoami,

    /// Show API server status
    Status,

    /// List the full catalog
    Books,

    /// Search by keyword, author, or genre
    Search {
        /// Keyword matched against title and description
        #[arg(short, long)]
        q: Option<String>,
        #[arg(short, long)]
        author: Option<String>,
        #[arg(short, long)]
        genre: Option<String>,
    },

    /// Manage favorites
    #[command(subcommand)]
    Favorites(FavoriteCommands),

    /// Read and write reviews
    #[command(subcommand)]
    Reviews(ReviewCommands),

    /// Rating summaries for several books
    Summary {
        /// Book ids
        ids: Vec<i64>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum FavoriteCommands {
    /// List your favorites
    List,
    /// Add a book to your favorites
    Add { book_id: i64 },
    /// Remove a favorite by its favorite id
    Remove { favorite_id: i64 },
}

#[derive(Subcommand)]
pub enum ReviewCommands {
    /// Show reviews for a book
    Show { book_id: i64 },
    /// Create or replace your review of a book
    Save {
        book_id: i64,
        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: u8,
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Delete one of your reviews
    Delete { review_id: i64 },
}

/// Stored login: the token is replayed verbatim as a bearer token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Session {
    token: String,
    user: PublicUser,
}

impl Session {
    fn load(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Write the session; on unix the file is readable by its owner only
    fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        use std::io::Write;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
            options.mode(0o600);
            // mode() only applies on create
            if path.exists() {
                std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
            }
        }

        let mut file = options.open(path)?;
        file.write_all(serde_json::to_string_pretty(self)?.as_bytes())?;
        Ok(())
    }
}

fn session_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bookfinder")
        .join("session.json")
}

/// Load the stored session or exit with a hint
fn require_session(path: &Path) -> Session {
    match Session::load(path) {
        Some(session) => session,
        None => {
            eprintln!("Not logged in. Run `bookfinder-cli login` first.");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let session_file = session_path();
    let json_output = cli.format == "json";

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => {
            let response = client
                .post(format!("{}/api/auth/register", cli.api_url))
                .json(&serde_json::json!({"name": name, "email": email, "password": password}))
                .send()
                .await?;

            let auth: AuthResponse = expect_success(response, "Registration failed").await?;
            start_session(auth, &session_file)?;
        }

        Commands::Login { email, password } => {
            let response = client
                .post(format!("{}/api/auth/login", cli.api_url))
                .json(&serde_json::json!({"email": email, "password": password}))
                .send()
                .await?;

            let auth: AuthResponse = expect_success(response, "Login failed").await?;
            start_session(auth, &session_file)?;
        }

        Commands::Logout => {
            if session_file.exists() {
                std::fs::remove_file(&session_file)?;
            }
            println!("Logged out");
        }

        Commands::Whoami => {
            let session = require_session(&session_file);
            let response = client
                .get(format!("{}/api/auth/me", cli.api_url))
                .bearer_auth(&session.token)
                .send()
                .await?;

            let me: MeResponse = expect_success(response, "Session check failed").await?;
            println!("{} <{}> (id {})", me.user.name, me.user.email, me.user.id);
        }

        Commands::Status => {
            let response = client.get(format!("{}/health", cli.api_url)).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    println!("Book Finder v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!(
                        "API Status: {}",
                        health["status"].as_str().unwrap_or("unknown")
                    );
                    println!(
                        "Database:   {}",
                        health["database"].as_str().unwrap_or("unknown")
                    );
                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!("Uptime:     {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    eprintln!("API returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to Book Finder API at {}", cli.api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the API server is running:");
                    eprintln!("  cargo run --bin bookfinder");
                    std::process::exit(1);
                }
            }
        }

        Commands::Books => {
            let response = client
                .get(format!("{}/api/books", cli.api_url))
                .send()
                .await?;

            let books: Vec<Book> = expect_success(response, "Failed to fetch books").await?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&books)?);
            } else {
                print_books(&books);
            }
        }

        Commands::Search { q, author, genre } => {
            let params: Vec<(&str, String)> = [("q", q), ("author", author), ("genre", genre)]
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v)))
                .collect();

            let response = client
                .get(format!("{}/api/books/search", cli.api_url))
                .query(&params)
                .send()
                .await?;

            let books: Vec<Book> = expect_success(response, "Search failed").await?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&books)?);
            } else if books.is_empty() {
                println!("No books found.");
            } else {
                print_books(&books);
            }
        }

        Commands::Favorites(command) => {
            let session = require_session(&session_file);

            match command {
                FavoriteCommands::List => {
                    let response = client
                        .get(format!("{}/api/books/favorites", cli.api_url))
                        .bearer_auth(&session.token)
                        .send()
                        .await?;

                    let favorites: Vec<FavoriteBook> =
                        expect_success(response, "Failed to fetch favorites").await?;

                    if json_output {
                        println!("{}", serde_json::to_string_pretty(&favorites)?);
                    } else if favorites.is_empty() {
                        println!("No favorites yet.");
                        println!();
                        println!("Add one with:");
                        println!("  bookfinder-cli favorites add <book_id>");
                    } else {
                        println!("{:<6} {:<6} {:<36} {}", "Fav", "Book", "Title", "Author");
                        println!("{}", "-".repeat(70));
                        for fav in favorites {
                            println!(
                                "{:<6} {:<6} {:<36} {}",
                                fav.favorite_id,
                                fav.book.id,
                                truncate(&fav.book.title, 35),
                                fav.book.author
                            );
                        }
                    }
                }
                FavoriteCommands::Add { book_id } => {
                    let response = client
                        .post(format!("{}/api/books/favorites", cli.api_url))
                        .bearer_auth(&session.token)
                        .json(&serde_json::json!({ "book_id": book_id }))
                        .send()
                        .await?;

                    let msg: MessageResponse =
                        expect_success(response, "Failed to add favorite").await?;
                    println!("{}", msg.message);
                }
                FavoriteCommands::Remove { favorite_id } => {
                    let response = client
                        .delete(format!(
                            "{}/api/books/favorites/{}",
                            cli.api_url, favorite_id
                        ))
                        .bearer_auth(&session.token)
                        .send()
                        .await?;

                    let msg: MessageResponse =
                        expect_success(response, "Failed to remove favorite").await?;
                    println!("{}", msg.message);
                }
            }
        }

        Commands::Reviews(command) => match command {
            ReviewCommands::Show { book_id } => {
                let response = client
                    .get(format!("{}/api/books/{}/reviews", cli.api_url, book_id))
                    .send()
                    .await?;

                let data: BookReviews = expect_success(response, "Failed to load reviews").await?;

                if json_output {
                    println!("{}", serde_json::to_string_pretty(&data)?);
                } else {
                    println!("Rating: {}", format_summary(&data.summary));
                    println!();
                    for review in &data.reviews {
                        println!(
                            "[{}] {} {} ({})",
                            review.id,
                            stars(review.rating as f64),
                            review.user_name,
                            &review.updated_at[..10.min(review.updated_at.len())]
                        );
                        if let Some(comment) = &review.comment {
                            println!("    {}", comment);
                        }
                    }
                }
            }
            ReviewCommands::Save {
                book_id,
                rating,
                comment,
            } => {
                let session = require_session(&session_file);
                let response = client
                    .post(format!("{}/api/books/{}/reviews", cli.api_url, book_id))
                    .bearer_auth(&session.token)
                    .json(&serde_json::json!({ "rating": rating, "comment": comment }))
                    .send()
                    .await?;

                let msg: MessageResponse = expect_success(response, "Failed to save review").await?;
                println!("{}", msg.message);
            }
            ReviewCommands::Delete { review_id } => {
                let session = require_session(&session_file);
                let response = client
                    .delete(format!("{}/api/reviews/{}", cli.api_url, review_id))
                    .bearer_auth(&session.token)
                    .send()
                    .await?;

                let msg: MessageResponse =
                    expect_success(response, "Failed to delete review").await?;
                println!("{}", msg.message);
            }
        },

        Commands::Summary { ids } => {
            let ids_param = ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");

            let response = client
                .get(format!("{}/api/reviews/summary", cli.api_url))
                .query(&[("ids", ids_param)])
                .send()
                .await?;

            let summaries: BTreeMap<i64, RatingSummary> =
                expect_success(response, "Failed to load summaries").await?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                for id in &ids {
                    let summary = summaries.get(id).copied().unwrap_or_default();
                    println!("{:<6} {}", id, format_summary(&summary));
                }
            }
        }

        Commands::Config { output } => {
            let config = bookfinder::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Decode a successful response, or print the `{error}` body and exit
async fn expect_success<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    context: &str,
) -> Result<T, reqwest::Error> {
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|body| body["error"].as_str().map(str::to_string))
            .unwrap_or(text);
        eprintln!("{} ({}): {}", context, status, message);
        std::process::exit(1);
    }

    response.json().await
}

fn start_session(auth: AuthResponse, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session {
        token: auth.token,
        user: auth.user,
    };
    session.save(path)?;
    println!("Logged in as {} <{}>", session.user.name, session.user.email);
    Ok(())
}

fn print_books(books: &[Book]) {
    println!("{:<6} {:<36} {:<24} {}", "ID", "Title", "Author", "Genre");
    println!("{}", "-".repeat(80));

    for book in books {
        println!(
            "{:<6} {:<36} {:<24} {}",
            book.id,
            truncate(&book.title, 35),
            truncate(&book.author, 23),
            book.genre
        );
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// `round(avg)` filled stars out of five
fn stars(avg: f64) -> String {
    let filled = (avg.round().clamp(0.0, 5.0)) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

fn format_summary(summary: &RatingSummary) -> String {
    match summary.avg_rating {
        Some(avg) => format!(
            "{} {:.2} ({} review{})",
            stars(avg),
            avg,
            summary.review_count,
            if summary.review_count == 1 { "" } else { "s" }
        ),
        None => "No reviews yet".to_string(),
    }
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_stars() {
        assert_eq!(stars(0.0), "☆☆☆☆☆");
        assert_eq!(stars(3.5), "★★★★☆");
        assert_eq!(stars(4.33), "★★★★☆");
        assert_eq!(stars(5.0), "★★★★★");
    }

    #[test]
    fn test_format_summary() {
        assert_eq!(format_summary(&RatingSummary::default()), "No reviews yet");

        let summary = RatingSummary {
            avg_rating: Some(4.5),
            review_count: 2,
        };
        assert_eq!(format_summary(&summary), "★★★★★ 4.50 (2 reviews)");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Dune", 10), "Dune");
        assert_eq!(truncate("The Left Hand of Darkness", 10), "The Left …");
    }

    #[test]
    fn test_session_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        assert!(Session::load(&path).is_none());

        let session = Session {
            token: "abc.def.ghi".to_string(),
            user: PublicUser {
                id: 7,
                name: "Ann".to_string(),
                email: "ann@example.com".to_string(),
            },
        };
        session.save(&path).unwrap();
        assert_eq!(Session::load(&path), Some(session));

        std::fs::write(&path, "not json").unwrap();
        assert!(Session::load(&path).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let session = Session {
            token: "abc.def.ghi".to_string(),
            user: PublicUser {
                id: 7,
                name: "Ann".to_string(),
                email: "ann@example.com".to_string(),
            },
        };

        session.save(&path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        // A pre-existing world-readable file is tightened on save
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        session.save(&path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(Session::load(&path), Some(session));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(3700), "1h 1m");
    }
}

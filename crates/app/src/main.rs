use std::fmt;
use std::sync::Arc;

use gifts_core::Catalog;
use services::{Clock, SurveyLoopService};
use storage::repository::Storage;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod input;
mod terminal;

use terminal::{Exit, TerminalNavigator};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  gifts [survey]  [--db <sqlite_url>] [--questions <catalog.json>]");
    eprintln!("  gifts results   [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:gifts.sqlite3");
    eprintln!("  --questions <built-in catalog>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  GIFTS_DB_URL, GIFTS_QUESTIONS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Survey,
    Results,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "survey" => Some(Self::Survey),
            "results" => Some(Self::Results),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    questions: Option<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("GIFTS_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url("gifts.sqlite3".into()), normalize_sqlite_url);
        let mut questions = std::env::var("GIFTS_QUESTIONS")
            .ok()
            .filter(|path| !path.trim().is_empty());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--questions" => {
                    questions = Some(require_value(args, "--questions")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, questions })
    }
}

/// URLs that sqlx resolves itself and that need no file on disk.
fn is_sqlite_uri(url: &str) -> bool {
    url == "sqlite::memory:" || url.starts_with("sqlite:file:")
}

fn normalize_sqlite_url(raw: String) -> String {
    if is_sqlite_uri(&raw) || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn load_catalog(path: Option<&str>) -> Result<Catalog, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(Catalog::builtin());
    };
    let raw = std::fs::read_to_string(path)?;
    let catalog = Catalog::from_json(&raw)?;
    debug!(path, questions = catalog.len(), "loaded question catalog");
    Ok(catalog)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Survey,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Survey,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    info!(db = %parsed.db_url, "storage ready");

    let navigator = Arc::new(TerminalNavigator::default());
    let service = SurveyLoopService::new(Clock::system(), storage.survey, navigator.clone());
    let mut stdout = std::io::stdout();

    match cmd {
        Command::Survey => {
            let catalog = load_catalog(parsed.questions.as_deref())?;
            let mut session = service.start(catalog).await?;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());

            match terminal::run_survey(&service, &mut session, stdin, &mut stdout).await? {
                Exit::Submitted(result) if navigator.requested() => {
                    terminal::render_result(&mut stdout, &result)?;
                }
                Exit::Submitted(_) | Exit::Quit => {}
            }
            Ok(())
        }
        Command::Results => {
            match service.load_result().await? {
                Some(result) => terminal::render_result(&mut stdout, &result)?,
                None => println!("No survey has been submitted yet."),
            }
            Ok(())
        }
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if is_sqlite_uri(db_url) {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = list.iter().map(|s| (*s).to_string());
        Args::parse(&mut iter)
    }

    #[test]
    fn normalizes_relative_paths() {
        let url = normalize_sqlite_url("sqlite:data/gifts.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/gifts.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
    }

    #[test]
    fn parses_flags() {
        let parsed = args(&["--db", "sqlite::memory:", "--questions", "q.json"]).unwrap();
        assert_eq!(parsed.db_url, "sqlite::memory:");
        assert_eq!(parsed.questions.as_deref(), Some("q.json"));
    }

    #[test]
    fn rejects_bad_flags() {
        assert!(matches!(
            args(&["--db"]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
        assert!(matches!(args(&["--db", " "]), Err(ArgsError::InvalidDbUrl { .. })));
        assert!(matches!(args(&["--nope"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn subcommands() {
        assert_eq!(Command::from_arg("survey"), Some(Command::Survey));
        assert_eq!(Command::from_arg("results"), Some(Command::Results));
        assert_eq!(Command::from_arg("ui"), None);
    }

    #[test]
    fn sqlite_memory_needs_no_file() {
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
        assert!(prepare_sqlite_file("postgres://x").is_err());
    }

    #[test]
    fn shared_cache_uri_is_passed_through() {
        let url = "sqlite:file:gifts_mem?mode=memory&cache=shared";
        assert_eq!(normalize_sqlite_url(url.into()), url);

        let cwd = std::env::current_dir().unwrap();
        assert!(prepare_sqlite_file(url).is_ok());
        assert!(!cwd.join("file:gifts_mem").exists());
    }
}

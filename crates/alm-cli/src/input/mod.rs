pub mod file;
pub mod stdin;

use alm_core::repository::InMemoryRepository;
use tracing::debug;

/// Load the position book from `--book <file.json>` or piped stdin.
pub fn load_repository(
    book: Option<&str>,
) -> Result<InMemoryRepository, Box<dyn std::error::Error>> {
    let repo = if let Some(path) = book {
        InMemoryRepository::from_json_file(file::resolve_path(path)?)?
    } else if let Some(json) = stdin::read_stdin()? {
        InMemoryRepository::from_json(&json)?
    } else {
        return Err("--book <file.json> or a book piped on stdin is required".into());
    };
    let snapshot = repo.snapshot();
    debug!(
        positions = snapshot.positions.len(),
        scenarios = snapshot.scenarios.len(),
        appetite = snapshot.risk_appetite.len(),
        "book loaded"
    );
    Ok(repo)
}

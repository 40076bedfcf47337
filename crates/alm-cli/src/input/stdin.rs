use std::io::{self, Read};

/// Raw book JSON piped on stdin, e.g. `cat book.json | alm gap-analysis`.
///
/// `None` when stdin is a terminal or carries only whitespace; parsing is
/// left to the repository so that errors name the book.
pub fn read_stdin() -> Result<Option<String>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(trimmed.to_string()))
}

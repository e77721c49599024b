use std::io::{self, Write};

use console::Term;

/// Read the shared fleet password once, without echoing it. The returned
/// secret is reused read-only for every connection in the run.
pub fn read_password(prompt: &str) -> io::Result<String> {
    let term = Term::stdout();
    print!("{prompt}: ");
    io::stdout().flush()?;
    let secret = term.read_secure_line()?;
    Ok(secret)
}

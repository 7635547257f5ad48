//! Debug commands: `parse` and `lex` for inspecting the front end.

use super::read_file;

/// Parse a file and print one line per top-level statement.
pub fn parse_file(path: &str) -> i32 {
    let content = read_file(path);
    match spl_parse::parse_source(&content, path) {
        Ok(program) => {
            println!("Parse result for '{path}' ({} statements):", program.len());
            for line in &program.lines {
                println!("  {:>4}: {line}", line.loc.line);
            }
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

/// Lex a file and print the token stream.
pub fn lex_file(path: &str) -> i32 {
    let content = read_file(path);
    match spl_lexer::tokenize(&content, path) {
        Ok(tokens) => {
            println!("Tokens for '{path}' ({} tokens):", tokens.len());
            for tok in &tokens {
                println!("  {} @ line {}", tok.kind, tok.loc.line);
            }
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

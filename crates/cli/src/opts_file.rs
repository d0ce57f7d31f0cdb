// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Legacy options file tokenizer.
//!
//! Lines starting with `#` are comments. Tokens are separated by
//! whitespace; a backslash before a whitespace character makes it part of
//! the token as a literal space.

/// Split opts-file text into argument tokens.
pub fn parse(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for line in text.split_inclusive('\n') {
        if line.starts_with('#') {
            // The newline still separates tokens.
            flush(&mut current, &mut tokens);
            continue;
        }

        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' if chars.peek().is_some_and(|next| next.is_whitespace()) => {
                    chars.next();
                    current.push(' ');
                }
                c if c.is_whitespace() => flush(&mut current, &mut tokens),
                c => current.push(c),
            }
        }
    }
    flush(&mut current, &mut tokens);
    tokens
}

fn flush(current: &mut String, tokens: &mut Vec<String>) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

#[cfg(test)]
#[path = "opts_file_tests.rs"]
mod tests;

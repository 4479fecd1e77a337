//! Splitting raw directive arguments into tokens

/// Quote characters that group text containing commas
const QUOTES: [char; 2] = ['"', '\''];

/// Splits the raw text between a directive's parentheses into tokens
///
/// Commas split tokens unless they sit inside a matching pair of single or
/// double quotes. Each token is trimmed and then loses one pair of
/// surrounding quotes, if present. No escape sequences are interpreted.
/// Whitespace-only input yields no tokens.
pub fn parse_arguments(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    let mut tokens = Vec::new();
    let mut open_quote: Option<char> = None;
    let mut token_start = 0;

    for (idx, ch) in raw.char_indices() {
        match open_quote {
            Some(quote) if ch == quote => open_quote = None,
            Some(_) => {}
            None if QUOTES.contains(&ch) => {
                // A lone quote (an apostrophe, say) is literal text.
                if raw[idx + ch.len_utf8()..].contains(ch) {
                    open_quote = Some(ch);
                }
            }
            None if ch == ',' => {
                tokens.push(clean_token(&raw[token_start..idx]));
                token_start = idx + 1;
            }
            None => {}
        }
    }

    tokens.push(clean_token(&raw[token_start..]));
    tokens
}

fn clean_token(token: &str) -> String {
    strip_quotes(token.trim()).to_string()
}

/// Removes one matching pair of surrounding quotes
fn strip_quotes(token: &str) -> &str {
    for quote in QUOTES {
        if token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote) {
            return &token[1..token.len() - 1];
        }
    }
    token
}

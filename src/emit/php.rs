//! PHP literal helpers.

/// Single-quoted PHP string literal.
pub fn php_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// `['a', 'b']`.
pub fn php_list<S: AsRef<str>>(items: &[S]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| php_string(s.as_ref())).collect();
    format!("[{}]", quoted.join(", "))
}

/// Keywords org-mode treats as task states at the start of a heading
pub const TODO_KEYWORDS: [&str; 7] = ["TODO", "NEXT", "STARTED", "WAITING", "PROJECT", "DONE", "NVM"];

/// Make free text inert inside org markup.
///
/// Brackets would start links, and a `*` after a newline would start a new
/// heading, so `[`/`]` become `{`/`}` and `\n*` becomes `\n,*`.
pub fn clean_string(s: &str) -> String {
    s.replace('[', "{")
        .replace(']', "}")
        .replace("\n*", "\n,*")
}

/// Rewrite a leading task keyword as `/KEYWORD/` so the heading is not a task.
///
/// Only the first keyword followed by a space counts; the space is kept.
pub fn strip_todo_keyword(s: &str) -> String {
    for keyword in TODO_KEYWORDS {
        if let Some(rest) = s.strip_prefix(keyword) {
            if rest.starts_with(' ') {
                return format!("/{}/{}", keyword, rest);
            }
        }
    }
    s.to_string()
}

/// Escape text used as a heading title
pub fn escape_title(s: &str) -> String {
    strip_todo_keyword(&clean_string(s))
}

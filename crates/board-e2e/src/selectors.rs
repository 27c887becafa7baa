// Selector builders
//
// Accessible-name and text locators compile to the same `internal:` selector
// engines Playwright's `getByRole`/`getByText`/`filter({ hasText })` use, so
// labels are matched case-insensitively as substrings. Structural selectors
// follow the board application's markup conventions.

/// Quotes `value` for an `internal:` selector body (JSON string rules).
fn quoted(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}

/// Escapes `value` for a double-quoted CSS attribute selector.
pub fn css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\a "),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Elements whose text contains `label` (case-insensitive).
pub fn text(label: &str) -> String {
    format!("internal:text={}i", quoted(label))
}

/// Elements whose text matches the regular expression `pattern`.
pub fn text_matching(pattern: &str) -> String {
    format!("internal:text=/{}/", pattern.replace('/', "\\/"))
}

/// Chained filter keeping elements that contain `label`.
pub fn has_text(label: &str) -> String {
    format!("internal:has-text={}i", quoted(label))
}

/// Elements with ARIA `role` whose accessible name matches `name_pattern`
/// (a regular expression, case-insensitive).
pub fn role(role: &str, name_pattern: &str) -> String {
    format!(
        "internal:role={role}[name=/{}/i]",
        name_pattern.replace('/', "\\/")
    )
}

/// Elements with ARIA `role` whose accessible name contains `name` literally.
pub fn role_named(role_name: &str, name: &str) -> String {
    role(role_name, &regex::escape(name))
}

/// Element with exactly this `id`.
pub fn id(id: &str) -> String {
    format!("[id={}]", css_string(id))
}

/// Elements whose `id` starts with `prefix`.
pub fn id_prefix(prefix: &str) -> String {
    format!("[id^={}]", css_string(prefix))
}

/// Button whose inline `onclick` handler calls `verb(id)`.
pub fn inline_handler(verb: &str, id: u64) -> String {
    format!("button[onclick*={}]", css_string(&format!("{verb}({id})")))
}

/// Submit button of the form whose action contains `action`.
pub fn form_submit(action: &str) -> String {
    format!(
        "form[action*={}] button[type=\"submit\"]",
        css_string(action)
    )
}

/// Links whose `href` contains `fragment`.
pub fn link_with_href(fragment: &str) -> String {
    format!("a[href*={}]", css_string(fragment))
}

/// Form field by `id`, falling back to its `name` attribute.
pub fn field(id_or_name: &str) -> String {
    format!(
        "[id={q}], [name={q}]",
        q = css_string(id_or_name)
    )
}

/// Checkbox with the given `value` attribute.
pub fn checkbox_value(value: &str) -> String {
    format!("input[type=\"checkbox\"][value={}]", css_string(value))
}

/// Joins selector parts into a Playwright chain (`a >> b`).
pub fn chain<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .map(|p| p.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" >> ")
}

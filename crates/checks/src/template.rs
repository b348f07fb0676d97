//! Named-field message templates, e.g. `"{authority} is down ({error})"`
//!
//! `{{` and `}}` produce literal braces.

use snafu::Snafu;

use crate::issue::Attributes;

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum TemplateError {
    #[snafu(display("Unknown attribute '{name}' in template"))]
    UnknownAttribute { name: String },
    #[snafu(display("Unclosed placeholder in template"))]
    UnclosedPlaceholder,
    #[snafu(display("Unmatched '}}' in template"))]
    UnmatchedBrace,
}

pub type TemplateResult<T> = std::result::Result<T, TemplateError>;

/// Substitute every `{name}` in `template` with the matching attribute
pub fn render(template: &str, attrs: &Attributes) -> TemplateResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => return UnclosedPlaceholderSnafu.fail(),
                    }
                }
                let name = name.trim();
                let value = attrs
                    .get(name)
                    .ok_or_else(|| UnknownAttributeSnafu { name }.build())?;
                out.push_str(&value.to_string());
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return UnmatchedBraceSnafu.fail(),
            c => out.push(c),
        }
    }

    Ok(out)
}

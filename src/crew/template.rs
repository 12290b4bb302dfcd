use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("no input provided for placeholder {{{key}}}")]
    MissingInput { key: String },
    #[error("unterminated placeholder starting at byte {offset}")]
    Unterminated { offset: usize },
}

/// Replace every `{key}` in `template` with `inputs[key]`.
///
/// `{{` and `}}` produce literal braces. A stray `}` is kept as-is.
pub fn interpolate(
    template: &str,
    inputs: &BTreeMap<String, String>,
) -> Result<String, TemplateError> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    let mut consumed = 0usize;

    while let Some(idx) = rest.find(['{', '}']) {
        rendered.push_str(&rest[..idx]);
        let tail = &rest[idx..];

        if tail.starts_with("{{") {
            rendered.push('{');
            rest = &tail[2..];
            consumed += idx + 2;
            continue;
        }
        if tail.starts_with("}}") {
            rendered.push('}');
            rest = &tail[2..];
            consumed += idx + 2;
            continue;
        }
        if tail.starts_with('}') {
            rendered.push('}');
            rest = &tail[1..];
            consumed += idx + 1;
            continue;
        }

        let close = tail.find('}').ok_or(TemplateError::Unterminated {
            offset: consumed + idx,
        })?;
        let key = &tail[1..close];
        let value = inputs
            .get(key.trim())
            .ok_or_else(|| TemplateError::MissingInput {
                key: key.trim().to_string(),
            })?;
        rendered.push_str(value);

        rest = &tail[close + 1..];
        consumed += idx + close + 1;
    }

    rendered.push_str(rest);
    Ok(rendered)
}

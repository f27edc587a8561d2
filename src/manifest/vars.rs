use std::collections::BTreeMap;

use crate::foundation::error::{ClipcomposeError, ClipcomposeResult};

/// Replace every `${name}` in `text` with `vars[name]`.
///
/// `name` is one or more Unicode alphanumerics or underscores. Anything else following `$` is left
/// untouched. An unknown name is an error.
pub fn resolve_path_vars(text: &str, vars: &BTreeMap<String, String>) -> ClipcomposeResult<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("${") {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 2..];
        let name_len: usize = after
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .map(char::len_utf8)
            .sum();
        if name_len == 0 || !after[name_len..].starts_with('}') {
            out.push_str("${");
            rest = after;
            continue;
        }
        let name = &after[..name_len];
        let value = vars.get(name).ok_or_else(|| {
            ClipcomposeError::validation(format!("unknown path variable: ${{{name}}}"))
        })?;
        out.push_str(value);
        rest = &after[name_len + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/vars.rs"]
mod tests;

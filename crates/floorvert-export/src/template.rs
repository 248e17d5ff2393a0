//! `#NAME-PLACEHOLDER#` substitution shared by the script and report
//! templates.

const SUFFIX: &str = "-PLACEHOLDER#";

/// Replace every `#NAME-PLACEHOLDER#` in `template` whose `NAME` is a
/// key of `values`.
///
/// Substitution is a single left-to-right pass: inserted values are
/// never rescanned, so a value may itself contain placeholder text.
/// Unknown placeholders are left untouched.
pub(crate) fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('#') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values
            .iter()
            .find(|(name, _)| placeholder_at(tail, name))
        {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[1 + name.len() + SUFFIX.len()..];
            }
            None => {
                out.push('#');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn placeholder_at(s: &str, name: &str) -> bool {
    s.strip_prefix('#')
        .and_then(|s| s.strip_prefix(name))
        .is_some_and(|s| s.starts_with(SUFFIX))
}

/// Absolute-or-relative path text with forward slashes, which both
/// Blender and Typst accept on every platform.
#[must_use]
pub(crate) fn unix_path(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

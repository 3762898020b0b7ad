//! Shorthand increment expansion.
//!
//! Attribute values may be written as `<name>++` or `<name>+<N>`, where
//! `<name>` is the attribute's own name: "take the current value and add
//! one / add N". The engine resolves every remaining shorthand to a literal
//! after a mutating handler has run, so a committed document never carries
//! unexpanded expressions.

use crate::element::Element;

/// Resolve one shorthand expression against a current value.
///
/// Returns `None` when `value` is not a shorthand for this attribute name.
/// A current value that is absent or not an integer counts as 0, so a
/// shorthand landing on a fresh attribute resolves to its increment alone.
pub fn expand_shorthand(name: &str, value: &str, current: Option<&str>) -> Option<String> {
    let suffix = value.strip_prefix(name)?;
    let base: i64 = current.and_then(|v| v.parse().ok()).unwrap_or(0);
    // Attribute values are caller-controlled; saturate instead of wrapping.
    if suffix == "++" {
        return Some(base.saturating_add(1).to_string());
    }
    let step: i64 = suffix.strip_prefix('+')?.parse().ok()?;
    Some(base.saturating_add(step).to_string())
}

/// Resolve every remaining shorthand in the subtree.
///
/// At this point the shorthand itself occupies the attribute slot, so the
/// base is 0; merges that want old-value arithmetic expand eagerly against
/// the pre-merge value before this pass runs. Idempotent: a resolved literal
/// no longer matches the pattern.
pub fn expand_increments(element: &mut Element) {
    let expanded: Vec<(String, String)> = element
        .attributes
        .iter()
        .filter_map(|(name, value)| {
            expand_shorthand(name, value, None).map(|v| (name.clone(), v))
        })
        .collect();
    for (name, value) in expanded {
        element.set_attr(name, value);
    }
    for child in &mut element.children {
        expand_increments(child);
    }
}

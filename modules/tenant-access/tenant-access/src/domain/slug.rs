//! Slugs, machine ids and human references derived from display names.

use std::collections::HashSet;
use std::hash::BuildHasher;

/// Lower-case, `-` separated, ASCII `[a-z0-9_-]` only, no leading, trailing
/// or doubled dashes.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.trim().chars() {
        if c.is_whitespace() || c == '-' {
            pending_dash = true;
            continue;
        }
        if !(c.is_ascii_alphanumeric() || c == '_') {
            continue;
        }
        if pending_dash && !slug.is_empty() {
            slug.push('-');
        }
        pending_dash = false;
        slug.push(c.to_ascii_lowercase());
    }
    slug
}

/// Prefixes applied to a slug.
#[derive(Debug, Clone, Copy)]
pub struct Naming<'a> {
    /// `org` yields `org-acme-corp`.
    pub id_prefix: &'a str,
    /// `ORG-` yields `ORG-ACME-CORP`.
    pub reference_prefix: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifiers {
    pub id: String,
    pub reference: String,
}

/// Pick the first id/reference pair not yet taken, appending `-2`, `-3`, ...
/// to both when the plain form collides.
#[must_use]
pub fn allocate<S: BuildHasher>(
    naming: Naming<'_>,
    slug: &str,
    taken_ids: &HashSet<String, S>,
    taken_references: &HashSet<String, S>,
) -> Identifiers {
    let base_id = format!("{}-{slug}", naming.id_prefix);
    let base_reference = format!("{}{}", naming.reference_prefix, slug.to_ascii_uppercase());

    let is_free = |ids: &Identifiers| {
        !taken_ids.contains(&ids.id) && !taken_references.contains(&ids.reference)
    };

    let plain = Identifiers {
        id: base_id.clone(),
        reference: base_reference.clone(),
    };
    if is_free(&plain) {
        return plain;
    }

    let mut suffix: u64 = 2;
    loop {
        let candidate = Identifiers {
            id: format!("{base_id}-{suffix}"),
            reference: format!("{base_reference}-{suffix}"),
        };
        if is_free(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

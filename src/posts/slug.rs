/// Derives a URL-safe slug from a title: lowercase, runs of anything
/// outside `[a-z0-9]` collapse to a single hyphen, edge hyphens dropped.
/// Invoked by the create flow only; slugs are never regenerated on edit.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let mut slug = String::with_capacity(lower.len());
    let mut pending_hyphen = false;
    for c in lower.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

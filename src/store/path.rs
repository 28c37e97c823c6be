//! Resolution of `/`-delimited paths to archive keys.
//!
//! A key is a path relative to the root without leading or trailing slashes.
//! The root group has the empty key. Attribute keys end in a component that
//! starts with [`ATTR_MARKER`].

use crate::error::{Error, Result};

pub(crate) const ATTR_MARKER: char = '@';

fn check_component(component: &str, path: &str) -> Result<()> {
    if component == "." || component == ".." {
        Err(Error::InvalidArgument(format!(
            "relative component {:?} in path {:?}",
            component, path
        )))
    } else if component.starts_with(ATTR_MARKER) {
        Err(Error::InvalidArgument(format!(
            "component {:?} in path {:?} starts with reserved {:?}",
            component, path, ATTR_MARKER
        )))
    } else {
        Ok(())
    }
}

/// Resolves `path` against the group with key `base`. A leading `/` makes
/// `path` absolute; empty components are skipped.
pub(crate) fn resolve(base: &str, path: &str) -> Result<String> {
    if path.is_empty() {
        return Err(Error::InvalidArgument("empty path".to_owned()));
    }
    let mut parts: Vec<&str> = if path.starts_with('/') {
        Vec::new()
    } else {
        base.split('/').filter(|c| !c.is_empty()).collect()
    };
    for component in path.split('/').filter(|c| !c.is_empty()) {
        check_component(component, path)?;
        parts.push(component);
    }
    Ok(parts.join("/"))
}

/// Returns the key of the attribute `name` on the group with key `group`.
pub(crate) fn attr_key(group: &str, name: &str) -> Result<String> {
    if name.is_empty() || name.contains('/') {
        return Err(Error::InvalidArgument(format!(
            "invalid attribute name {:?}",
            name
        )));
    }
    if group.is_empty() {
        Ok(format!("{}{}", ATTR_MARKER, name))
    } else {
        Ok(format!("{}/{}{}", group, ATTR_MARKER, name))
    }
}

/// Splits a key into its parent key and last component.
pub(crate) fn split_last(key: &str) -> (&str, &str) {
    match key.rfind('/') {
        Some(idx) => (&key[..idx], &key[idx + 1..]),
        None => ("", key),
    }
}

/// Returns the keys of all proper ancestors of `key` except the root,
/// outermost first.
pub(crate) fn ancestors(key: &str) -> impl Iterator<Item = &str> {
    key.match_indices('/').map(move |(idx, _)| &key[..idx])
}

/// Returns `true` if the last component of `key` names an attribute.
pub(crate) fn is_attr_key(key: &str) -> bool {
    split_last(key).1.starts_with(ATTR_MARKER)
}

/// Validates the key of a member read from an archive. Only the last
/// component may carry the attribute marker.
pub(crate) fn check_member_key(key: &str) -> bool {
    let (parent, last) = split_last(key);
    let last_ok = !last.is_empty() && last != "." && last != ".." && last != "@";
    last_ok
        && (parent.is_empty()
            || parent
                .split('/')
                .all(|c| !c.is_empty() && check_component(c, key).is_ok()))
}

/// Display form of a key.
pub(crate) fn display(key: &str) -> String {
    format!("/{}", key)
}

//! Nested record construction from dotted header paths.
//!
//! A header such as `name.firstName` places its cell at `record["name"]["firstName"]`.
//!
//! Conflicts between a scalar and a container at the same path (`a` vs `a.b`) resolve in header
//! order, last segment wins: walking through a scalar replaces it with an empty mapping, and
//! assigning over a mapping replaces the mapping. [`RecordBuilder::new`] reports such conflicts
//! once per header row.

use std::collections::HashSet;

use crate::types::{RecordMap, RecordValue, StructuredRecord};

use super::coerce::coerce;

/// Path separator inside header names.
pub const PATH_SEPARATOR: char = '.';

/// A header name split into nested-key segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPath {
    segments: Vec<String>,
}

impl HeaderPath {
    /// Split a header on [`PATH_SEPARATOR`]. Always yields at least one segment.
    pub fn parse(header: &str) -> Self {
        Self {
            segments: header.split(PATH_SEPARATOR).map(str::to_owned).collect(),
        }
    }

    /// Path segments from outermost to leaf.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments; `1` for an undotted header.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

/// Builds [`StructuredRecord`]s for one header row.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    paths: Vec<HeaderPath>,
}

impl RecordBuilder {
    /// Parse the header paths once for the whole file.
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        let paths: Vec<HeaderPath> = headers.iter().map(|h| HeaderPath::parse(h.as_ref())).collect();
        for conflict in path_conflicts(&paths) {
            tracing::warn!(
                header = %conflict,
                "header is both a value and a nested prefix; later columns overwrite earlier ones"
            );
        }
        Self { paths }
    }

    /// Number of columns a data line must have.
    pub fn width(&self) -> usize {
        self.paths.len()
    }

    pub fn paths(&self) -> &[HeaderPath] {
        &self.paths
    }

    /// Build one record. Callers must pass exactly [`Self::width`] values; extra values are
    /// ignored and missing ones leave their paths unset.
    pub fn build<S: AsRef<str>>(&self, values: &[S]) -> StructuredRecord {
        let mut root = RecordMap::new();
        for (path, raw) in self.paths.iter().zip(values) {
            insert_at(&mut root, path.segments(), coerce(raw.as_ref()));
        }
        root
    }
}

/// Convert a header row plus one value row into a nested record.
///
/// Convenience wrapper around [`RecordBuilder`] for single rows.
pub fn build<S: AsRef<str>, V: AsRef<str>>(headers: &[S], values: &[V]) -> StructuredRecord {
    RecordBuilder::new(headers).build(values)
}

fn insert_at(map: &mut RecordMap, segments: &[String], value: RecordValue) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = map;
    for key in parents {
        let slot = current
            .entry(key.clone())
            .or_insert_with(|| RecordValue::Map(RecordMap::new()));
        if !matches!(slot, RecordValue::Map(_)) {
            *slot = RecordValue::Map(RecordMap::new());
        }
        let RecordValue::Map(inner) = slot else {
            return;
        };
        current = inner;
    }
    current.insert(last.clone(), value);
}

// Full paths that are also used as a strict prefix of another path.
fn path_conflicts(paths: &[HeaderPath]) -> Vec<String> {
    let full: HashSet<&[String]> = paths.iter().map(|p| p.segments()).collect();
    let mut out = Vec::new();
    for p in paths {
        let segs = p.segments();
        for end in 1..segs.len() {
            let prefix = &segs[..end];
            if full.contains(&prefix) {
                let joined = prefix.join(".");
                if !out.contains(&joined) {
                    out.push(joined);
                }
            }
        }
    }
    out
}

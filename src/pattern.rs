//! Route pattern and request path compilation.
//!
//! A pattern is `/`-separated pieces, where a piece starting with `:` names
//! one segment and a piece starting with `*` names the rest of the path.
//!
//! ```text
//! "/assets/*filepath/ignored"  →  [Literal("assets"), Wildcard("filepath")]
//! "//user/:id/"                →  [Literal("user"), Param("id")]
//! ```
//!
//! [`compile`] never fails: it re-reads stored patterns when captures are
//! bound. [`parse`] is the registration-time variant that rejects patterns
//! [`compile`] would silently trim or make ambiguous. Request paths go
//! through [`split_path`] instead, where every piece is literal text.

use std::collections::HashSet;

use thiserror::Error;

/// What a [`Segment`] matches.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SegmentKind {
    /// Exact text.
    Literal,
    /// `:name`, exactly one path segment.
    Param,
    /// `*name`, the remainder of the path.
    Wildcard,
}

/// One `/`-delimited unit of a pattern or path.
///
/// Borrows the piece from the compiled string; no allocation per segment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Segment<'a> {
    raw: &'a str,
    kind: SegmentKind,
}

impl<'a> Segment<'a> {
    fn classify(raw: &'a str) -> Self {
        let kind = match raw.as_bytes().first() {
            Some(b':') => SegmentKind::Param,
            Some(b'*') => SegmentKind::Wildcard,
            _ => SegmentKind::Literal,
        };
        Self { raw, kind }
    }

    /// The piece exactly as written, sigil included (`:id`, `*file`, `docs`).
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// The capture name for dynamic segments, the text itself for literals.
    pub fn name(&self) -> &'a str {
        match self.kind {
            SegmentKind::Literal => self.raw,
            // Both sigils are one ASCII byte.
            SegmentKind::Param | SegmentKind::Wildcard => &self.raw[1..],
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind != SegmentKind::Literal
    }
}

/// A route pattern rejected at registration.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum PatternError {
    /// `*name` must be the last segment; what follows could never match.
    #[error("segment `{segment}` follows wildcard `{wildcard}` and is unreachable")]
    AfterWildcard { wildcard: String, segment: String },

    #[error("dynamic segment `{segment}` has an empty name")]
    EmptyName { segment: String },

    #[error("parameter `{name}` is bound more than once")]
    DuplicateName { name: String },

    /// A Param and a Wildcard cannot share one trie position.
    #[error("dynamic segment `{segment}` conflicts with `{existing}` at the same position")]
    DynamicConflict { segment: String, existing: String },
}

/// Splits `raw` into segments, dropping empty pieces and everything after
/// the first wildcard.
pub fn compile(raw: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    for piece in raw.split('/').filter(|p| !p.is_empty()) {
        let segment = Segment::classify(piece);
        segments.push(segment);
        if segment.kind == SegmentKind::Wildcard {
            break;
        }
    }
    segments
}

/// Splits a request path into literal segments, dropping empty pieces.
///
/// Unlike [`compile`], a piece starting with `:` or `*` is plain text here
/// and nothing is truncated.
pub fn split_path(path: &str) -> Vec<Segment<'_>> {
    path.split('/')
        .filter(|p| !p.is_empty())
        .map(|raw| Segment { raw, kind: SegmentKind::Literal })
        .collect()
}

/// Registration-time [`compile`]: same segments, but the pattern must mean
/// exactly what it says.
pub fn parse(pattern: &str) -> Result<Vec<Segment<'_>>, PatternError> {
    let mut segments: Vec<Segment<'_>> = Vec::new();
    let mut names = HashSet::new();

    for piece in pattern.split('/').filter(|p| !p.is_empty()) {
        if let Some(last) = segments.last().filter(|s| s.kind == SegmentKind::Wildcard) {
            return Err(PatternError::AfterWildcard {
                wildcard: last.raw.to_owned(),
                segment: piece.to_owned(),
            });
        }

        let segment = Segment::classify(piece);
        if segment.is_dynamic() {
            if segment.name().is_empty() {
                return Err(PatternError::EmptyName { segment: piece.to_owned() });
            }
            if !names.insert(segment.name()) {
                return Err(PatternError::DuplicateName { name: segment.name().to_owned() });
            }
        }
        segments.push(segment);
    }

    Ok(segments)
}

/// Concatenates a group prefix and a suffix, collapsing the doubled `/`
/// at the seam.
pub(crate) fn join(prefix: &str, suffix: &str) -> String {
    match prefix.strip_suffix('/') {
        Some(head) if suffix.starts_with('/') => format!("{head}{suffix}"),
        _ => format!("{prefix}{suffix}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(raw: &str) -> Vec<(SegmentKind, &str)> {
        compile(raw).iter().map(|s| (s.kind(), s.name())).collect()
    }

    #[test]
    fn test_compile_drops_empty_pieces() {
        assert_eq!(
            kinds("//user//profile/"),
            vec![(SegmentKind::Literal, "user"), (SegmentKind::Literal, "profile")]
        );
        assert!(compile("/").is_empty());
        assert!(compile("").is_empty());
    }

    #[test]
    fn test_compile_classifies_segments() {
        assert_eq!(
            kinds("/user/:id/files/*path"),
            vec![
                (SegmentKind::Literal, "user"),
                (SegmentKind::Param, "id"),
                (SegmentKind::Literal, "files"),
                (SegmentKind::Wildcard, "path"),
            ]
        );
    }

    #[test]
    fn test_compile_stops_after_wildcard() {
        let segments = compile("/static/*file/never/:seen");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].raw(), "*file");
    }

    #[test]
    fn test_raw_keeps_sigil() {
        let segments = compile("/:id");
        assert_eq!(segments[0].raw(), ":id");
        assert_eq!(segments[0].name(), "id");
    }

    #[test]
    fn test_parse_accepts_well_formed() {
        let segments = parse("/repos/:owner/:repo/*rest").unwrap();
        assert_eq!(segments.len(), 4);
    }

    #[test]
    fn test_parse_rejects_segment_after_wildcard() {
        assert_eq!(
            parse("/a/*rest/b"),
            Err(PatternError::AfterWildcard { wildcard: "*rest".into(), segment: "b".into() })
        );
    }

    #[test]
    fn test_parse_rejects_empty_names() {
        assert_eq!(parse("/a/:"), Err(PatternError::EmptyName { segment: ":".into() }));
        assert_eq!(parse("/a/*"), Err(PatternError::EmptyName { segment: "*".into() }));
    }

    #[test]
    fn test_parse_rejects_duplicate_names() {
        assert_eq!(
            parse("/:id/x/:id"),
            Err(PatternError::DuplicateName { name: "id".into() })
        );
    }

    #[test]
    fn test_join() {
        assert_eq!(join("", "/hello"), "/hello");
        assert_eq!(join("/", "/admin"), "/admin");
        assert_eq!(join("/api", "/v1"), "/api/v1");
        assert_eq!(join("/api", "v1"), "/apiv1");
        assert_eq!(join("/api/", "v1"), "/api/v1");
    }

    #[test]
    fn test_split_path_treats_sigils_as_text() {
        let segments = split_path("//files/*all/:x//");
        let raws: Vec<_> = segments.iter().map(|s| s.raw()).collect();
        assert_eq!(raws, ["files", "*all", ":x"]);
        assert!(segments.iter().all(|s| s.kind() == SegmentKind::Literal));
        assert!(split_path("/").is_empty());
    }
}

use crate::intern::{self, Name};
use crate::Error;
use bstr::{BStr, BString, ByteSlice};
use std::cmp::Ordering;
use std::fmt;

/// A POSIX-like path over an in-memory name sequence: no `.` or `..`
/// resolution against a real file system, no OS-specific separators, no
/// drive letters. Case-sensitive throughout.
///
/// The sole relative path with a single empty name (`InternalPath::empty`)
/// and the root-only absolute path (`InternalPath::root`) are distinct:
/// the former has one name count of `1` with that name being empty, the
/// latter has a name count of `0`.
#[derive(Clone, Eq, Debug)]
pub struct InternalPath {
    absolute: bool,
    names: Vec<Name>,
}

impl InternalPath {
    /// The absolute path with zero names, i.e. a path-root.
    pub fn root() -> Self {
        InternalPath {
            absolute: true,
            names: Vec::new(),
        }
    }

    /// The unique relative path containing a single empty name.
    pub fn empty() -> Self {
        InternalPath {
            absolute: false,
            names: vec![intern::empty_name()],
        }
    }

    fn is_empty_path(&self) -> bool {
        !self.absolute && self.names.len() == 1 && self.names[0].is_empty()
    }

    /// The name sequence with the empty-path sentinel collapsed to zero names.
    fn real_names(&self) -> &[Name] {
        if self.is_empty_path() {
            &[]
        } else {
            &self.names
        }
    }

    fn from_real_names(absolute: bool, names: Vec<Name>) -> Self {
        if !absolute && names.is_empty() {
            return InternalPath::empty();
        }
        InternalPath { absolute, names }
    }

    /// Parses a single string into names, splitting on `/` and dropping
    /// empty segments (so consecutive or trailing slashes collapse). A
    /// leading `/` marks the path absolute.
    pub fn parse(bytes: &[u8]) -> Self {
        let s: &BStr = bytes.as_bstr();
        let absolute = s.starts_with(b"/");
        let names: Vec<Name> = s
            .split_str("/")
            .filter(|segment| !segment.is_empty())
            .map(intern::name)
            .collect();
        Self::from_real_names(absolute, names)
    }

    /// Joins `first` and `more`, concatenating with `/` separators before
    /// reparsing. An empty component contributes nothing but a stray
    /// separator, which is then collapsed like any other empty segment.
    pub fn join<'a>(first: &[u8], more: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let mut buf = first.to_vec();
        for part in more {
            buf.push(b'/');
            buf.extend_from_slice(part);
        }
        Self::parse(&buf)
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn name_count(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> impl ExactSizeIterator<Item = &BStr> {
        self.names.iter().map(|n| n.as_ref().as_bstr())
    }

    pub fn get_name(&self, index: usize) -> Result<Self, Error> {
        self.names
            .get(index)
            .map(|name| InternalPath {
                absolute: false,
                names: vec![name.clone()],
            })
            .ok_or_else(|| Error::IllegalArgument(format!("name index {index} out of bounds")))
    }

    pub fn subpath(&self, begin: usize, end: usize) -> Result<Self, Error> {
        if begin >= end || end > self.names.len() {
            return Err(Error::IllegalArgument(format!(
                "subpath range {begin}..{end} out of bounds for {} names",
                self.names.len()
            )));
        }
        Ok(Self::from_real_names(false, self.names[begin..end].to_vec()))
    }

    pub fn file_name(&self) -> Option<Self> {
        self.names.last().map(|name| InternalPath {
            absolute: false,
            names: vec![name.clone()],
        })
    }

    pub fn parent(&self) -> Option<Self> {
        if self.names.is_empty() {
            return None;
        }
        let remaining = &self.names[..self.names.len() - 1];
        if remaining.is_empty() && !self.absolute {
            return None;
        }
        Some(InternalPath {
            absolute: self.absolute,
            names: remaining.to_vec(),
        })
    }

    /// Removes `.` segments and cancels `..` against a preceding non-`..`
    /// name. Under an absolute path, leading `..` segments that would
    /// ascend above the root are dropped rather than kept or erroring.
    pub fn normalize(&self) -> Self {
        let mut stack: Vec<Name> = Vec::with_capacity(self.names.len());
        for name in self.real_names() {
            match name.as_ref() {
                b"." => continue,
                b".." => {
                    if matches!(stack.last(), Some(top) if top.as_ref() != b"..".as_slice()) {
                        stack.pop();
                    } else if !self.absolute {
                        stack.push(name.clone());
                    }
                    // absolute: silently drop, refusing to ascend above root.
                }
                _ => stack.push(name.clone()),
            }
        }
        Self::from_real_names(self.absolute, stack)
    }

    /// This path with `absolute` forced to `true`. The empty path (the
    /// sole relative path with an empty name) becomes the root, since an
    /// absolute path may never carry an empty name as its sole element.
    pub fn into_absolute(&self) -> Self {
        if self.absolute {
            return self.clone();
        }
        InternalPath {
            absolute: true,
            names: self.real_names().to_vec(),
        }
    }

    /// `other` if absolute; `self` if `other` is the empty path; `self`
    /// if `self` is the empty path; otherwise `self`'s names followed by
    /// `other`'s.
    pub fn resolve(&self, other: &InternalPath) -> Self {
        if other.absolute {
            return other.clone();
        }
        if other.is_empty_path() {
            return self.clone();
        }
        if self.is_empty_path() {
            return other.clone();
        }
        let mut names = self.names.clone();
        names.extend(other.names.iter().cloned());
        InternalPath {
            absolute: self.absolute,
            names,
        }
    }

    /// The suffix of `other` past `self`, provided both share root-ness and
    /// `self`'s names are a prefix of `other`'s.
    pub fn relativize(&self, other: &InternalPath) -> Result<Self, Error> {
        if self.absolute != other.absolute {
            return Err(Error::IllegalArgument(
                "relativize requires both paths to be absolute or both relative".into(),
            ));
        }
        let self_names = self.real_names();
        let other_names = other.real_names();
        if self_names == other_names {
            return Ok(InternalPath::empty());
        }
        if other_names.len() >= self_names.len() && &other_names[..self_names.len()] == self_names {
            let suffix = other_names[self_names.len()..].to_vec();
            return Ok(Self::from_real_names(false, suffix));
        }
        Err(Error::IllegalArgument(format!(
            "'{}' is not a prefix of '{}'",
            self.to_bstring(),
            other.to_bstring()
        )))
    }

    pub fn starts_with(&self, other: &InternalPath) -> bool {
        if self.absolute != other.absolute {
            return false;
        }
        let self_names = self.real_names();
        let other_names = other.real_names();
        other_names.len() <= self_names.len() && &self_names[..other_names.len()] == other_names
    }

    pub fn ends_with(&self, other: &InternalPath) -> bool {
        if other.absolute {
            return self.absolute && self.real_names() == other.real_names();
        }
        let self_names = self.real_names();
        let other_names = other.real_names();
        if other_names.len() > self_names.len() {
            return false;
        }
        let start = self_names.len() - other_names.len();
        &self_names[start..] == other_names
    }

    /// The canonical string form of just this internal path: `/` + joined
    /// names for absolute (`/` alone for a path-root), joined names for
    /// relative (`""` for the empty path).
    pub fn to_bstring(&self) -> BString {
        let mut out = BString::from(if self.absolute { "/" } else { "" });
        for (i, name) in self.real_names().iter().enumerate() {
            if i > 0 {
                out.push(b'/');
            }
            out.extend_from_slice(name);
        }
        out
    }
}

/// Serializes as the canonical string form (§3's `to_bstring`) and parses
/// back through [`InternalPath::parse`], rather than exposing the interned
/// `Name` representation, which carries no stable meaning outside this
/// process.
#[cfg(feature = "serde")]
impl serde::Serialize for InternalPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_bstring().to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for InternalPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(InternalPath::parse(s.as_bytes()))
    }
}

impl fmt::Display for InternalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_bstring())
    }
}

impl PartialEq for InternalPath {
    fn eq(&self, other: &Self) -> bool {
        self.absolute == other.absolute && self.names == other.names
    }
}

impl std::hash::Hash for InternalPath {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.absolute.hash(state);
        self.names.hash(state);
    }
}

impl PartialOrd for InternalPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InternalPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_bstring().cmp(&other.to_bstring())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_absolute_root_only() {
        let p = InternalPath::parse(b"/");
        assert!(p.is_absolute());
        assert_eq!(p.name_count(), 0);
    }

    #[test]
    fn parse_empty_is_relative_empty_path() {
        let p = InternalPath::parse(b"");
        assert!(!p.is_absolute());
        assert_eq!(p.name_count(), 1);
        assert_eq!(p.to_bstring(), "");
    }

    #[test]
    fn join_collapses_empty_segments() {
        let p = InternalPath::join(b"a", [b"".as_slice(), b"b".as_slice()]);
        assert_eq!(p.to_bstring(), "a/b");
    }

    #[test]
    fn join_leading_slash_is_absolute() {
        let p = InternalPath::join(b"/a", [b"b".as_slice()]);
        assert!(p.is_absolute());
        assert_eq!(p.to_bstring(), "/a/b");
    }

    #[test]
    fn normalize_cancels_dotdot() {
        let p = InternalPath::parse(b"a/b/../c/./d");
        assert_eq!(p.normalize().to_bstring(), "a/c/d");
    }

    #[test]
    fn normalize_never_ascends_above_absolute_root() {
        let p = InternalPath::parse(b"/../../a");
        assert_eq!(p.normalize().to_bstring(), "/a");
    }

    #[test]
    fn normalize_relative_fully_cancelling_is_empty() {
        let p = InternalPath::parse(b"a/..");
        let n = p.normalize();
        assert!(!n.is_absolute());
        assert_eq!(n.to_bstring(), "");
    }

    #[test]
    fn resolve_absolute_other_wins() {
        let a = InternalPath::parse(b"x/y");
        let b = InternalPath::parse(b"/z");
        assert_eq!(a.resolve(&b).to_bstring(), "/z");
    }

    #[test]
    fn resolve_empty_other_is_identity() {
        let a = InternalPath::parse(b"x/y");
        assert_eq!(a.resolve(&InternalPath::empty()).to_bstring(), "x/y");
    }

    #[test]
    fn resolve_relative_appends() {
        let a = InternalPath::parse(b"x");
        let b = InternalPath::parse(b"y/z");
        assert_eq!(a.resolve(&b).to_bstring(), "x/y/z");
    }

    #[test]
    fn relativize_returns_suffix() {
        let a = InternalPath::parse(b"/a/b");
        let b = InternalPath::parse(b"/a/b/c/d");
        assert_eq!(a.relativize(&b).unwrap().to_bstring(), "c/d");
    }

    #[test]
    fn relativize_equal_is_empty() {
        let a = InternalPath::parse(b"/a/b");
        assert_eq!(a.relativize(&a).unwrap().to_bstring(), "");
    }

    #[test]
    fn relativize_non_prefix_fails() {
        let a = InternalPath::parse(b"/a/b");
        let b = InternalPath::parse(b"/a/c");
        assert!(a.relativize(&b).is_err());
    }

    #[test]
    fn starts_with_false_across_absoluteness() {
        let a = InternalPath::parse(b"/a/b");
        let b = InternalPath::parse(b"a");
        assert!(!a.starts_with(&b));
    }

    #[test]
    fn ends_with_matches_suffix() {
        let a = InternalPath::parse(b"/a/b/c");
        let b = InternalPath::parse(b"b/c");
        assert!(a.ends_with(&b));
        assert!(!a.ends_with(&InternalPath::parse(b"x/c")));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trips_through_the_canonical_string() {
        let p = InternalPath::parse(b"/a/b/c");
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"/a/b/c\"");
        let back: InternalPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}

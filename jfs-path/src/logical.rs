use crate::internal::InternalPath;
use crate::revision::RevisionToken;
use crate::Error;
use bstr::BString;
use std::cmp::Ordering;
use std::fmt;

/// A path bound to a file-system handle `H`, composing an optional
/// [`RevisionToken`] root with an [`InternalPath`].
///
/// `H` is left generic so this crate stays free of any I/O or registry
/// concerns; `jfs-fs` instantiates it with a handle that compares by
/// instance identity, giving the "same file-system instance" half of the
/// equality contract described in the data model.
#[derive(Clone, Debug)]
pub struct LogicalPath<H> {
    fs: H,
    root: Option<RevisionToken>,
    internal: InternalPath,
}

impl<H> LogicalPath<H> {
    pub fn absolute(fs: H, root: RevisionToken, internal: InternalPath) -> Self {
        LogicalPath {
            fs,
            root: Some(root),
            internal: internal.into_absolute(),
        }
    }

    pub fn relative(fs: H, internal: InternalPath) -> Self {
        debug_assert!(!internal.is_absolute(), "relative LogicalPath needs a relative InternalPath");
        LogicalPath { fs, root: None, internal }
    }

    pub fn is_absolute(&self) -> bool {
        self.root.is_some()
    }

    pub fn fs(&self) -> &H {
        &self.fs
    }

    pub fn internal(&self) -> &InternalPath {
        &self.internal
    }

    pub fn root_token(&self) -> Option<&RevisionToken> {
        self.root.as_ref()
    }
}

impl<H: Clone> LogicalPath<H> {
    /// Identity if already absolute; otherwise substitutes the default ref
    /// and promotes the internal path to absolute.
    pub fn to_absolute_path(&self) -> Self {
        if self.is_absolute() {
            return self.clone();
        }
        LogicalPath {
            fs: self.fs.clone(),
            root: Some(RevisionToken::default_ref()),
            internal: self.internal.into_absolute(),
        }
    }

    /// The path-root (zero-name absolute path) if this path is absolute.
    pub fn root(&self) -> Option<Self> {
        self.root.clone().map(|token| LogicalPath {
            fs: self.fs.clone(),
            root: Some(token),
            internal: InternalPath::root(),
        })
    }

    pub fn file_name(&self) -> Option<Self> {
        self.internal.file_name().map(|internal| LogicalPath {
            fs: self.fs.clone(),
            root: None,
            internal,
        })
    }

    pub fn parent(&self) -> Option<Self> {
        self.internal.parent().map(|internal| LogicalPath {
            fs: self.fs.clone(),
            root: self.root.clone(),
            internal,
        })
    }

    pub fn get_name(&self, index: usize) -> Result<Self, Error> {
        Ok(LogicalPath {
            fs: self.fs.clone(),
            root: None,
            internal: self.internal.get_name(index)?,
        })
    }

    pub fn subpath(&self, begin: usize, end: usize) -> Result<Self, Error> {
        Ok(LogicalPath {
            fs: self.fs.clone(),
            root: None,
            internal: self.internal.subpath(begin, end)?,
        })
    }

    pub fn normalize(&self) -> Self {
        LogicalPath {
            fs: self.fs.clone(),
            root: self.root.clone(),
            internal: self.internal.normalize(),
        }
    }

    pub fn resolve(&self, other: &Self) -> Self {
        if other.is_absolute() {
            return other.clone();
        }
        LogicalPath {
            fs: self.fs.clone(),
            root: self.root.clone(),
            internal: self.internal.resolve(&other.internal),
        }
    }

    pub fn relativize(&self, other: &Self) -> Result<Self, Error> {
        Ok(LogicalPath {
            fs: self.fs.clone(),
            root: None,
            internal: self.internal.relativize(&other.internal)?,
        })
    }
}

impl<H> LogicalPath<H> {
    pub fn starts_with(&self, other: &Self) -> bool {
        self.internal.starts_with(&other.internal)
    }

    pub fn ends_with(&self, other: &Self) -> bool {
        self.internal.ends_with(&other.internal)
    }

    /// The canonical string form: for absolute paths `/root//names`
    /// (collapsing to `/root//` with no names), for relative paths the
    /// internal path's own string form.
    pub fn to_canonical_string(&self) -> BString {
        match &self.root {
            Some(token) => {
                let mut out = BString::from("/");
                out.extend_from_slice(&token.to_component_string());
                out.push(b'/');
                out.push(b'/');
                for (i, name) in self.internal.names().enumerate() {
                    if i > 0 {
                        out.push(b'/');
                    }
                    out.extend_from_slice(name);
                }
                out
            }
            None => self.internal.to_bstring(),
        }
    }
}

impl<H> fmt::Display for LogicalPath<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl<H: PartialEq> PartialEq for LogicalPath<H> {
    fn eq(&self, other: &Self) -> bool {
        self.fs == other.fs && self.to_canonical_string() == other.to_canonical_string()
    }
}

impl<H: PartialEq> Eq for LogicalPath<H> {}

impl<H: PartialEq> PartialOrd for LogicalPath<H> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<H: PartialEq> Ord for LogicalPath<H> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_canonical_string().cmp(&other.to_canonical_string())
    }
}

/// Splits a canonical absolute path string (`/root//internal`) into its
/// [`RevisionToken`] and [`InternalPath`], enforcing the single-`//` rule.
pub fn split_absolute(s: &[u8]) -> Result<(RevisionToken, InternalPath), Error> {
    if !s.starts_with(b"/") {
        return Err(Error::InvalidPath(format!(
            "absolute path '{}' must start with '/'",
            String::from_utf8_lossy(s)
        )));
    }
    let rest = &s[1..];
    let marker = find_double_slash(rest).ok_or_else(|| {
        Error::InvalidPath(format!(
            "absolute path '{}' is missing the '//' root/internal separator",
            String::from_utf8_lossy(s)
        ))
    })?;
    let root_content = &rest[..marker];
    let remainder = &rest[marker + 2..];
    if find_double_slash(remainder).is_some() {
        return Err(Error::InvalidPath(format!(
            "absolute path '{}' must contain exactly one '//' separator",
            String::from_utf8_lossy(s)
        )));
    }
    let token = RevisionToken::parse_component(root_content)?;
    let mut internal_bytes = Vec::with_capacity(remainder.len() + 1);
    internal_bytes.push(b'/');
    internal_bytes.extend_from_slice(remainder);
    Ok((token, InternalPath::parse(&internal_bytes)))
}

fn find_double_slash(bytes: &[u8]) -> Option<usize> {
    bytes.windows(2).position(|w| w == b"//")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug)]
    struct DummyFs(u32);

    fn path_root_only() -> LogicalPath<DummyFs> {
        LogicalPath::absolute(DummyFs(1), RevisionToken::default_ref(), InternalPath::root())
    }

    #[test]
    fn absolute_root_only_renders_double_slash() {
        assert_eq!(path_root_only().to_canonical_string(), "/refs/heads/main//");
    }

    #[test]
    fn absolute_with_names_renders_single_extra_slash() {
        let p = LogicalPath::absolute(
            DummyFs(1),
            RevisionToken::default_ref(),
            InternalPath::parse(b"src/lib.rs"),
        );
        assert_eq!(p.to_canonical_string(), "/refs/heads/main//src/lib.rs");
    }

    #[test]
    fn relative_empty_path_renders_empty_string() {
        let p = LogicalPath::relative(DummyFs(1), InternalPath::empty());
        assert_eq!(p.to_canonical_string(), "");
    }

    #[test]
    fn split_absolute_round_trips() {
        let s = b"/refs/heads/main//src/lib.rs";
        let (token, internal) = split_absolute(s).unwrap();
        assert_eq!(token, RevisionToken::default_ref());
        assert_eq!(internal.to_bstring(), "/src/lib.rs");
    }

    #[test]
    fn split_absolute_rejects_missing_marker() {
        assert!(split_absolute(b"/refs/heads/main/src/lib.rs").is_err());
    }

    #[test]
    fn split_absolute_rejects_double_marker() {
        assert!(split_absolute(b"/refs/heads/main//a//b").is_err());
    }

    #[test]
    fn to_absolute_path_is_idempotent() {
        let relative = LogicalPath::relative(DummyFs(1), InternalPath::parse(b"a/b"));
        let once = relative.to_absolute_path();
        let twice = once.to_absolute_path();
        assert_eq!(once, twice);
    }

    #[test]
    fn equality_requires_same_fs_instance() {
        let a = LogicalPath::relative(DummyFs(1), InternalPath::parse(b"a"));
        let b = LogicalPath::relative(DummyFs(2), InternalPath::parse(b"a"));
        assert_ne!(a, b);
    }
}

use crate::Error;
use bstr::{BStr, BString, ByteSlice};
use std::fmt;

/// The ref used to materialize a relative path into an absolute one.
pub const DEFAULT_REF: &str = "refs/heads/main";

/// Identifies the commit that roots a logical path, either directly by its
/// 40-hex id or indirectly through a `refs/...` name.
///
/// Equality is by tag and content; the type carries no cached resolution,
/// since a ref's target can change out from under a long-lived path (see
/// the path cache's observed-sha invalidation in `jfs-resolve`).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RevisionToken {
    CommitId(gix_hash::ObjectId),
    RefName(BString),
}

impl RevisionToken {
    /// The token substituted for relative paths when they're promoted to absolute.
    pub fn default_ref() -> Self {
        RevisionToken::RefName(BString::from(DEFAULT_REF))
    }

    /// Validates and wraps a bare ref name (without surrounding slashes).
    pub fn ref_name(name: &[u8]) -> Result<Self, Error> {
        let s: &BStr = name.as_bstr();
        if !s.starts_with(b"refs/") {
            return Err(Error::InvalidPath(format!(
                "ref name must start with 'refs/': {s}"
            )));
        }
        if s.len() == "refs/".len() {
            return Err(Error::InvalidPath(
                "ref name must be nonempty beyond the 'refs/' prefix".into(),
            ));
        }
        if s.contains_str("//") {
            return Err(Error::InvalidPath(format!("ref name must not contain '//': {s}")));
        }
        if s.contains(&b'\\') {
            return Err(Error::InvalidPath(format!(
                "ref name must not contain a backslash: {s}"
            )));
        }
        if s.ends_with(b"/") {
            return Err(Error::InvalidPath(format!("ref name must not end with '/': {s}")));
        }
        Ok(RevisionToken::RefName(s.to_owned()))
    }

    /// Wraps a known-valid commit id.
    pub fn commit_id(id: gix_hash::ObjectId) -> Self {
        RevisionToken::CommitId(id)
    }

    /// Parses the *content* of a root component — the bytes between its
    /// surrounding slashes, with neither slash present — as either a 40-hex
    /// commit id or a `refs/...` name.
    pub fn parse_component(content: &[u8]) -> Result<Self, Error> {
        let s: &BStr = content.as_bstr();
        if s.len() == 40 && s.iter().all(u8::is_ascii_lowercase_hex_or_digit) {
            let id = gix_hash::ObjectId::from_hex(s)
                .map_err(|err| Error::InvalidPath(format!("invalid commit id '{s}': {err}")))?;
            return Ok(RevisionToken::CommitId(id));
        }
        Self::ref_name(s)
    }

    /// Renders the root component's content without surrounding slashes,
    /// i.e. what `toString()` returns for a bare token.
    pub fn to_component_string(&self) -> BString {
        match self {
            RevisionToken::CommitId(id) => BString::from(id.to_string()),
            RevisionToken::RefName(name) => name.clone(),
        }
    }
}

impl fmt::Display for RevisionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_component_string())
    }
}

trait AsciiLowerHex {
    fn is_ascii_lowercase_hex_or_digit(&self) -> bool;
}

impl AsciiLowerHex for u8 {
    fn is_ascii_lowercase_hex_or_digit(&self) -> bool {
        matches!(self, b'0'..=b'9' | b'a'..=b'f')
    }
}

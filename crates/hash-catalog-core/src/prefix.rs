//! Lexicographic-successor construction for prefix range scans.
//!
//! Keys are ordered by unsigned byte-wise comparison, so all keys beginning
//! with `prefix` fall in the half-open range `[prefix, successor(prefix))`.
//! A single ordered range scan can then implement prefix search without any
//! per-row string comparison.

/// The smallest byte sequence strictly greater than every sequence that has
/// `prefix` as a prefix.
///
/// Scans from the last byte backward: trailing 0xff bytes are dropped, and the
/// first byte below 0xff is incremented. A prefix consisting entirely of 0xff
/// bytes has no finite successor; `None` means the range has no upper bound
/// and every key `>= prefix` qualifies.
pub fn successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut upper = prefix.to_vec();
    for i in (0..upper.len()).rev() {
        if upper[i] == u8::MAX {
            upper.pop();
        } else {
            upper[i] += 1;
            return Some(upper);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_range(prefix: &[u8], key: &[u8]) -> bool {
        match successor(prefix) {
            Some(upper) => prefix <= key && key < &upper[..],
            None => prefix <= key,
        }
    }

    #[test]
    fn increments_last_byte() {
        assert_eq!(successor(b"/a/b").as_deref(), Some(&b"/a/c"[..]));
    }

    #[test]
    fn trailing_max_bytes_are_dropped() {
        assert_eq!(successor(b"a\xff\xff").as_deref(), Some(&b"b"[..]));
        assert_eq!(successor(b"a\xfe\xff").as_deref(), Some(&b"a\xff"[..]));
    }

    #[test]
    fn all_max_bytes_have_no_successor() {
        assert_eq!(successor(b"\xff"), None);
        assert_eq!(successor(b"\xff\xff\xff"), None);
    }

    #[test]
    fn empty_prefix_matches_everything() {
        assert_eq!(successor(b""), None);
        assert!(in_range(b"", b""));
        assert!(in_range(b"", b"\xff\xff"));
    }

    #[test]
    fn range_membership_equals_prefix_match() {
        let prefixes: &[&[u8]] = &[b"", b"/a/b", b"a\xff", b"\xff", b"\xff\xff", b"zz"];
        let keys: &[&[u8]] = &[
            b"",
            b"/a/b",
            b"/a/bc",
            b"/a/b\xff\xff",
            b"/a/c",
            b"a\xff",
            b"a\xffz",
            b"b",
            b"\xff",
            b"\xff\xff",
            b"\xffz",
            b"zz/top",
        ];
        for &prefix in prefixes {
            for &key in keys {
                assert_eq!(
                    key.starts_with(prefix),
                    in_range(prefix, key),
                    "prefix {:?} key {:?}",
                    prefix,
                    key,
                );
            }
        }
    }

    #[test]
    fn list_prefix_example() {
        // the canonical case: prefix "/a/b" must capture /a/b and /a/bc
        // but not /a/c, even though /a/c is the successor itself
        assert!(in_range(b"/a/b", b"/a/b"));
        assert!(in_range(b"/a/b", b"/a/bc"));
        assert!(!in_range(b"/a/b", b"/a/c"));
    }
}

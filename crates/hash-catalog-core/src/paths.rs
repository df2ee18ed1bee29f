//! Conversion between raw filesystem paths and their printable renderings.
//!
//! Raw paths are arbitrary byte sequences and are kept as bytes everywhere they
//! act as a catalog key. The printable rendering is a one-way, display-only
//! transform: it must never be used for lookups.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, MAIN_SEPARATOR};
use std::str;

#[cfg(unix)]
use std::ffi::OsStr;
#[cfg(unix)]
use std::os::unix::ffi::OsStrExt;

/// The path separator as a single byte, used to split raw paths.
pub const SEPARATOR: u8 = MAIN_SEPARATOR as u8;

/// Windows-1252 decodings for 0x80..=0x9f, the only range where it differs
/// from ISO-8859-1: https://encoding.spec.whatwg.org/windows-1252.html
/// Positions the encoding leaves undefined decode to the replacement character.
const CP1252_SPECIAL: [char; 32] = [
    '€', '�', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', '�', 'Ž', '�',
    '�', '‘', '’', '“', '”', '•', '–', '—', '˜', '™', 'š', '›', 'œ', '�', 'ž', 'Ÿ',
];

/// Replace control characters with a visible stand-in: the control picture
/// block for C0, `␡` for DEL, and `�` for the C1 range.
fn printable_char(c: char) -> char {
    match c as u32 {
        0x00..=0x1f => char::from_u32('␀' as u32 + c as u32).unwrap(),
        0x7f => '␡',
        0x80..=0x9f => '�',
        _ => c,
    }
}

fn is_printable(s: &str) -> bool {
    s.chars().all(|c| {
        let c = c as u32;
        c > 0x1f && c != 0x7f && !(0x80..=0x9f).contains(&c)
    })
}

/// Decode one separator-free path component.
///
/// Strict UTF-8 first; if that fails the component is decoded byte by byte as
/// Windows-1252, so decoding never rejects any input. Control characters are
/// substituted either way.
fn decode_component(bytes: &[u8], out: &mut String) {
    match str::from_utf8(bytes) {
        Ok(s) if is_printable(s) => out.push_str(s),
        Ok(s) => out.extend(s.chars().map(printable_char)),
        Err(_) => {
            for &b in bytes {
                let decoded = match b {
                    0x00..=0x1f => char::from_u32('␀' as u32 + b as u32).unwrap(),
                    0x7f => '␡',
                    0x80..=0x9f => CP1252_SPECIAL[b as usize - 0x80],
                    _ => b as char,
                };
                out.push(decoded);
            }
        }
    }
}

/// Decode a raw path portion, keeping its separator structure intact.
/// Each component is decoded independently so one undecodable directory name
/// cannot affect the rest of the path.
fn decode_portion(bytes: &[u8], out: &mut String) {
    let mut first = true;
    for component in bytes.split(|&b| b == SEPARATOR) {
        if !first {
            out.push(MAIN_SEPARATOR);
        }
        first = false;
        decode_component(component, out);
    }
}

/// A file's absolute path exactly as the filesystem returned it.
///
/// This is the catalog's primary identity and ordering key; no encoding
/// transform is ever applied to it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawPath(Vec<u8>);

impl RawPath {
    pub fn new(bytes: Vec<u8>) -> Self {
        RawPath(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert back to a `Path` for filesystem calls.
    ///
    /// Always succeeds on unix. On other platforms only UTF-8 paths round-trip.
    #[cfg(unix)]
    pub fn to_path(&self) -> Option<&Path> {
        Some(Path::new(OsStr::from_bytes(&self.0)))
    }

    #[cfg(not(unix))]
    pub fn to_path(&self) -> Option<&Path> {
        str::from_utf8(&self.0).ok().map(Path::new)
    }

    #[cfg(unix)]
    pub fn from_os_str(path: &std::ffi::OsStr) -> Option<Self> {
        Some(RawPath(path.as_bytes().to_vec()))
    }

    #[cfg(not(unix))]
    pub fn from_os_str(path: &std::ffi::OsStr) -> Option<Self> {
        path.to_str().map(|s| RawPath(s.as_bytes().to_vec()))
    }

    /// Decode into the printable directory/name split.
    ///
    /// The split happens at the final separator byte: everything up to and
    /// including it becomes the directory part, the remainder the name. A path
    /// without any separator yields an empty directory and the whole decoding
    /// as the name.
    pub fn printable(&self) -> PrintablePath {
        match self.0.iter().rposition(|&b| b == SEPARATOR) {
            Some(pos) => {
                let mut dir = String::with_capacity(pos + 1);
                decode_portion(&self.0[..=pos], &mut dir);
                let mut name = String::with_capacity(self.0.len() - pos);
                decode_component(&self.0[pos + 1..], &mut name);
                PrintablePath { dir, name }
            }
            None => {
                let mut name = String::with_capacity(self.0.len());
                decode_component(&self.0, &mut name);
                PrintablePath {
                    dir: String::new(),
                    name,
                }
            }
        }
    }
}

impl From<Vec<u8>> for RawPath {
    fn from(bytes: Vec<u8>) -> RawPath {
        RawPath(bytes)
    }
}

/// The lossy, display-only rendering of a [`RawPath`], split into the
/// directory part (which keeps its trailing separator) and the file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrintablePath {
    pub dir: String,
    pub name: String,
}

impl PrintablePath {
    /// The full rendering, recomputed from the two stored parts.
    pub fn full(&self) -> String {
        let mut full = String::with_capacity(self.dir.len() + self.name.len());
        full.push_str(&self.dir);
        full.push_str(&self.name);
        full
    }
}

impl Display for PrintablePath {
    fn fmt(&self, fmtr: &mut Formatter) -> fmt::Result {
        fmtr.write_str(&self.dir)?;
        fmtr.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printable(bytes: &[u8]) -> PrintablePath {
        RawPath::new(bytes.to_vec()).printable()
    }

    #[test]
    fn ascii_path_splits_at_last_separator() {
        let p = printable(b"/home/user/notes.txt");
        assert_eq!(p.dir, "/home/user/");
        assert_eq!(p.name, "notes.txt");
        assert_eq!(p.full(), "/home/user/notes.txt");
    }

    #[test]
    fn path_without_separator_is_all_name() {
        let p = printable(b"lonely");
        assert_eq!(p.dir, "");
        assert_eq!(p.name, "lonely");
    }

    #[test]
    fn directory_itself_has_empty_name() {
        let p = printable(b"/home/user/");
        assert_eq!(p.dir, "/home/user/");
        assert_eq!(p.name, "");
    }

    #[test]
    fn valid_utf8_is_kept() {
        let p = printable("/tmp/smörgåsbord/日本語.txt".as_bytes());
        assert_eq!(p.dir, "/tmp/smörgåsbord/");
        assert_eq!(p.name, "日本語.txt");
    }

    #[test]
    fn invalid_utf8_falls_back_to_cp1252() {
        // 0xe9 alone is invalid UTF-8 but is 'é' in Windows-1252
        let p = printable(b"/tmp/caf\xe9.txt");
        assert_eq!(p.name, "café.txt");
        // 0x80 is '€' in Windows-1252
        let p = printable(b"/tmp/\x80price");
        assert_eq!(p.name, "€price");
    }

    #[test]
    fn one_bad_component_does_not_affect_the_rest() {
        let p = printable(b"/a\xff/caf\xc3\xa9.txt");
        assert_eq!(p.dir, "/aÿ/");
        assert_eq!(p.name, "café.txt");
    }

    #[test]
    fn control_characters_become_pictures() {
        let p = printable(b"/tmp/a\nb\tc\x00d\x7fe");
        assert_eq!(p.name, "a␊b␉c␀d␡e");
    }

    #[test]
    fn c1_controls_are_replaced_in_valid_utf8() {
        // U+0085 NEL encoded as UTF-8
        let p = printable(b"/tmp/a\xc2\x85b");
        assert_eq!(p.name, "a�b");
    }

    #[test]
    fn decoding_is_total() {
        // every single-byte name decodes to exactly one character
        for b in 0u8..=255 {
            if b == SEPARATOR {
                continue;
            }
            let p = printable(&[b'/', b'd', b'/', b]);
            assert_eq!(p.dir, "/d/");
            assert_eq!(p.name.chars().count(), 1, "byte {:#04x}", b);
        }
    }

    #[test]
    fn split_rendering_matches_whole_rendering() {
        // printable_dir + printable_name must equal decoding the whole path
        // in one pass, for ASCII, multi-byte UTF-8, and invalid sequences
        let cases: &[&[u8]] = &[
            b"/plain/ascii/file.txt",
            "/utf8/ø/æ.txt".as_bytes(),
            b"/bad\xff/worse\xfe.bin",
            b"no_separator_at_all",
            b"/",
            b"/trailing/",
        ];
        for &raw in cases {
            let split = printable(raw).full();
            let mut whole = String::new();
            decode_portion(raw, &mut whole);
            assert_eq!(split, whole, "raw: {:?}", raw);
        }
    }
}

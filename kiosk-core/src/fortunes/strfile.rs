//! Reader and index builder for strfile databases.
//!
//! A database is a pair of files: the content file, holding entries separated
//! by a line containing only the delimiter, and `<content>.dat`, the index.
//! The index starts with a 24-byte header (five big-endian u32 fields, the
//! delimiter byte, three bytes of padding) followed by `numstr + 1`
//! big-endian u32 byte offsets into the content file.

use super::{FortuneSource, StoreError};
use bytes::{Buf, BufMut};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Content lines are ROT13 encoded.
pub const STR_ROTATED: u32 = 0x4;

const STRFILE_VERSION: u32 = 2;

/// Decoded index header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrfileHeader {
    pub version: u32,
    pub numstr: u32,
    pub longlen: u32,
    pub shortlen: u32,
    pub flags: u32,
    pub delim: u8,
}

impl StrfileHeader {
    pub const LEN: usize = 24;

    pub fn parse(mut buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::LEN {
            return None;
        }
        Some(Self {
            version: buf.get_u32(),
            numstr: buf.get_u32(),
            longlen: buf.get_u32(),
            shortlen: buf.get_u32(),
            flags: buf.get_u32(),
            delim: buf.get_u8(),
        })
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.put_u32(self.version);
        out.put_u32(self.numstr);
        out.put_u32(self.longlen);
        out.put_u32(self.shortlen);
        out.put_u32(self.flags);
        out.put_u8(self.delim);
        out.put_bytes(0, 3);
    }

    pub fn is_rotated(&self) -> bool {
        self.flags & STR_ROTATED != 0
    }

    /// Byte length of a well-formed index with this header.
    fn index_len(&self) -> u64 {
        Self::LEN as u64 + 4 * (u64::from(self.numstr) + 1)
    }
}

/// An open strfile database.
pub struct Strfile<R = File> {
    name: String,
    header: StrfileHeader,
    data: BufReader<R>,
    index: R,
}

impl Strfile<File> {
    /// Open `path` and its `path.dat` index.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let open = |path: &Path| {
            File::open(path).map_err(|source| StoreError::Open {
                path: path.to_path_buf(),
                source,
            })
        };
        let data = open(path)?;
        let index = open(&index_path(path))?;
        Self::from_readers(name, data, index)
    }
}

impl<R: Read + Seek> Strfile<R> {
    /// Build a database from already-open content and index streams.
    ///
    /// Fails if the index header is truncated or the offset table is shorter
    /// than the header claims.
    pub fn from_readers(name: impl Into<String>, data: R, mut index: R) -> Result<Self, StoreError> {
        let name = name.into();
        let malformed = |reason: String| StoreError::MalformedIndex {
            name: name.clone(),
            reason,
        };

        let mut raw = [0u8; StrfileHeader::LEN];
        index.seek(SeekFrom::Start(0))?;
        index
            .read_exact(&mut raw)
            .map_err(|e| malformed(format!("truncated header: {e}")))?;
        let header = StrfileHeader::parse(&raw)
            .ok_or_else(|| malformed("truncated header".to_string()))?;

        let index_len = index.seek(SeekFrom::End(0))?;
        if index_len < header.index_len() {
            return Err(malformed(format!(
                "offset table holds {} bytes, header claims {} entries",
                index_len.saturating_sub(StrfileHeader::LEN as u64),
                header.numstr
            )));
        }

        Ok(Self {
            name,
            header,
            data: BufReader::new(data),
            index,
        })
    }

    pub fn header(&self) -> &StrfileHeader {
        &self.header
    }

    fn offset(&mut self, ordinal: u32) -> Result<u64, StoreError> {
        let record = StrfileHeader::LEN as u64 + 4 * u64::from(ordinal);
        self.index.seek(SeekFrom::Start(record))?;
        let mut raw = [0u8; 4];
        self.index.read_exact(&mut raw)?;
        Ok(u64::from(u32::from_be_bytes(raw)))
    }

    fn is_delimiter(&self, line: &str) -> bool {
        line.trim().as_bytes() == [self.header.delim]
    }
}

impl<R: Read + Seek + Send> FortuneSource for Strfile<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn entry_count(&self) -> u32 {
        self.header.numstr
    }

    fn read(&mut self, ordinal: u32) -> Result<Vec<String>, StoreError> {
        if ordinal >= self.header.numstr {
            return Err(StoreError::EntryOutOfRange {
                name: self.name.clone(),
                ordinal,
                count: self.header.numstr,
            });
        }

        let offset = self.offset(ordinal)?;
        self.data.seek(SeekFrom::Start(offset))?;

        let mut lines = Vec::new();
        let mut raw = Vec::new();
        loop {
            raw.clear();
            if self.data.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            let mut line = String::from_utf8_lossy(&raw).into_owned();
            if self.header.is_rotated() {
                line = rot13(&line);
            }
            if self.is_delimiter(&line) {
                break;
            }
            let content_len = line.trim_end_matches(['\n', '\r']).len();
            line.truncate(content_len);
            lines.push(line);
        }
        Ok(lines)
    }
}

/// Path of the index belonging to the content file at `path`.
pub fn index_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".dat");
    PathBuf::from(name)
}

/// Build the index for a content file.
///
/// Entries are the runs of lines between delimiter lines; a trailing entry
/// without a closing delimiter is kept. `flags` is stored as-is, so content
/// that is already ROT13 encoded should pass [`STR_ROTATED`].
pub fn build_index(content: &[u8], delim: u8, flags: u32) -> Vec<u8> {
    let mut offsets: Vec<u32> = vec![0];
    let mut position = 0usize;
    for line in content.split_inclusive(|byte| *byte == b'\n') {
        position += line.len();
        if line.trim_ascii() == [delim] {
            offsets.push(position as u32);
        }
    }
    if offsets.last().copied() != Some(content.len() as u32) {
        offsets.push(content.len() as u32);
    }

    // Lengths include the delimiter line, as in the classic tool.
    let lengths = offsets.windows(2).map(|pair| pair[1] - pair[0]);
    let header = StrfileHeader {
        version: STRFILE_VERSION,
        numstr: (offsets.len() - 1) as u32,
        longlen: lengths.clone().max().unwrap_or(0),
        shortlen: lengths.min().unwrap_or(0),
        flags,
        delim,
    };

    let mut out = Vec::with_capacity(StrfileHeader::LEN + 4 * offsets.len());
    header.encode(&mut out);
    for offset in offsets {
        out.put_u32(offset);
    }
    out
}

/// ROT13, leaving everything but ASCII letters untouched.
pub fn rot13(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'a'..='z' => (((c as u8 - b'a') + 13) % 26 + b'a') as char,
            'A'..='Z' => (((c as u8 - b'A') + 13) % 26 + b'A') as char,
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const CONTENT: &str = "\
You will be hungry again in one hour.
%
A closed mouth gathers no feet.
%
The early bird gets the worm,
but the second mouse gets the cheese.
%
";

    fn database(content: &str, flags: u32) -> Strfile<Cursor<Vec<u8>>> {
        let index = build_index(content.as_bytes(), b'%', flags);
        Strfile::from_readers(
            "test",
            Cursor::new(content.as_bytes().to_vec()),
            Cursor::new(index),
        )
        .unwrap()
    }

    #[test]
    fn test_header_layout() {
        let index = build_index(CONTENT.as_bytes(), b'%', 0);
        assert_eq!(index.len(), StrfileHeader::LEN + 4 * 4);
        // Big-endian entry count at byte 4, delimiter at byte 20.
        assert_eq!(&index[4..8], &[0, 0, 0, 3]);
        assert_eq!(index[20], b'%');
        assert_eq!(&index[21..24], &[0, 0, 0]);

        let header = StrfileHeader::parse(&index).unwrap();
        assert_eq!(header.numstr, 3);
        assert_eq!(header.version, STRFILE_VERSION);
        assert!(header.shortlen <= header.longlen);
        assert!(!header.is_rotated());
    }

    #[test]
    fn test_read_entries() {
        let mut db = database(CONTENT, 0);
        assert_eq!(db.entry_count(), 3);
        assert_eq!(db.read(0).unwrap(), vec!["You will be hungry again in one hour."]);
        assert_eq!(db.read(1).unwrap(), vec!["A closed mouth gathers no feet."]);
        assert_eq!(
            db.read(2).unwrap(),
            vec![
                "The early bird gets the worm,",
                "but the second mouse gets the cheese."
            ]
        );
        // Random access in any order.
        assert_eq!(db.read(0).unwrap().len(), 1);
    }

    #[test]
    fn test_read_out_of_range() {
        let mut db = database(CONTENT, 0);
        assert!(matches!(
            db.read(3),
            Err(StoreError::EntryOutOfRange { ordinal: 3, count: 3, .. })
        ));
    }

    #[test]
    fn test_last_entry_without_delimiter() {
        let mut db = database("first\n%\nsecond\nline", 0);
        assert_eq!(db.entry_count(), 2);
        assert_eq!(db.read(1).unwrap(), vec!["second", "line"]);
    }

    #[test]
    fn test_rotated_content_is_decoded() {
        let rotated = rot13(CONTENT);
        let mut db = database(&rotated, STR_ROTATED);
        assert!(db.header().is_rotated());
        assert_eq!(db.read(1).unwrap(), vec!["A closed mouth gathers no feet."]);
    }

    #[test]
    fn test_rot13_round_trip() {
        assert_eq!(rot13("Hello, World!"), "Uryyb, Jbeyq!");
        assert_eq!(rot13(&rot13("<tab>\tPunctuation 123")), "<tab>\tPunctuation 123");
    }

    #[test]
    fn test_truncated_index_is_rejected() {
        let mut index = build_index(CONTENT.as_bytes(), b'%', 0);
        index.truncate(index.len() - 4);
        let result = Strfile::from_readers(
            "broken",
            Cursor::new(CONTENT.as_bytes().to_vec()),
            Cursor::new(index),
        );
        assert!(matches!(result, Err(StoreError::MalformedIndex { .. })));

        let result = Strfile::from_readers(
            "empty",
            Cursor::new(Vec::new()),
            Cursor::new(vec![0u8; 10]),
        );
        assert!(matches!(result, Err(StoreError::MalformedIndex { .. })));
    }

    #[test]
    fn test_index_path() {
        assert_eq!(
            index_path(Path::new("/usr/share/games/fortunes/tao")),
            PathBuf::from("/usr/share/games/fortunes/tao.dat")
        );
    }
}

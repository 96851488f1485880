//! Line source: the input bytes, split into lines in file order.

use crate::error::{Result, StatsError};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Raw input for the parser
///
/// Files are memory-mapped so the parser walks the page cache directly and
/// no read buffer has to be held alongside the queue.
#[derive(Debug)]
pub enum LineSource {
    Mapped(Mmap),
    Buffer(Vec<u8>),
    Empty,
}

impl LineSource {
    /// Open and map a file
    ///
    /// Zero-length files are not mapped at all.
    pub fn open(path: &Path) -> Result<Self> {
        let unavailable = |source| StatsError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(unavailable)?;
        let len = file.metadata().map_err(unavailable)?.len();
        if len == 0 {
            return Ok(LineSource::Empty);
        }
        // The mapping is read-only; the input is not expected to be
        // truncated by another process while a run is in progress.
        let mmap = unsafe { Mmap::map(&file) }.map_err(unavailable)?;
        Ok(LineSource::Mapped(mmap))
    }

    /// Source over in-memory bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        LineSource::Buffer(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            LineSource::Mapped(mmap) => &mmap[..],
            LineSource::Buffer(buf) => buf.as_slice(),
            LineSource::Empty => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    pub fn lines(&self) -> Lines<'_> {
        Lines::new(self.as_bytes())
    }
}

/// Iterator over `\n`-terminated lines; the final line may be unterminated
pub struct Lines<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Lines<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a [u8];

    #[inline]
    fn next(&mut self) -> Option<&'a [u8]> {
        if self.offset >= self.data.len() {
            return None;
        }
        let start = self.offset;
        let rest = &self.data[start..];
        match rest.iter().position(|&b| b == b'\n') {
            Some(linefeed) => {
                self.offset = start + linefeed + 1;
                Some(&rest[..linefeed])
            }
            None => {
                self.offset = self.data.len();
                Some(rest)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_lines_in_order() {
        let source = LineSource::from_bytes("a;1\nb;2\nc;3\n");
        let lines = source.lines().collect::<Vec<_>>();
        assert_eq!(lines, vec![&b"a;1"[..], &b"b;2"[..], &b"c;3"[..]]);
    }

    #[test]
    fn test_unterminated_last_line() {
        let source = LineSource::from_bytes("a;1\nb;2");
        assert_eq!(source.lines().last(), Some(&b"b;2"[..]));
        assert_eq!(source.lines().count(), 2);
    }

    #[test]
    fn test_blank_lines_are_yielded() {
        let source = LineSource::from_bytes("\n\na;1\n");
        assert_eq!(source.lines().count(), 3);
    }

    #[test]
    fn test_empty_buffer_has_no_lines() {
        assert_eq!(LineSource::from_bytes("").lines().count(), 0);
    }

    #[test]
    fn test_open_maps_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Tokyo;35.6\nDelhi;28.6\n").unwrap();
        file.flush().unwrap();

        let source = LineSource::open(file.path()).unwrap();
        assert!(matches!(source, LineSource::Mapped(_)));
        assert_eq!(source.lines().count(), 2);
    }

    #[test]
    fn test_open_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = LineSource::open(file.path()).unwrap();
        assert!(source.is_empty());
        assert_eq!(source.lines().count(), 0);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LineSource::open(&dir.path().join("missing.txt"))
            .err()
            .unwrap();
        assert!(matches!(err, StatsError::SourceUnavailable { .. }));
    }
}

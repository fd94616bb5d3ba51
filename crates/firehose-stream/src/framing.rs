//! Record framing for the decoded byte stream
//!
//! TCP and HTTP chunk boundaries do not line up with record boundaries, so
//! the framer buffers partial lines across writes and hands back only
//! complete, terminator-bounded lines.

/// Two-byte record terminator used by the feed
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Re-segments arbitrary byte chunks into `\r\n`-terminated lines.
///
/// Whatever is left in the buffer when the stream ends is discarded, never
/// flushed. That matches the feed's historical shutdown behavior and keeps
/// downstream consumers from ever seeing a truncated record.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Framer with a pre-sized buffer, for callers that know the feed's
    /// chunk size.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Feed a decoded chunk and extract any completed lines.
    ///
    /// Returned lines do not include the terminator.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        // Resume the terminator search just before the buffered tail, in
        // case a terminator straddles the chunk boundary.
        let mut search_from = self.buffer.len().saturating_sub(LINE_TERMINATOR.len() - 1);
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(rel) = find_terminator(&self.buffer[search_from..]) {
            let pos = search_from + rel;
            lines.push(self.buffer[..pos].to_vec());
            self.buffer.drain(..pos + LINE_TERMINATOR.len());
            search_from = 0;
        }

        lines
    }

    /// Number of bytes buffered without a terminator
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn find_terminator(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(LINE_TERMINATOR.len())
        .position(|window| window == LINE_TERMINATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reassembles_lines_across_chunks() {
        let mut framer = LineFramer::new();

        let lines = framer.feed(b"{\"a\":1}\r\n{\"b\":2");
        assert_eq!(lines, vec![b"{\"a\":1}".to_vec()]);

        let lines = framer.feed(b"}\r\n");
        assert_eq!(lines, vec![b"{\"b\":2}".to_vec()]);
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_multiple_lines_in_one_chunk() {
        let mut framer = LineFramer::new();
        let lines = framer.feed(b"one\r\ntwo\r\nthree\r\n");
        assert_eq!(
            lines,
            vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]
        );
    }

    #[test]
    fn test_terminator_split_across_chunks() {
        let mut framer = LineFramer::new();
        assert!(framer.feed(b"split\r").is_empty());
        assert_eq!(framer.feed(b"\nrest"), vec![b"split".to_vec()]);
        assert_eq!(framer.pending(), 4);
    }

    #[test]
    fn test_empty_line() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.feed(b"\r\n"), vec![Vec::<u8>::new()]);
    }

    #[test]
    fn test_partial_line_is_dropped_at_shutdown() {
        // Known data-loss edge: a trailing fragment with no terminator is
        // discarded when the framer goes away, not flushed.
        let mut framer = LineFramer::new();
        assert!(framer.feed(b"{\"unterminated\":true").is_empty());
        assert_eq!(framer.pending(), 20);
        drop(framer);
    }
}

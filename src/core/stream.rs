/// Reassembles complete text lines from a chunked byte stream.
///
/// The transport may deliver a multi-line burst, a fragment of one line, or
/// an empty chunk; any trailing unterminated fragment is carried over to the
/// next `push` call.
pub struct LineFrameDecoder {
    residual: Vec<u8>,
}

impl LineFrameDecoder {
    pub fn new() -> Self {
        LineFrameDecoder {
            residual: Vec::new(),
        }
    }

    /// Feed one chunk, returning every complete non-blank line it unlocked.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.residual.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(newline_index) = self.residual.iter().position(|byte| *byte == b'\n') {
            let mut line: Vec<u8> = self.residual.drain(..=newline_index).collect();
            line.pop(); // the b'\n' itself
            if matches!(line.last(), Some(b'\r')) {
                line.pop();
            }

            let text = String::from_utf8_lossy(&line);
            if !text.trim().is_empty() {
                lines.push(text.into_owned());
            }
        }
        lines
    }

    /// Consume the decoder at end-of-stream. An unterminated trailing
    /// fragment cannot be distinguished from a mid-transmission cut, so it
    /// is dropped rather than emitted.
    pub fn finish(self) {
        if !self.residual.is_empty() && !String::from_utf8_lossy(&self.residual).trim().is_empty() {
            tracing::debug!(
                bytes = self.residual.len(),
                "dropping truncated trailing fragment at end of stream"
            );
        }
    }
}

impl Default for LineFrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_lines(chunks: &[&[u8]]) -> Vec<String> {
        let mut decoder = LineFrameDecoder::new();
        let mut lines = Vec::new();
        for chunk in chunks {
            lines.extend(decoder.push(chunk));
        }
        decoder.finish();
        lines
    }

    #[test]
    fn test_split_invariance() {
        let payload = b"{\"phase\":\"planning\"}\n{\"phase\":\"coding\"}\n{\"phase\":\"complete\"}\n";

        let whole = collect_lines(&[payload]);
        assert_eq!(whole.len(), 3);

        // The same bytes must produce the same lines no matter how the
        // transport splits them.
        for split_at in 1..payload.len() {
            let (a, b) = payload.split_at(split_at);
            assert_eq!(collect_lines(&[a, b]), whole, "split at {}", split_at);
        }

        let byte_at_a_time: Vec<&[u8]> = payload.chunks(1).collect();
        assert_eq!(collect_lines(&byte_at_a_time), whole);
    }

    #[test]
    fn test_blank_lines_swallowed() {
        let lines = collect_lines(&[b"first\n\n   \n\r\nsecond\n"]);
        assert_eq!(lines, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_crlf_terminator() {
        let lines = collect_lines(&[b"alpha\r\nbeta\r\n"]);
        assert_eq!(lines, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn test_truncated_tail_dropped() {
        let lines = collect_lines(&[b"kept\nlost without a terminator"]);
        assert_eq!(lines, vec!["kept".to_string()]);
    }

    #[test]
    fn test_empty_chunks_are_noops() {
        let mut decoder = LineFrameDecoder::new();
        assert!(decoder.push(b"").is_empty());
        assert!(decoder.push(b"partial").is_empty());
        assert!(decoder.push(b"").is_empty());
        assert_eq!(decoder.push(b" line\n"), vec!["partial line".to_string()]);
    }
}

// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Byte-to-line reassembly for streamed process output.

/// Accumulates raw bytes and hands back complete lines, keeping a trailing
/// partial line until more bytes (or the end of the stream) arrive.
///
/// Splitting happens on `\n` before decoding, so a multi-byte UTF-8 sequence
/// cut across two reads is never mangled.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bytes` and return every line completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        complete[..last_newline]
            .split(|&b| b == b'\n')
            .map(decode_line)
            .collect()
    }

    /// Take the trailing partial line, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            let rest = std::mem::take(&mut self.pending);
            Some(decode_line(&rest))
        }
    }

    /// Bytes received but not yet returned as a line.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_line_is_held_back() {
        let mut buffer = LineBuffer::new();
        assert_eq!(buffer.push(b"foo\nbar\nba"), vec!["foo", "bar"]);
        assert_eq!(buffer.pending(), b"ba");
        assert_eq!(buffer.push(b"z\n"), vec!["baz"]);
        assert!(buffer.pending().is_empty());
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut buffer = LineBuffer::new();
        let mut lines = Vec::new();
        for byte in b"one\ntwo\n" {
            lines.extend(buffer.push(&[*byte]));
        }
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_finish_returns_unterminated_tail() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"no newline").is_empty());
        assert_eq!(buffer.finish(), Some("no newline".to_string()));
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let mut buffer = LineBuffer::new();
        assert_eq!(buffer.push(b"a\r\n\r\nb\n"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_leading_whitespace_is_preserved() {
        let mut buffer = LineBuffer::new();
        assert_eq!(buffer.push(b"  indented\n"), vec!["  indented"]);
    }

    #[test]
    fn test_multibyte_char_split_across_reads() {
        let bytes = "héllo\n".as_bytes();
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(&bytes[..2]).is_empty());
        assert_eq!(buffer.push(&bytes[2..]), vec!["héllo"]);
    }
}

const REPLACEMENT: char = '\u{FFFD}';

/// Incremental UTF-8 decoder.
///
/// Bytes that could still begin a valid multi-byte sequence are held back
/// until the next chunk instead of being replaced, so a character split across
/// a chunk boundary decodes exactly as if it had arrived whole. Bytes that can
/// never be valid become one U+FFFD per invalid sequence.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes carried over from the previous chunk.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn decode_into(&mut self, chunk: &[u8], out: &mut String) {
        self.pending.extend_from_slice(chunk);

        let mut rest: &[u8] = &self.pending;
        let mut consumed = 0;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    consumed += rest.len();
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    if let Ok(text) = std::str::from_utf8(valid) {
                        out.push_str(text);
                    }
                    consumed += valid.len();
                    match err.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT);
                            consumed += len;
                            rest = &after[len..];
                        }
                        // Truncated sequence at the end: wait for more bytes.
                        None => break,
                    }
                }
            }
        }
        self.pending.drain(..consumed);
    }

    /// End of input: a dangling partial sequence can no longer complete.
    pub fn finish_into(&mut self, out: &mut String) {
        if !self.pending.is_empty() {
            self.pending.clear();
            out.push(REPLACEMENT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_chunks(chunks: &[&[u8]]) -> String {
        let mut decoder = Utf8Decoder::new();
        let mut out = String::new();
        for chunk in chunks {
            decoder.decode_into(chunk, &mut out);
        }
        decoder.finish_into(&mut out);
        out
    }

    #[test]
    fn two_byte_character_split_across_chunks() {
        let bytes = "café".as_bytes();
        let (head, tail) = bytes.split_at(bytes.len() - 1);

        let mut decoder = Utf8Decoder::new();
        let mut out = String::new();
        decoder.decode_into(head, &mut out);
        assert_eq!(out, "caf");
        assert_eq!(decoder.pending_len(), 1);

        decoder.decode_into(tail, &mut out);
        assert_eq!(out, "café");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn four_byte_character_fed_one_byte_at_a_time() {
        let text = "a🦀b";
        let chunks: Vec<&[u8]> = text.as_bytes().chunks(1).collect();
        assert_eq!(decode_chunks(&chunks), text);
    }

    #[test]
    fn invalid_bytes_become_replacement_characters() {
        assert_eq!(decode_chunks(&[b"ok\xFFok"]), "ok\u{FFFD}ok");
        // A lead byte followed by a non-continuation byte is one bad sequence.
        assert_eq!(decode_chunks(&[b"\xC3", b"("]), "\u{FFFD}(");
    }

    #[test]
    fn truncated_sequence_at_finish_is_replaced_once() {
        assert_eq!(decode_chunks(&[b"end\xE2\x82"]), "end\u{FFFD}");
    }
}

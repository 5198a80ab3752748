//! Line framer - Reassembles protocol lines from raw socket reads

/// Splits a byte stream on `\n`, carrying incomplete fragments across reads.
///
/// The carry-over is kept as bytes so multi-byte characters split between
/// two reads are decoded intact.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` and return every line it completed, without terminators
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let Some(last_newline) = self.buffer.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };

        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        complete[..complete.len() - 1]
            .split(|b| *b == b'\n')
            .map(|line| String::from_utf8_lossy(line).trim_end().to_string())
            .collect()
    }

    /// Bytes held back waiting for their line terminator
    #[cfg(test)]
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }
}

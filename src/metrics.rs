use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetrics {
    pub page_number: usize,
    /// Rows whose first chunk starts on this page.
    pub rows_started: usize,
    pub chunk_count: usize,
    pub command_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetrics {
    pub pages: Vec<PageMetrics>,
    pub row_count: usize,
    /// Rows drawn in more than one chunk.
    pub split_rows: usize,
    pub total_layout_ms: f64,
    pub total_bytes: usize,
    /// Hex SHA-256 of the serialized document.
    pub fingerprint: String,
}

impl DocumentMetrics {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub(crate) fn record_output(&mut self, bytes: &[u8]) {
        self.total_bytes = bytes.len();
        self.fingerprint = fingerprint(bytes);
    }
}

pub(crate) fn fingerprint(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_hex_sha256() {
        assert_eq!(
            fingerprint(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn record_output_sets_size_and_digest() {
        let mut metrics = DocumentMetrics::default();
        metrics.record_output(b"%PDF-1.7");
        assert_eq!(metrics.total_bytes, 8);
        assert_eq!(metrics.fingerprint.len(), 64);
    }
}

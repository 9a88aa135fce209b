//! Résumé PDF text extraction.
//!
//! Both entry points report failure through `PdfText::success` and never return an error:
//! a missing or unreadable résumé must not block an evaluation.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, warn};

/// Outcome of an extraction attempt. `success` means parsing completed; the text may
/// still be blank, so callers check its trimmed length before relying on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PdfText {
    pub text: String,
    pub success: bool,
}

impl PdfText {
    fn failed() -> Self {
        Self::default()
    }

    /// The extracted text when parsing succeeded and produced something readable.
    pub fn usable_text(self) -> Option<String> {
        if self.success && !self.text.trim().is_empty() {
            Some(self.text)
        } else {
            None
        }
    }
}

#[derive(Clone)]
pub struct ResumeExtractor {
    client: Client,
    max_bytes: usize,
}

impl ResumeExtractor {
    pub fn new(fetch_timeout: Duration, max_bytes: usize) -> reqwest::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(fetch_timeout).build()?,
            max_bytes,
        })
    }

    /// Largest PDF, in bytes, either entry point will parse.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Downloads a PDF and extracts its text. The body is read chunk by chunk and
    /// abandoned once it passes the size cap.
    pub async fn extract_from_url(&self, url: &str) -> PdfText {
        let mut response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                error!(url, error = %e, "Fetching résumé PDF failed");
                return PdfText::failed();
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Résumé fetch returned non-success status");
            return PdfText::failed();
        }

        if response
            .content_length()
            .is_some_and(|len| len as usize > self.max_bytes)
        {
            warn!(url, max_bytes = self.max_bytes, "Résumé PDF exceeds size limit");
            return PdfText::failed();
        }

        let mut bytes: Vec<u8> = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    if bytes.len() + chunk.len() > self.max_bytes {
                        warn!(url, max_bytes = self.max_bytes, "Résumé PDF exceeds size limit");
                        return PdfText::failed();
                    }
                    bytes.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) => {
                    error!(url, error = %e, "Reading résumé PDF body failed");
                    return PdfText::failed();
                }
            }
        }

        let result = self.parse(bytes).await;
        info!(
            url,
            success = result.success,
            text_length = result.text.len(),
            "Résumé parsed from URL"
        );
        result
    }

    /// Decodes an uploaded base64 PDF and extracts its text.
    pub async fn extract_from_base64(&self, encoded: &str) -> PdfText {
        let bytes = match STANDARD.decode(encoded.trim()) {
            Ok(b) => b,
            Err(e) => {
                error!(error = %e, "Decoding base64 résumé failed");
                return PdfText::failed();
            }
        };

        let result = self.parse(bytes).await;
        info!(
            success = result.success,
            text_length = result.text.len(),
            "Résumé parsed from upload"
        );
        result
    }

    async fn parse(&self, bytes: Vec<u8>) -> PdfText {
        if bytes.len() > self.max_bytes {
            warn!(bytes = bytes.len(), max_bytes = self.max_bytes, "Résumé PDF exceeds size limit");
            return PdfText::failed();
        }

        let byte_count = bytes.len();
        // pdf-extract is CPU-bound and may panic on malformed input; a panic surfaces as a JoinError.
        match tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await {
            Ok(Ok(text)) => {
                info!(bytes = byte_count, text_length = text.len(), "PDF parsed");
                PdfText {
                    text,
                    success: true,
                }
            }
            Ok(Err(e)) => {
                error!(bytes = byte_count, error = %e, "PDF text extraction failed");
                PdfText::failed()
            }
            Err(e) => {
                error!(bytes = byte_count, error = %e, "PDF parser aborted");
                PdfText::failed()
            }
        }
    }
}

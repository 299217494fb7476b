//! Google Translate text-to-speech.
//!
//! The endpoint only accepts short inputs, so text is cut into pieces of at
//! most [`MAX_CHARS`] characters on sentence and line boundaries, each piece is
//! synthesized separately and the MP3 segments are written back to back.

use super::{SpeechSynthesizer, ensure_parent};
use crate::config::Config;
use crate::error::ServiceError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use tokio::fs;

pub const MAX_CHARS: usize = 100;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

fn is_break(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | ';' | ':' | '\n' | '\u{2026}' | '\u{3002}')
}

/// A colon only ends a sentence when whitespace follows, so `10:30` stays whole.
fn ends_sentence(c: char, next: Option<char>) -> bool {
    if c == ':' {
        return next.is_none_or(char::is_whitespace);
    }
    is_break(c)
}

fn hard_split(word: &str, out: &mut Vec<String>) {
    let chars: Vec<char> = word.chars().collect();
    for piece in chars.chunks(MAX_CHARS) {
        out.push(piece.iter().collect());
    }
}

/// Split `sentence` on whitespace into pieces that each fit in [`MAX_CHARS`].
fn split_long(sentence: &str, out: &mut Vec<String>) {
    let mut current = String::new();
    for word in sentence.split_whitespace() {
        if word.chars().count() > MAX_CHARS {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            hard_split(word, out);
            continue;
        }
        let extra = if current.is_empty() { 0 } else { 1 };
        if current.chars().count() + extra + word.chars().count() > MAX_CHARS {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        out.push(current);
    }
}

pub fn tokenize(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if ends_sentence(c, chars.peek().map(|&(_, n)| n)) {
            let end = i + c.len_utf8();
            sentences.push(&text[start..end]);
            start = end;
        }
    }
    sentences.push(&text[start..]);

    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    for sentence in sentences {
        let sentence = sentence.trim();
        if sentence.is_empty() || sentence.chars().all(is_break) {
            continue;
        }
        if sentence.chars().count() > MAX_CHARS {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            split_long(sentence, &mut out);
            continue;
        }
        let extra = if current.is_empty() { 0 } else { 1 };
        if current.chars().count() + extra + sentence.chars().count() > MAX_CHARS {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(sentence);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

pub struct GoogleTts {
    client: Client,
    base_url: String,
}

impl GoogleTts {
    pub fn new(client: Client, cfg: &Config) -> Self {
        Self {
            client,
            base_url: cfg.settings.gtts_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn synthesize_part(
        &self,
        part: &str,
        language: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>> {
        let url = format!("{}/translate_tts", self.base_url);
        let idx = idx.to_string();
        let total = total.to_string();
        let textlen = part.chars().count().to_string();
        let resp = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Referer", "https://translate.google.com/")
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language),
                ("q", part),
                ("idx", idx.as_str()),
                ("total", total.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await
            .context("Google TTS request failed")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                service: "Google TTS",
                status: status.as_u16(),
            }
            .into());
        }
        let bytes = resp.bytes().await.context("Google TTS response read failed")?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, language: &str, out_path: &Path) -> Result<()> {
        let parts = tokenize(text);
        let mut audio = Vec::new();
        for (idx, part) in parts.iter().enumerate() {
            let segment = self.synthesize_part(part, language, idx, parts.len()).await?;
            audio.extend_from_slice(&segment);
        }
        if audio.is_empty() {
            return Err(ServiceError::EmptyAudio { service: "Google TTS" }.into());
        }

        ensure_parent(out_path).await?;
        fs::write(out_path, &audio)
            .await
            .with_context(|| format!("Failed to write {}", out_path.display()))?;
        Ok(())
    }
}

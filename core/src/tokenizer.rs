use std::io::{self, BufRead, BufReader, Read};

/// Longest token kept by default; longer alphanumeric runs are dropped whole.
pub const MAX_TOKEN_LEN: usize = 31;

/// Terminates an in-memory request buffer. Nothing after it is scanned.
pub const BUFFER_SENTINEL: u8 = b'\r';

/// Splits text into lowercase ASCII alphanumeric tokens.
///
/// Every byte that is not `[A-Za-z0-9]` separates tokens. A run longer than
/// [`max_len`](Tokenizer::max_len) is consumed to its end and discarded, never
/// truncated or split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tokenizer {
    max_len: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self { max_len: MAX_TOKEN_LEN }
    }
}

impl Tokenizer {
    pub fn with_max_len(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Lazily tokenize a byte stream.
    pub fn tokens<R: Read>(&self, reader: R) -> Tokens<BufReader<R>> {
        self.tokens_buffered(BufReader::new(reader))
    }

    pub fn tokens_buffered<R: BufRead>(&self, reader: R) -> Tokens<R> {
        Tokens { reader, run: Run::default(), max_len: self.max_len }
    }

    /// Scan `buf` from `cursor` for the next token.
    ///
    /// Returns the token (if any) and the cursor to resume from. Scanning stops
    /// at [`BUFFER_SENTINEL`] or at the end of the slice; once there, the token
    /// is `None` and the cursor no longer moves.
    pub fn next_in_buffer(&self, buf: &[u8], mut cursor: usize) -> (Option<String>, usize) {
        let mut run = Run::default();
        while let Some(&byte) = buf.get(cursor) {
            if byte == BUFFER_SENTINEL {
                break;
            }
            if let Step::Emit = run.feed(byte, self.max_len) {
                return (Some(run.take()), cursor);
            }
            cursor += 1;
        }
        (run.finish(self.max_len), cursor)
    }

    pub fn buffer_tokens<'a>(&self, buf: &'a [u8]) -> BufferTokens<'a> {
        BufferTokens { tokenizer: *self, buf, cursor: 0 }
    }
}

/// Tokenize a string with the default length limit.
///
/// Runs the stream scanner, so a stray carriage return does not end the text.
pub fn tokenize(text: &str) -> Vec<String> {
    Tokenizer::default()
        .tokens_buffered(text.as_bytes())
        .filter_map(Result::ok)
        .collect()
}

/// Collapse every CRLF pair in `buf` to a bare LF.
///
/// A lone `\r` is left alone and still ends a buffer scan. Bytes are copied
/// as they are, so input need not be UTF-8.
pub fn normalize_line_endings(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len());
    let mut bytes = buf.iter().copied().peekable();
    while let Some(byte) = bytes.next() {
        if byte == b'\r' && bytes.peek() == Some(&b'\n') {
            continue;
        }
        out.push(byte);
    }
    out
}

enum Step {
    Continue,
    Emit,
}

/// The alphanumeric run being scanned.
#[derive(Default)]
struct Run {
    token: Vec<u8>,
    len: usize,
}

impl Run {
    fn feed(&mut self, byte: u8, max_len: usize) -> Step {
        if byte.is_ascii_alphanumeric() {
            if self.len < max_len {
                self.token.push(byte.to_ascii_lowercase());
            }
            self.len = self.len.saturating_add(1);
            Step::Continue
        } else if self.len == 0 {
            Step::Continue
        } else if self.len > max_len {
            self.clear();
            Step::Continue
        } else {
            Step::Emit
        }
    }

    fn finish(&mut self, max_len: usize) -> Option<String> {
        if self.len > 0 && self.len <= max_len {
            Some(self.take())
        } else {
            self.clear();
            None
        }
    }

    fn take(&mut self) -> String {
        let token = self.token.iter().map(|&b| char::from(b)).collect();
        self.clear();
        token
    }

    fn clear(&mut self) {
        self.token.clear();
        self.len = 0;
    }
}

/// Tokens read from a stream. Read errors are yielded as `Err` items.
pub struct Tokens<R> {
    reader: R,
    run: Run,
    max_len: usize,
}

impl<R: BufRead> Iterator for Tokens<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Some(Err(e)),
            };
            if buf.is_empty() {
                return self.run.finish(self.max_len).map(Ok);
            }

            let mut consumed = 0;
            let mut emit = false;
            for &byte in buf {
                consumed += 1;
                if let Step::Emit = self.run.feed(byte, self.max_len) {
                    emit = true;
                    break;
                }
            }
            self.reader.consume(consumed);
            if emit {
                return Some(Ok(self.run.take()));
            }
        }
    }
}

/// Tokens of a sentinel-terminated buffer, see [`Tokenizer::next_in_buffer`].
pub struct BufferTokens<'a> {
    tokenizer: Tokenizer,
    buf: &'a [u8],
    cursor: usize,
}

impl BufferTokens<'_> {
    /// Position the next scan starts from.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Iterator for BufferTokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let (token, cursor) = self.tokenizer.next_in_buffer(self.buf, self.cursor);
        self.cursor = cursor;
        token
    }
}

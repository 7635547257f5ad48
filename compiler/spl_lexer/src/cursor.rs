//! Byte cursor over source text with line tracking.
//!
//! `current()` returns `0` once the end is reached, so byte-class predicates
//! stop there without explicit bounds checks in the scanner.

pub(crate) struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str) -> Self {
        Cursor {
            src,
            pos: 0,
            line: 1,
        }
    }

    #[inline]
    fn byte_at(&self, pos: usize) -> u8 {
        self.src.as_bytes().get(pos).copied().unwrap_or(0)
    }

    #[inline]
    pub fn current(&self) -> u8 {
        self.byte_at(self.pos)
    }

    #[inline]
    pub fn peek(&self) -> u8 {
        self.byte_at(self.pos + 1)
    }

    #[inline]
    pub fn peek2(&self) -> u8 {
        self.byte_at(self.pos + 2)
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Advance one byte, counting newlines.
    #[inline]
    pub fn advance(&mut self) {
        if self.current() == b'\n' {
            self.line += 1;
        }
        self.pos += 1;
    }

    pub fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Advance past one UTF-8 character.
    pub fn advance_char(&mut self) -> Option<char> {
        let ch = self.src[self.pos..].chars().next()?;
        if ch == '\n' {
            self.line += 1;
        }
        self.pos += ch.len_utf8();
        Some(ch)
    }

    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while !self.is_eof() && pred(self.current()) {
            self.advance();
        }
    }

    /// Horizontal whitespace only; newlines are significant to the scanner.
    pub fn eat_blanks(&mut self) {
        self.eat_while(|b| b == b' ' || b == b'\t' || b == b'\r');
    }

    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.src[start..self.pos]
    }

    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Jump to the next `\n` (left unconsumed) or to the end.
    pub fn eat_until_newline(&mut self) {
        match memchr::memchr(b'\n', self.rest().as_bytes()) {
            Some(offset) => self.pos += offset,
            None => self.pos = self.src.len(),
        }
    }

    /// Consume through the next `*/`. Returns `false` when it never appears.
    pub fn eat_block_comment_body(&mut self) -> bool {
        match memchr::memmem::find(self.rest().as_bytes(), b"*/") {
            Some(offset) => {
                let newlines = memchr::memchr_iter(b'\n', &self.rest().as_bytes()[..offset]).count();
                self.line += u32::try_from(newlines).unwrap_or(u32::MAX);
                self.pos += offset + 2;
                true
            }
            None => {
                let newlines = memchr::memchr_iter(b'\n', self.rest().as_bytes()).count();
                self.line += u32::try_from(newlines).unwrap_or(u32::MAX);
                self.pos = self.src.len();
                false
            }
        }
    }

    /// First byte after blanks, newlines and comments, without consuming.
    pub fn peek_significant(&self) -> (u8, &'a str) {
        let bytes = self.src.as_bytes();
        let mut i = self.pos;
        loop {
            match bytes.get(i) {
                Some(b' ' | b'\t' | b'\r' | b'\n') => i += 1,
                Some(b'/') if bytes.get(i + 1) == Some(&b'/') => {
                    match memchr::memchr(b'\n', &bytes[i..]) {
                        Some(off) => i += off,
                        None => return (0, ""),
                    }
                }
                Some(b'/') if bytes.get(i + 1) == Some(&b'*') => {
                    match memchr::memmem::find(&bytes[i + 2..], b"*/") {
                        Some(off) => i += off + 4,
                        None => return (0, ""),
                    }
                }
                Some(&b) => return (b, &self.src[i..]),
                None => return (0, ""),
            }
        }
    }
}

#[inline]
pub(crate) fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

#[inline]
pub(crate) fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

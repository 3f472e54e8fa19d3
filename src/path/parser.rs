//! Left-to-right scanner for path expressions
//!
//! Single-pass over the input bytes; all structural characters are ASCII,
//! so byte offsets are always valid char boundaries.

use smallvec::SmallVec;

use super::{PathError, PathResult, Segment};

pub(super) fn parse(input: &str) -> PathResult<SmallVec<[Segment; 4]>> {
    if input.is_empty() {
        return Err(PathError::Empty);
    }
    if input.as_bytes()[0] == b'[' {
        return Err(PathError::LeadingIndex { offset: 0 });
    }

    let mut scanner = Scanner {
        input,
        bytes: input.as_bytes(),
        pos: 0,
    };
    let mut segments = SmallVec::new();

    loop {
        segments.push(scanner.identifier()?);
        while scanner.peek() == Some(b'[') {
            segments.push(scanner.index()?);
        }
        match scanner.peek() {
            None => break,
            Some(b'.') => {
                scanner.pos += 1;
                // A trailing dot leaves nothing for the next segment.
                if scanner.pos >= scanner.bytes.len() {
                    return Err(PathError::EmptySegment {
                        offset: scanner.pos,
                    });
                }
            }
            Some(b']') => {
                return Err(PathError::UnbalancedBracket {
                    offset: scanner.pos,
                });
            }
            Some(_) => return Err(scanner.unexpected()),
        }
    }

    Ok(segments)
}

struct Scanner<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl Scanner<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn unexpected(&self) -> PathError {
        let found = self.input[self.pos..].chars().next().unwrap_or('\0');
        PathError::UnexpectedChar {
            found,
            offset: self.pos,
        }
    }

    /// An identifier is any non-empty run excluding `.`, `[` and `]`.
    fn identifier(&mut self) -> PathResult<Segment> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b'.' | b'[' | b']') {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(PathError::EmptySegment { offset: start });
        }
        Ok(Segment::Field(self.input[start..self.pos].to_string()))
    }

    /// Bracketed index: integer first, then quoted or bare string key.
    fn index(&mut self) -> PathResult<Segment> {
        let open = self.pos;
        self.pos += 1;

        match self.peek() {
            Some(quote @ (b'\'' | b'"')) => {
                let key = self.quoted(quote)?;
                match self.peek() {
                    Some(b']') => {
                        self.pos += 1;
                        Ok(Segment::Key(key))
                    }
                    Some(_) => Err(self.unexpected()),
                    None => Err(PathError::UnbalancedBracket { offset: open }),
                }
            }
            _ => {
                let start = self.pos;
                while let Some(b) = self.peek() {
                    if b == b']' {
                        break;
                    }
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err(PathError::UnbalancedBracket { offset: open });
                }
                let content = &self.input[start..self.pos];
                self.pos += 1;
                if content.is_empty() {
                    return Err(PathError::EmptyIndex { offset: open });
                }
                match content.parse::<i64>() {
                    Ok(index) => Ok(Segment::Index(index)),
                    Err(_) => Ok(Segment::Key(content.to_string())),
                }
            }
        }
    }

    /// Consume a quoted key, positioned on the opening quote. Backslash
    /// escapes the following character.
    fn quoted(&mut self, quote: u8) -> PathResult<String> {
        let open = self.pos;
        self.pos += 1;
        let mut key = String::new();
        loop {
            match self.peek() {
                None => return Err(PathError::UnterminatedQuote { offset: open }),
                Some(b) if b == quote => {
                    self.pos += 1;
                    return Ok(key);
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.input[self.pos..].chars().next() {
                        None => return Err(PathError::UnterminatedQuote { offset: open }),
                        Some(c) => {
                            key.push(c);
                            self.pos += c.len_utf8();
                        }
                    }
                }
                Some(_) => {
                    // Quoted content may be multi-byte; advance by char.
                    let c = self.input[self.pos..]
                        .chars()
                        .next()
                        .unwrap_or('\0');
                    key.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }
}

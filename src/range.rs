//! Range mini-language resolving to ordered index sequences.
//!
//! A [`RangeSpec`] is a list of tokens: integers, `:` (unit-step run) and
//! `::` (run whose step is the next token). Resolution against a dimension
//! length turns it into a sequence of non-negative indices.
//!
//! ```text
//! [1, 2, 3]              -> 1, 2, 3
//! [1, :, 5]              -> 1, 2, 3, 4, 5
//! [:]                    -> 0 ..= len-1
//! [:, -1]                -> 0 ..= len-1
//! [1, ::, 2, 5]          -> 1, 3, 5
//! [5, ::, -2, 1]         -> 5, 3, 1
//! [::, -1]               -> len-1 ..= 0
//! [5, :, :, 4]  (len 10) -> 5, 6, 7, 8, 9, 0, 1, 2, 3, 4
//! ```
//!
//! Negative integers count back from the end of the dimension and need a
//! known length. Two run operators in a row close the first run at its
//! implied boundary. `[::]` with no step is an error, as is a step of `0`.
//!
//! The text form accepted by [`RangeSpec::parse`] writes the same tokens
//! separated by whitespace or commas: `"1:5"`, `"1 :: 2 5"`, `"::-1"`,
//! `"5 : : 4"`.

use std::fmt;
use std::str::FromStr;

use crate::{MatrixError, Result};

/// A single token of a range specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeToken {
    /// An explicit index; negative values count from the end.
    Index(isize),
    /// `:` — unit-step run to the next index or the implied end.
    Colon,
    /// `::` — the next token is the step of a run.
    StepColon,
}

impl From<isize> for RangeToken {
    fn from(index: isize) -> Self {
        RangeToken::Index(index)
    }
}

/// A parsed range specification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSpec {
    tokens: Vec<RangeToken>,
}

/// Grammar-level piece of a specification, before a length is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Single(isize),
    Run {
        start: Option<isize>,
        step: Option<isize>,
        end: Option<isize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Empty,
    Num,
    GetStep,
    GetEnd,
}

impl RangeSpec {
    /// Create a specification from tokens.
    pub fn new(tokens: Vec<RangeToken>) -> Self {
        Self { tokens }
    }

    /// The full range of a dimension, `[:]`.
    pub fn full() -> Self {
        Self::new(vec![RangeToken::Colon])
    }

    /// Parse the text form, e.g. `"0:4"`, `"1 :: 2 9"`, `"::-1"`.
    pub fn parse(text: &str) -> Result<Self> {
        let mut tokens = Vec::new();
        let bytes = text.as_bytes();
        let mut pos = 0;
        while pos < bytes.len() {
            match bytes[pos] {
                b' ' | b'\t' | b'\n' | b'\r' | b',' => pos += 1,
                b':' => {
                    if bytes.get(pos + 1) == Some(&b':') {
                        tokens.push(RangeToken::StepColon);
                        pos += 2;
                    } else {
                        tokens.push(RangeToken::Colon);
                        pos += 1;
                    }
                }
                b'-' | b'+' | b'0'..=b'9' => {
                    let start = pos;
                    pos += 1;
                    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                        pos += 1;
                    }
                    let literal = &text[start..pos];
                    let value = literal.parse::<isize>().map_err(|_| {
                        MatrixError::RangeSpec(format!("invalid integer '{literal}' in '{text}'"))
                    })?;
                    tokens.push(RangeToken::Index(value));
                }
                _ => {
                    let c = text[pos..].chars().next().unwrap_or('?');
                    return Err(MatrixError::RangeSpec(format!(
                        "unexpected character '{c}' in '{text}'"
                    )));
                }
            }
        }
        Ok(Self { tokens })
    }

    /// The tokens of this specification.
    pub fn tokens(&self) -> &[RangeToken] {
        &self.tokens
    }

    /// True when the specification has no tokens (and resolves to nothing).
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Split the token stream into singles and runs.
    fn segments(&self) -> Vec<Segment> {
        let mut out = Vec::new();
        let mut state = State::Empty;
        let mut current = Segment::Single(0);
        let mut pos = 0;
        while pos < self.tokens.len() {
            let token = self.tokens[pos];
            match state {
                State::Empty => {
                    current = match token {
                        RangeToken::Index(i) => {
                            state = State::Num;
                            Segment::Single(i)
                        }
                        RangeToken::Colon => {
                            state = State::GetEnd;
                            Segment::Run {
                                start: None,
                                step: Some(1),
                                end: None,
                            }
                        }
                        RangeToken::StepColon => {
                            state = State::GetStep;
                            Segment::Run {
                                start: None,
                                step: None,
                                end: None,
                            }
                        }
                    };
                    pos += 1;
                }
                State::Num => {
                    let Segment::Single(buffered) = current else {
                        unreachable!("NUM state always buffers a single index");
                    };
                    match token {
                        RangeToken::Index(i) => {
                            out.push(current);
                            current = Segment::Single(i);
                        }
                        RangeToken::Colon => {
                            current = Segment::Run {
                                start: Some(buffered),
                                step: Some(1),
                                end: None,
                            };
                            state = State::GetEnd;
                        }
                        RangeToken::StepColon => {
                            current = Segment::Run {
                                start: Some(buffered),
                                step: None,
                                end: None,
                            };
                            state = State::GetStep;
                        }
                    }
                    pos += 1;
                }
                State::GetStep => match token {
                    RangeToken::Index(i) => {
                        if let Segment::Run { step, .. } = &mut current {
                            *step = Some(i);
                        }
                        state = State::GetEnd;
                        pos += 1;
                    }
                    // Leaves the step missing; resolution reports it.
                    _ => {
                        out.push(current);
                        state = State::Empty;
                    }
                },
                State::GetEnd => {
                    if let RangeToken::Index(i) = token {
                        if let Segment::Run { end, .. } = &mut current {
                            *end = Some(i);
                        }
                        pos += 1;
                    }
                    out.push(current);
                    state = State::Empty;
                }
            }
        }
        if state != State::Empty {
            out.push(current);
        }
        out
    }

    /// Validate against `len` and return a lazy iterator over the indices.
    ///
    /// Each call produces a fresh, independent sequence.
    ///
    /// # Errors
    /// Returns [`MatrixError::RangeSpec`] for a missing or zero step, or for
    /// a negative index or implied end when `len` is `None`.
    pub fn iter(&self, len: Option<usize>) -> Result<RangeIter> {
        let mut pieces = Vec::new();
        for segment in self.segments() {
            match segment {
                Segment::Single(i) => pieces.push(Piece::Single(wrap(i, len)?)),
                Segment::Run { start, step, end } => {
                    let step = step.ok_or_else(|| {
                        MatrixError::RangeSpec("'::' must be followed by a step".into())
                    })?;
                    if step == 0 {
                        return Err(MatrixError::RangeSpec("step must not be zero".into()));
                    }
                    let (start, end) = if step > 0 {
                        let start = match start {
                            Some(s) => wrap_signed(s, len)?,
                            None => 0,
                        };
                        let end = match end {
                            Some(e) => wrap_signed(e, len)?,
                            None => last_index(len)?,
                        };
                        (start, end)
                    } else {
                        let start = match start {
                            Some(s) => wrap_signed(s, len)?,
                            None => last_index(len)?,
                        };
                        let end = match end {
                            Some(e) => wrap_signed(e, len)?,
                            None => 0,
                        };
                        (start, end)
                    };
                    pieces.push(Piece::Run {
                        next: start,
                        step,
                        end,
                    });
                }
            }
        }
        Ok(RangeIter { pieces, pos: 0 })
    }
}

impl FromStr for RangeSpec {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self> {
        RangeSpec::parse(s)
    }
}

impl From<Vec<RangeToken>> for RangeSpec {
    fn from(tokens: Vec<RangeToken>) -> Self {
        RangeSpec::new(tokens)
    }
}

impl<const N: usize> From<[RangeToken; N]> for RangeSpec {
    fn from(tokens: [RangeToken; N]) -> Self {
        RangeSpec::new(tokens.to_vec())
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for token in &self.tokens {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            match token {
                RangeToken::Index(i) => write!(f, "{i}")?,
                RangeToken::Colon => f.write_str(":")?,
                RangeToken::StepColon => f.write_str("::")?,
            }
        }
        Ok(())
    }
}

/// Resolve a specification into a concrete list of indices.
///
/// # Example
/// ```
/// use index_matrix::{resolve, RangeSpec};
///
/// let spec = RangeSpec::parse("3 : : 2").unwrap();
/// assert_eq!(resolve(&spec, Some(5)).unwrap(), vec![3, 4, 0, 1, 2]);
/// ```
pub fn resolve(spec: &RangeSpec, len: Option<usize>) -> Result<Vec<usize>> {
    Ok(spec.iter(len)?.collect())
}

fn wrap_signed(index: isize, len: Option<usize>) -> Result<isize> {
    if index >= 0 {
        return Ok(index);
    }
    match len {
        Some(len) => {
            let wrapped = index + len as isize;
            if wrapped < 0 {
                Err(MatrixError::RangeSpec(format!(
                    "index {index} reaches before the start of a dimension of length {len}"
                )))
            } else {
                Ok(wrapped)
            }
        }
        None => Err(MatrixError::RangeSpec(format!(
            "negative index {index} needs a known dimension length"
        ))),
    }
}

fn wrap(index: isize, len: Option<usize>) -> Result<usize> {
    wrap_signed(index, len).map(|i| i as usize)
}

fn last_index(len: Option<usize>) -> Result<isize> {
    len.map(|len| len as isize - 1).ok_or_else(|| {
        MatrixError::RangeSpec("an open-ended range needs a known dimension length".into())
    })
}

/// Resolved piece of a range, ready for lazy emission.
#[derive(Debug, Clone, Copy)]
enum Piece {
    Single(usize),
    Run { next: isize, step: isize, end: isize },
}

/// Lazy iterator over the indices of a resolved [`RangeSpec`].
#[derive(Debug, Clone)]
pub struct RangeIter {
    pieces: Vec<Piece>,
    pos: usize,
}

impl Iterator for RangeIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            let piece = self.pieces.get_mut(self.pos)?;
            match piece {
                Piece::Single(i) => {
                    let i = *i;
                    self.pos += 1;
                    return Some(i);
                }
                Piece::Run { next, step, end } => {
                    let live = if *step > 0 { *next <= *end } else { *next >= *end };
                    if live {
                        let i = *next;
                        // A run that would step past isize ends here.
                        match next.checked_add(*step) {
                            Some(n) => *next = n,
                            None => self.pos += 1,
                        }
                        return Some(i as usize);
                    }
                    self.pos += 1;
                }
            }
        }
    }
}

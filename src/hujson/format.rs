//! Canonical layout for relaxed JSON.
//!
//! Objects and arrays whose source spans several lines are printed one entry
//! per line, tab indented, with a trailing comma after every entry. Everything
//! else stays on one line. Comments survive: a comment that shared a line with
//! the previous entry keeps sharing it, other comments get a line of their own.
//! A run of blank lines collapses to one, and blank lines directly after an
//! opening bracket or before a closing one are dropped.

use super::{Kind, Member, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Newlines(usize),
    LineComment(&'a str),
    BlockComment(&'a str),
}

impl Piece<'_> {
    fn is_comment(&self) -> bool {
        !matches!(self, Piece::Newlines(_))
    }
}

fn pieces(extra: &str) -> Vec<Piece<'_>> {
    let bytes = extra.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = extra[i..].find('\n').map_or(extra.len(), |n| i + n);
                out.push(Piece::LineComment(extra[i..end].trim_end()));
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = extra[i + 2..]
                    .find("*/")
                    .map_or(extra.len(), |n| i + n + 4);
                out.push(Piece::BlockComment(&extra[i..end]));
                i = end;
            }
            b'\n' => {
                match out.last_mut() {
                    Some(Piece::Newlines(n)) => *n += 1,
                    _ => out.push(Piece::Newlines(1)),
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    out
}

fn has_comments(extra: &str) -> bool {
    pieces(extra).iter().any(Piece::is_comment)
}

fn value_spans_lines(value: &Value) -> bool {
    value.before.contains('\n') || value.after.contains('\n') || kind_spans_lines(&value.kind)
}

fn kind_spans_lines(kind: &Kind) -> bool {
    match kind {
        Kind::Literal(_) => false,
        Kind::Object(obj) => {
            obj.close.contains('\n')
                || obj
                    .members
                    .iter()
                    .any(|m| value_spans_lines(&m.name) || value_spans_lines(&m.value))
        }
        Kind::Array(arr) => arr.close.contains('\n') || arr.elements.iter().any(value_spans_lines),
    }
}

/// One entry of an object or array.
#[derive(Clone, Copy)]
enum Entry<'a> {
    Member(&'a Member),
    Element(&'a Value),
}

impl<'a> Entry<'a> {
    fn leading(&self) -> &'a str {
        match self {
            Entry::Member(m) => &m.name.before,
            Entry::Element(v) => &v.before,
        }
    }
}

#[derive(Default)]
struct Formatter {
    out: String,
    // The current line ends in a `//` comment, so nothing may follow on it.
    line_comment_open: bool,
}

impl Formatter {
    fn break_line(&mut self, depth: usize, blank: bool) {
        if blank {
            self.out.push('\n');
        }
        self.out.push('\n');
        for _ in 0..depth {
            self.out.push('\t');
        }
        self.line_comment_open = false;
    }

    fn comment(&mut self, piece: Piece<'_>) {
        match piece {
            Piece::LineComment(c) => {
                self.out.push_str(c);
                self.line_comment_open = true;
            }
            Piece::BlockComment(c) => self.out.push_str(c),
            Piece::Newlines(_) => {}
        }
    }

    /// Lays out comments between entries of a multi-line container. Returns
    /// whether the next entry should be preceded by a blank line.
    fn comments(&mut self, pieces: &[Piece<'_>], depth: usize, mut at_open: bool) -> bool {
        let mut newlines = 0;
        for &piece in pieces {
            if let Piece::Newlines(n) = piece {
                newlines += n;
                continue;
            }
            if newlines == 0 && !self.line_comment_open {
                self.out.push(' ');
            } else {
                self.break_line(depth, newlines >= 2 && !at_open);
            }
            self.comment(piece);
            at_open = false;
            newlines = 0;
        }
        newlines >= 2 && !at_open
    }

    /// Writes block comments found before the first line break of `extra`
    /// inline, and returns the remainder for relocation after the next comma.
    fn inline<'a>(&mut self, extra: &'a str, carry: &mut Vec<Piece<'a>>) {
        let mut newlines = 0;
        for piece in pieces(extra) {
            match piece {
                Piece::Newlines(n) => {
                    newlines += n;
                    if !carry.is_empty() {
                        carry.push(piece);
                    }
                }
                Piece::BlockComment(c) if newlines == 0 && carry.is_empty() => {
                    self.out.push(' ');
                    self.out.push_str(c);
                }
                _ => {
                    if carry.is_empty() && newlines > 0 {
                        carry.push(Piece::Newlines(1));
                    }
                    carry.push(piece);
                }
            }
        }
        while matches!(carry.last(), Some(Piece::Newlines(_))) {
            carry.pop();
        }
    }

    fn kind(&mut self, kind: &Kind, depth: usize) {
        match kind {
            Kind::Literal(lit) => self.out.push_str(lit.raw()),
            Kind::Object(obj) => {
                let entries: Vec<Entry<'_>> = obj.members.iter().map(Entry::Member).collect();
                self.container(('{', '}'), &entries, &obj.close, kind_spans_lines(kind), depth);
            }
            Kind::Array(arr) => {
                let entries: Vec<Entry<'_>> = arr.elements.iter().map(Entry::Element).collect();
                self.container(('[', ']'), &entries, &arr.close, kind_spans_lines(kind), depth);
            }
        }
    }

    fn container(
        &mut self,
        (open, close): (char, char),
        entries: &[Entry<'_>],
        close_extra: &str,
        multi_line: bool,
        depth: usize,
    ) {
        self.out.push(open);
        if entries.is_empty() && !has_comments(close_extra) {
            self.out.push(close);
            return;
        }
        if multi_line {
            let mut carry = Vec::new();
            let mut at_open = true;
            for entry in entries {
                let mut lead = std::mem::take(&mut carry);
                lead.extend(pieces(entry.leading()));
                let blank = self.comments(&lead, depth + 1, at_open);
                self.break_line(depth + 1, blank);
                at_open = false;
                self.entry(*entry, depth + 1, &mut carry);
                self.out.push(',');
            }
            carry.extend(pieces(close_extra));
            self.comments(&carry, depth + 1, at_open);
            self.break_line(depth, false);
        } else {
            let mut discard = Vec::new();
            for (i, entry) in entries.iter().enumerate() {
                if i > 0 {
                    self.out.push_str(", ");
                }
                for piece in pieces(entry.leading()) {
                    if piece.is_comment() {
                        self.comment(piece);
                        self.out.push(' ');
                    }
                }
                self.entry(*entry, depth, &mut discard);
            }
            let trailing: Vec<Piece<'_>> = pieces(close_extra)
                .into_iter()
                .filter(Piece::is_comment)
                .collect();
            for (i, piece) in trailing.into_iter().enumerate() {
                if i > 0 || !entries.is_empty() {
                    self.out.push(' ');
                }
                self.comment(piece);
            }
        }
        self.out.push(close);
    }

    /// Writes an entry without its leading gap; comments that cannot stay in
    /// place are pushed onto `carry`.
    fn entry<'a>(&mut self, entry: Entry<'a>, depth: usize, carry: &mut Vec<Piece<'a>>) {
        let value = match entry {
            Entry::Member(member) => {
                if let Kind::Literal(name) = &member.name.kind {
                    self.out.push_str(name.raw());
                }
                self.inline(&member.name.after, carry);
                self.out.push(':');
                self.inline(&member.value.before, carry);
                self.out.push(' ');
                &member.value
            }
            Entry::Element(value) => value,
        };
        self.kind(&value.kind, depth);
        self.inline(&value.after, carry);
    }
}

impl Value {
    /// Canonical text of the document, ending with a single newline.
    pub fn format(&self) -> String {
        let mut f = Formatter::default();

        let mut emitted = false;
        let mut newlines = 0;
        for piece in pieces(&self.before) {
            if let Piece::Newlines(n) = piece {
                newlines += n;
                continue;
            }
            if emitted {
                f.break_line(0, newlines >= 2);
            }
            f.comment(piece);
            emitted = true;
            newlines = 0;
        }
        if emitted {
            f.break_line(0, newlines >= 2);
        }

        f.kind(&self.kind, 0);
        f.comments(&pieces(&self.after), 0, false);
        f.out.push('\n');
        f.out
    }
}

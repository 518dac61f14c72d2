use super::{
    cursor::Cursor,
    kinds::{DisplayMath, InlineMath},
    types::Segment,
};

/// Scans `text` into plain-text and math [`Segment`]s.
///
/// The returned iterator borrows `text` and holds no other state, so calling
/// this twice on the same input yields the same sequence.
///
/// # Delimiter Precedence
/// At each `$`, `$$...$$` is tried before `$...$`. Both are non-greedy: the
/// first closing delimiter of the same kind ends the segment. An opening `$`
/// with no closing partner stays in the surrounding plain text.
///
/// # Returns
/// Segments covering the whole input in order. Input with no math yields a
/// single plain-text segment, even when empty.
pub fn segments(text: &str) -> Segments<'_> {
    Segments {
        text,
        pos: 0,
        pending: None,
        emitted: false,
    }
}

/// Lazy iterator over the segments of a text. See [`segments`].
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    text: &'a str,
    /// Start of the next unconsumed byte.
    pos: usize,
    /// A math segment found after a run of text; emitted on the next call.
    pending: Option<Segment<'a>>,
    emitted: bool,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        if let Some(seg) = self.pending.take() {
            self.emitted = true;
            return Some(seg);
        }
        if self.pos >= self.text.len() {
            if self.emitted {
                return None;
            }
            self.emitted = true;
            return Some(Segment::plain(self.text, 0));
        }

        let text_start = self.pos;
        let mut cur = Cursor::at(self.text, self.pos);

        while !cur.eof() {
            if cur.peek() != Some(InlineMath::DOLLAR) {
                cur.bump();
                continue;
            }
            let found = try_scan_display(&mut cur).or_else(|| try_scan_inline(&mut cur));
            let Some(seg) = found else {
                // No closing `$` anywhere past this point: the rest is text.
                break;
            };
            self.pos = cur.pos();
            self.emitted = true;
            if seg.source_offset > text_start {
                self.pending = Some(seg);
                return Some(Segment::plain(
                    &self.text[text_start..seg.source_offset],
                    text_start,
                ));
            }
            return Some(seg);
        }

        self.pos = self.text.len();
        self.emitted = true;
        Some(Segment::plain(&self.text[text_start..], text_start))
    }
}

/// Attempts to scan `$$...$$` at the cursor.
///
/// On failure the cursor is restored and `None` returned.
fn try_scan_display<'a>(cur: &mut Cursor<'a>) -> Option<Segment<'a>> {
    if !cur.starts_with(DisplayMath::OPEN) {
        return None;
    }

    let saved = cur.clone();
    let start = cur.pos();
    cur.bump_n(DisplayMath::OPEN.len());
    let inner_start = cur.pos();

    let Some(inner_end) = cur.seek(DisplayMath::CLOSE) else {
        *cur = saved;
        return None;
    };
    cur.bump_n(DisplayMath::CLOSE.len());

    Some(Segment::math(&cur.s[inner_start..inner_end], true, start))
}

/// Attempts to scan `$...$` at the cursor.
///
/// On failure the cursor is restored and `None` returned.
fn try_scan_inline<'a>(cur: &mut Cursor<'a>) -> Option<Segment<'a>> {
    if cur.peek() != Some(InlineMath::DOLLAR) {
        return None;
    }

    let start = cur.pos();
    let inner_start = start + 1;
    let inner_end = Cursor::at(cur.s, inner_start).find_byte(InlineMath::DOLLAR)?;
    cur.bump_n(inner_end + 1 - start);

    Some(Segment::math(&cur.s[inner_start..inner_end], false, start))
}

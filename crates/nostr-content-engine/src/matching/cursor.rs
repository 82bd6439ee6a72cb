/// A cursor for character-by-character scanning with position tracking.
///
/// Operates over a string slice while tracking the absolute byte position
/// in the scanned text (via `base` offset). Steps whole `char`s so a
/// position taken from the cursor is always a valid slice boundary.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The string being scanned.
    pub s: &'a str,
    /// Base offset added to the local index for absolute positions.
    pub base: usize,
    /// Current local byte index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str, base: usize) -> Self {
        Self { s, base, i: 0 }
    }

    /// Returns the current absolute byte position (base + local index).
    pub fn pos(&self) -> usize {
        self.base + self.i
    }

    /// Peeks at the current character without advancing.
    pub fn peek(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    /// The character just behind the cursor.
    pub fn prev(&self) -> Option<char> {
        self.s[..self.i].chars().next_back()
    }

    /// Advances by one character, returning it.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.i += c.len_utf8();
        Some(c)
    }

    /// Advances while `pred` holds; returns the consumed slice.
    pub fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.i;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.i += c.len_utf8();
        }
        &self.s[start..self.i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_basics() {
        let mut cur = Cursor::new("hello", 10);
        assert_eq!(cur.pos(), 10);
        assert_eq!(cur.peek(), Some('h'));
        assert_eq!(cur.bump(), Some('h'));
        assert_eq!(cur.pos(), 11);
        assert_eq!(cur.prev(), Some('h'));
    }

    #[test]
    fn multibyte_characters_advance_whole() {
        let mut cur = Cursor::new("日本#", 0);
        assert_eq!(cur.bump(), Some('日'));
        assert_eq!(cur.pos(), 3);
        assert_eq!(cur.eat_while(char::is_alphabetic), "本");
        assert_eq!(cur.peek(), Some('#'));
    }

    #[test]
    fn empty_string_input() {
        let mut cur = Cursor::new("", 0);
        assert_eq!(cur.peek(), None);
        assert_eq!(cur.prev(), None);
        assert_eq!(cur.bump(), None);
        assert_eq!(cur.pos(), 0);
    }
}

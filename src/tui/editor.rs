//! Minimal text buffer behind the editor pane.

/// Text plus a cursor counted in chars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorBuffer {
    text: String,
    cursor: usize,
}

impl EditorBuffer {
    /// Replace the text and put the cursor at its end.
    pub fn reset(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.chars().count();
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(idx, _)| idx)
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert(c);
        }
    }

    /// Delete the char before the cursor.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
        true
    }

    /// Delete the char under the cursor.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.text.chars().count() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
        true
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        let (_, col) = self.line_col();
        self.cursor -= col;
    }

    pub fn end(&mut self) {
        let rest = self
            .text
            .chars()
            .skip(self.cursor)
            .take_while(|c| *c != '\n')
            .count();
        self.cursor += rest;
    }

    pub fn up(&mut self) {
        let (line, col) = self.line_col();
        if line > 0 {
            self.move_to(line - 1, col);
        }
    }

    pub fn down(&mut self) {
        let (line, col) = self.line_col();
        if line + 1 < self.text.split('\n').count() {
            self.move_to(line + 1, col);
        }
    }

    fn move_to(&mut self, line: usize, col: usize) {
        let mut index = 0;
        for (n, text) in self.text.split('\n').enumerate() {
            let len = text.chars().count();
            if n == line {
                self.cursor = index + col.min(len);
                return;
            }
            index += len + 1;
        }
    }

    /// Zero-based line and column of the cursor.
    #[must_use]
    pub fn line_col(&self) -> (usize, usize) {
        let mut line = 0;
        let mut col = 0;
        for c in self.text.chars().take(self.cursor) {
            if c == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (line, col)
    }
}

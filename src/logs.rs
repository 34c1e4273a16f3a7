/// Cap on captured bot log output per seat, in characters.
pub const LOG_CAP: usize = 20_000;
/// Cap on captured bot error output per seat, in characters.
pub const ERROR_CAP: usize = 30_000;

/// Append-only text buffer bounded to a cap, dropping from the front so
/// the newest context survives. Blocks are joined by newlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailBuffer {
    cap: usize,
    text: String,
}

impl TailBuffer {
    pub fn new(cap: usize) -> Self {
        TailBuffer {
            cap,
            text: String::new(),
        }
    }

    pub fn push_block(&mut self, block: &str) {
        if block.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(block);
        if self.text.len() > self.cap {
            let mut cut = self.text.len() - self.cap;
            while !self.text.is_char_boundary(cut) {
                cut += 1;
            }
            self.text.replace_range(..cut, "");
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

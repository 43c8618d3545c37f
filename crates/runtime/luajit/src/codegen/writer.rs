//! Line-oriented Lua output with indentation tracking.

const INDENT: &str = "  ";

/// Accumulates Lua source one statement per line.
///
/// An inline writer joins its lines with single spaces and ignores
/// indentation, which is how function bodies nested inside expressions are
/// produced. Emitted statements never start with `(`, so joining them on one
/// line is unambiguous.
#[derive(Debug, Default)]
pub(crate) struct LuaWriter {
    buf: String,
    depth: usize,
    inline: bool,
}

impl LuaWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inline() -> Self {
        Self {
            inline: true,
            ..Self::default()
        }
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if self.inline {
            if !self.buf.is_empty() {
                self.buf.push(' ');
            }
            self.buf.push_str(text);
            return;
        }
        if text.is_empty() {
            self.buf.push('\n');
            return;
        }
        for _ in 0..self.depth {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_indentation() {
        let mut w = LuaWriter::new();
        w.line("if x then");
        w.indent();
        w.line("return 1");
        w.dedent();
        w.line("end");
        assert_eq!(w.finish(), "if x then\n  return 1\nend\n");
    }

    #[test]
    fn test_inline_joins_lines() {
        let mut w = LuaWriter::inline();
        w.line("function(x)");
        w.indent();
        w.line("local y = x");
        w.line("return y");
        w.dedent();
        w.line("end");
        assert_eq!(w.finish(), "function(x) local y = x return y end");
    }

    #[test]
    fn test_dedent_saturates() {
        let mut w = LuaWriter::new();
        w.dedent();
        w.line("x()");
        assert_eq!(w.finish(), "x()\n");
    }
}

//! Syntax model (§4.1): parses one source file into the tree the rest of the
//! engine consumes, plus the per-file metadata (raw text, comments) needed
//! for comment-based ignore directives.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use swc_common::{BytePos, FileName, Globals, SourceMap, GLOBALS, comments::SingleThreadedComments};
use swc_ecma_ast::Module;
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

/// One parsed source file: its AST, the shared source map used to resolve
/// spans to line/column, and its raw text (for ignore-directive scanning).
pub struct FileRecord {
    pub path: String,
    pub module: Module,
    pub source_map: Arc<SourceMap>,
    /// Raw source text, kept for per-line ignore-directive matching (§9).
    pub text: String,
}

impl FileRecord {
    /// Resolve a byte position to a 1-based (line, column) pair.
    pub fn line_col(&self, pos: BytePos) -> (usize, usize) {
        let loc = self.source_map.lookup_char_pos(pos);
        (loc.line, loc.col.0 + 1)
    }

    /// The source text of a given 1-based line number, if in range.
    pub fn line_text(&self, line: usize) -> Option<&str> {
        self.text.lines().nth(line.checked_sub(1)?)
    }
}

/// Parse a TSX/JSX source string into a `FileRecord`.
///
/// Accepts a shared `SourceMap` so many files can be parsed in parallel
/// (§5) while still resolving spans against one coordinate space.
pub fn parse_file(path: &str, text: String, source_map: Arc<SourceMap>) -> Result<FileRecord> {
    GLOBALS.set(&Globals::new(), || {
        let source_file =
            source_map.new_source_file(FileName::Real(path.into()).into(), text.clone());

        let syntax = Syntax::Typescript(TsSyntax {
            tsx: true,
            decorators: true,
            ..Default::default()
        });

        let comments = SingleThreadedComments::default();
        let mut parser = Parser::new(syntax, StringInput::from(&*source_file), Some(&comments));

        let module = parser
            .parse_module()
            .map_err(|e| anyhow!("failed to parse {}: {:?}", path, e))?;

        Ok(FileRecord {
            path: path.to_string(),
            module,
            source_map: source_map.clone(),
            text,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_component() {
        let sm = Arc::new(SourceMap::default());
        let src = "function Button() { return null; }".to_string();
        let file = parse_file("Button.tsx", src, sm).unwrap();
        assert_eq!(file.path, "Button.tsx");
        assert_eq!(file.module.body.len(), 1);
    }

    #[test]
    fn test_parse_failure_reported() {
        let sm = Arc::new(SourceMap::default());
        let src = "function ( { {{{".to_string();
        let result = parse_file("Broken.tsx", src, sm);
        assert!(result.is_err());
    }

    #[test]
    fn test_line_text() {
        let sm = Arc::new(SourceMap::default());
        let src = "const a = 1;\nconst b = 2;\n".to_string();
        let file = parse_file("a.ts", src, sm).unwrap();
        assert_eq!(file.line_text(1), Some("const a = 1;"));
        assert_eq!(file.line_text(2), Some("const b = 2;"));
        assert_eq!(file.line_text(99), None);
    }
}

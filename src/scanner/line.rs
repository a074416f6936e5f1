use shimgen_utils::Span;

/// One physical line of a header with its position in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// 1-based line number.
    pub number: usize,
    /// Line text without the trailing newline.
    pub text: &'a str,
    offset: usize,
}

impl SourceLine<'_> {
    /// Span of the line's non-whitespace content.
    pub fn content_span(&self) -> Span {
        let leading = self.text.len() - self.text.trim_start().len();
        let trailing = self.text.len() - self.text.trim_end().len();
        Span::new(
            self.offset + leading,
            self.offset + self.text.len() - trailing,
        )
    }
}

pub fn source_lines(source: &str) -> impl Iterator<Item = SourceLine<'_>> {
    let mut offset = 0usize;
    source
        .split_inclusive('\n')
        .enumerate()
        .map(move |(idx, chunk)| {
            let text = chunk.strip_suffix('\n').unwrap_or(chunk);
            let text = text.strip_suffix('\r').unwrap_or(text);
            let line = SourceLine {
                number: idx + 1,
                text,
                offset,
            };
            offset += chunk.len();
            line
        })
}

/// Removes `//` and `/* */` comments, carrying an open block comment over to
/// the following lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommentStripper {
    in_block: bool,
}

impl CommentStripper {
    pub const fn in_block(&self) -> bool {
        self.in_block
    }

    pub fn strip(&mut self, line: &str) -> String {
        let mut code = String::with_capacity(line.len());
        let mut rest = line;

        loop {
            if self.in_block {
                let Some(end) = rest.find("*/") else {
                    return code;
                };
                self.in_block = false;
                rest = &rest[end + 2..];
                continue;
            }

            let line_comment = rest.find("//");
            let block_comment = rest.find("/*");
            match (line_comment, block_comment) {
                (Some(line_start), block) if block.is_none_or(|b| line_start < b) => {
                    code.push_str(&rest[..line_start]);
                    return code;
                }
                (_, Some(block_start)) => {
                    code.push_str(&rest[..block_start]);
                    code.push(' ');
                    self.in_block = true;
                    rest = &rest[block_start + 2..];
                }
                _ => {
                    code.push_str(rest);
                    return code;
                }
            }
        }
    }
}

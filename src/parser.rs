use crate::ast::{FieldLine, TableBlock};
use crate::lexer::{Lexer, Spanned, Token};

/// Keyword that opens a table block.
pub const TABLE_KEYWORD: &str = "Table";

/// Two-level parser: the token stream is cut into table chunks, each chunk
/// yields at most one block, and each block body is cut into field lines.
///
/// Parsing is permissive and never fails. A chunk without an
/// `<ident> { ... }` shape is dropped.
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Spanned>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let tokens = Lexer::new(source).tokenize();
        Self { source, tokens }
    }

    pub fn parse(&self) -> Vec<TableBlock> {
        self.chunks()
            .filter_map(|chunk| self.parse_block(chunk))
            .collect()
    }

    fn is_keyword(tok: &Spanned) -> bool {
        matches!(&tok.token, Token::Ident(s) if s == TABLE_KEYWORD)
    }

    /// Token runs between `Table` keywords, keywords and `Eof` excluded.
    fn chunks(&self) -> impl Iterator<Item = &[Spanned]> {
        let body = match self.tokens.split_last() {
            Some((_eof, rest)) => rest,
            None => &[][..],
        };
        body.split(Self::is_keyword).filter(|c| !c.is_empty())
    }

    fn parse_block(&self, chunk: &[Spanned]) -> Option<TableBlock> {
        let open = chunk.windows(2).position(|w| {
            matches!(w[0].token, Token::Ident(_)) && w[1].token == Token::LBrace
        })?;
        let name = match &chunk[open].token {
            Token::Ident(name) => name.clone(),
            _ => return None,
        };

        let lbrace = &chunk[open + 1];
        let rbrace = chunk[open + 2..]
            .iter()
            .find(|t| t.token == Token::RBrace)?;

        let body = &self.source[lbrace.span.end..rbrace.span.start];
        Some(TableBlock {
            name,
            lines: body.lines().filter_map(parse_field_line).collect(),
        })
    }
}

/// Split one body line into name and raw definition. Blank lines give `None`.
pub fn parse_field_line(line: &str) -> Option<FieldLine> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (name, definition) = match line.find(char::is_whitespace) {
        Some(i) => {
            let ws = line[i..].chars().next().map_or(1, char::len_utf8);
            (&line[..i], &line[i + ws..])
        }
        None => (line, ""),
    };

    Some(FieldLine {
        name: name.to_string(),
        definition: definition.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table() {
        let input = r#"
            Table users {
                id integer [pk]
                name text

                email text [null]
            }
        "#;
        let blocks = Parser::new(input).parse();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "users");
        assert_eq!(blocks[0].lines.len(), 3);
        assert_eq!(blocks[0].lines[0].definition, "integer [pk]");
        assert_eq!(blocks[0].lines[2].name, "email");
    }

    #[test]
    fn test_unmatched_chunks_are_dropped() {
        let input = "garbage here\nTable { x int }\nTable a x int\nTable ok { id int }";
        let blocks = Parser::new(input).parse();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "ok");
    }

    #[test]
    fn test_name_is_identifier_before_brace() {
        let blocks = Parser::new("Table public.accounts { id int }").parse();
        assert_eq!(blocks[0].name, "accounts");
    }

    #[test]
    fn test_unclosed_block_is_dropped() {
        let blocks = Parser::new("Table a { id int\nTable b { id int }").parse();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "b");
    }

    #[test]
    fn test_braces_do_not_nest() {
        let blocks = Parser::new("Table a {\n x int\n y { z }\n w int }").parse();
        assert_eq!(blocks.len(), 1);
        let names: Vec<_> = blocks[0].lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(blocks[0].lines[1].definition, "{ z");
    }

    #[test]
    fn test_keyword_inside_words_does_not_split() {
        let blocks = Parser::new("Table Tables { TableId int }").parse();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "Tables");
        assert_eq!(blocks[0].lines[0].name, "TableId");
    }

    #[test]
    fn test_field_line_keeps_definition_verbatim() {
        let line = parse_field_line("  id   integer  [pk]  ").unwrap();
        assert_eq!(line.name, "id");
        assert_eq!(line.definition, "  integer  [pk]");

        let line = parse_field_line("flag").unwrap();
        assert_eq!(line.definition, "");
        assert_eq!(parse_field_line("   "), None);
    }

    #[test]
    fn test_single_line_block() {
        let blocks = Parser::new("Table t { id int }").parse();
        assert_eq!(blocks[0].lines.len(), 1);
        assert_eq!(blocks[0].lines[0].definition, "int");
    }
}

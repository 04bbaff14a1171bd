//! Recursive descent parser implementation

use archgraph_lexer::{Token, TokenKind};
use archgraph_model::*;

use crate::ParseError;

/// One parsed entity plus the span of its declaration keyword and name
#[derive(Debug, Clone)]
pub struct Declaration {
    pub entity: Entity,
    pub span: Span,
}

/// Attributes of a declaration before they are bound to a kind
#[derive(Debug, Default)]
struct RawDecl {
    scalars: Vec<(String, String, Span)>,
    lists: Vec<(String, Vec<String>, Span)>,
    flags: Vec<(String, Span)>,
    fields: Vec<(DtoField, Span)>,
}

impl RawDecl {
    fn take_scalar(&mut self, key: &str) -> Option<String> {
        let idx = self.scalars.iter().position(|(k, _, _)| k == key)?;
        Some(self.scalars.remove(idx).1)
    }

    fn take_list(&mut self, key: &str) -> Vec<String> {
        match self.lists.iter().position(|(k, _, _)| k == key) {
            Some(idx) => self.lists.remove(idx).1,
            None => Vec::new(),
        }
    }

    fn take_flag(&mut self, key: &str) -> bool {
        match self.flags.iter().position(|(k, _)| k == key) {
            Some(idx) => {
                self.flags.remove(idx);
                true
            }
            None => false,
        }
    }

    fn take_fields(&mut self) -> Vec<DtoField> {
        self.fields.drain(..).map(|(f, _)| f).collect()
    }

    /// First attribute that was not consumed by the kind builder
    fn leftover(&self) -> Option<(String, Span)> {
        let scalar = self.scalars.first().map(|(k, _, s)| (k.clone(), *s));
        let list = self.lists.first().map(|(k, _, s)| (k.clone(), *s));
        let flag = self.flags.first().map(|(k, s)| (k.clone(), *s));
        let field = self.fields.first().map(|(_, s)| ("field".to_string(), *s));
        [scalar, list, flag, field]
            .into_iter()
            .flatten()
            .min_by_key(|(_, span)| span.start)
    }
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    lines: LineIndex,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            tokens.push(Token {
                kind: TokenKind::Eof,
                span: Span::new(source.len(), source.len()),
            });
        }
        Self {
            source,
            tokens,
            pos: 0,
            lines: LineIndex::new(source),
        }
    }

    // === Utilities ===

    fn current(&self) -> &Token {
        // `new` guarantees a trailing Eof, so the list is never empty
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn peek_ahead(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn at_declaration_end(&self) -> bool {
        self.at(TokenKind::Eof) || self.peek().entity_kind().is_some()
    }

    fn consume(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(
                kind.describe(),
                self.peek(),
                self.current().span,
            ))
        }
    }

    fn span(&self) -> Span {
        self.current().span
    }

    // === Document ===

    pub fn parse_document(&mut self) -> Result<Vec<Declaration>, ParseError> {
        let mut declarations = Vec::new();
        while !self.at(TokenKind::Eof) {
            declarations.push(self.parse_declaration()?);
        }
        Ok(declarations)
    }

    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let start = self.span();
        let kind = match self.peek().entity_kind() {
            Some(kind) => kind,
            None if self.at(TokenKind::Error) => {
                return Err(ParseError::InvalidCharacter { span: start });
            }
            None => return Err(ParseError::ExpectedDeclaration { span: start }),
        };
        self.advance();

        let name = self.parse_name("entity name")?;
        let span = start.merge(self.tokens[self.pos.saturating_sub(1)].span);

        let mut raw = RawDecl::default();
        while !self.at_declaration_end() {
            self.parse_item(&mut raw)?;
        }

        let position = self.lines.position(start.start);
        let body = self.build_body(kind, &name, &mut raw, span)?;
        if let Some((key, span)) = raw.leftover() {
            return Err(ParseError::UnknownAttribute {
                kind: kind.to_string(),
                key,
                span,
            });
        }

        Ok(Declaration {
            entity: Entity::new(name, position, body),
            span,
        })
    }

    // === Items ===

    fn parse_item(&mut self, raw: &mut RawDecl) -> Result<(), ParseError> {
        if self.at(TokenKind::Field) {
            let field = self.parse_field()?;
            raw.fields.push(field);
            return Ok(());
        }

        let key_token = self.consume(TokenKind::Ident)?;
        let key = key_token.text(self.source).to_string();
        match self.peek() {
            TokenKind::Eq => {
                self.advance();
                let value = self.parse_name("value")?;
                raw.scalars.push((key, value, key_token.span));
            }
            TokenKind::Colon => {
                self.advance();
                let items = self.parse_list()?;
                raw.lists.push((key, items, key_token.span));
            }
            _ => raw.flags.push((key, key_token.span)),
        }
        Ok(())
    }

    /// `field name[?]: "type" [description="..."]`
    fn parse_field(&mut self) -> Result<(DtoField, Span), ParseError> {
        let start = self.span();
        self.consume(TokenKind::Field)?;
        let name = self.parse_name("field name")?;
        let optional = if self.at(TokenKind::Question) {
            self.advance();
            true
        } else {
            false
        };
        self.consume(TokenKind::Colon)?;
        let type_name = self.parse_name("field type")?;

        let description = if self.at(TokenKind::Ident)
            && self.current().text(self.source) == "description"
            && self.peek_ahead(1) == TokenKind::Eq
        {
            self.advance();
            self.advance();
            Some(self.parse_name("description")?)
        } else {
            None
        };

        Ok((
            DtoField {
                name,
                type_name,
                optional,
                description,
            },
            start,
        ))
    }

    /// `[a, b, "c/d"]`, trailing comma allowed
    fn parse_list(&mut self) -> Result<Vec<String>, ParseError> {
        self.consume(TokenKind::LBracket)?;
        let mut items = Vec::new();
        while !self.at(TokenKind::RBracket) {
            items.push(self.parse_name("list item")?);
            if self.at(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.consume(TokenKind::RBracket)?;
        Ok(items)
    }

    /// Identifier or string literal
    fn parse_name(&mut self, expected: &str) -> Result<String, ParseError> {
        match self.peek() {
            TokenKind::Ident => {
                let token = self.advance();
                Ok(token.text(self.source).to_string())
            }
            TokenKind::String => {
                let token = self.advance();
                Ok(unescape(token.text(self.source)))
            }
            other => Err(ParseError::unexpected(expected, other, self.span())),
        }
    }

    // === Kind binding ===

    fn build_body(
        &self,
        kind: EntityKind,
        name: &str,
        raw: &mut RawDecl,
        span: Span,
    ) -> Result<EntityBody, ParseError> {
        let required = |raw: &mut RawDecl, key: &str| {
            raw.take_scalar(key).ok_or_else(|| ParseError::MissingAttribute {
                kind: kind.to_string(),
                name: name.to_string(),
                key: key.to_string(),
                span,
            })
        };

        let body = match kind {
            EntityKind::Program => EntityBody::Program(Program {
                entry: required(raw, "entry")?,
                version: raw.take_scalar("version"),
                exports: raw.take_list("exports"),
            }),
            EntityKind::Dependency => EntityBody::Dependency(Dependency {
                purpose: required(raw, "purpose")?,
                version: raw.take_scalar("version"),
                exports: raw.take_list("exports"),
            }),
            EntityKind::File => EntityBody::File(File {
                path: required(raw, "path")?,
                imports: raw.take_list("imports"),
                exports: raw.take_list("exports"),
            }),
            EntityKind::ClassFile => EntityBody::ClassFile(ClassFile {
                path: required(raw, "path")?,
                extends: raw.take_scalar("extends"),
                implements: raw.take_list("implements"),
                methods: raw.take_list("methods"),
                imports: raw.take_list("imports"),
                exports: raw.take_list("exports"),
            }),
            EntityKind::Class => EntityBody::Class(Class {
                extends: raw.take_scalar("extends"),
                implements: raw.take_list("implements"),
                methods: raw.take_list("methods"),
            }),
            EntityKind::Function => EntityBody::Function(Function {
                signature: required(raw, "signature")?,
                input: raw.take_scalar("input"),
                output: raw.take_scalar("output"),
                calls: raw.take_list("calls"),
                description: raw.take_scalar("description"),
            }),
            EntityKind::Dto => EntityBody::Dto(Dto {
                fields: raw.take_fields(),
                purpose: raw.take_scalar("purpose"),
            }),
            EntityKind::Constants => EntityBody::Constants(Constants {
                path: required(raw, "path")?,
                schema: raw.take_scalar("schema"),
            }),
            EntityKind::Asset => EntityBody::Asset(Asset {
                path: required(raw, "path")?,
                description: raw.take_scalar("description"),
            }),
            EntityKind::UIComponent => EntityBody::UIComponent(UiComponent {
                root: raw.take_flag("root"),
                contains: raw.take_list("contains"),
                contained_by: raw.take_list("containedBy"),
                description: raw.take_scalar("description"),
            }),
            EntityKind::RunParameter => EntityBody::RunParameter(RunParameter {
                description: required(raw, "description")?,
                type_name: raw.take_scalar("type"),
                default: raw.take_scalar("default"),
            }),
        };
        Ok(body)
    }
}

/// Strip quotes and resolve escapes of a string literal
fn unescape(literal: &str) -> String {
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r#""plain""#), "plain");
        assert_eq!(unescape(r#""say \"hi\"""#), "say \"hi\"");
        assert_eq!(unescape(r#""a\nb\\c""#), "a\nb\\c");
    }
}

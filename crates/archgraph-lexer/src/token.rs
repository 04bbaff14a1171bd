//! Token definitions for design-graph text

use archgraph_model::EntityKind;
use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")] // Skip whitespace
#[logos(skip r"#[^\n]*")] // Skip section headers
#[logos(skip r"//[^\n]*")] // Skip line comments
pub enum TokenKind {
    // === Kind keywords ===
    #[token("program")]
    Program,
    #[token("dependency")]
    Dependency,
    #[token("file")]
    File,
    #[token("classfile")]
    ClassFile,
    #[token("class")]
    Class,
    #[token("function")]
    Function,
    #[token("dto")]
    Dto,
    #[token("constants")]
    Constants,
    #[token("asset")]
    Asset,
    #[token("uicomponent")]
    UIComponent,
    #[token("runparameter")]
    RunParameter,

    // === Member keywords ===
    #[token("field")]
    Field,

    // === Punctuation ===
    #[token("=")]
    Eq,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("?")]
    Question,

    // === Literals ===
    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    // === Identifiers ===
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$.\-]*")]
    Ident,

    // === Special ===
    Error,
    Eof,
}

impl TokenKind {
    /// The entity kind a declaration keyword opens
    pub fn entity_kind(&self) -> Option<EntityKind> {
        match self {
            TokenKind::Program => Some(EntityKind::Program),
            TokenKind::Dependency => Some(EntityKind::Dependency),
            TokenKind::File => Some(EntityKind::File),
            TokenKind::ClassFile => Some(EntityKind::ClassFile),
            TokenKind::Class => Some(EntityKind::Class),
            TokenKind::Function => Some(EntityKind::Function),
            TokenKind::Dto => Some(EntityKind::Dto),
            TokenKind::Constants => Some(EntityKind::Constants),
            TokenKind::Asset => Some(EntityKind::Asset),
            TokenKind::UIComponent => Some(EntityKind::UIComponent),
            TokenKind::RunParameter => Some(EntityKind::RunParameter),
            _ => None,
        }
    }

    pub fn is_keyword(&self) -> bool {
        self.entity_kind().is_some() || *self == TokenKind::Field
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Program => "'program'",
            TokenKind::Dependency => "'dependency'",
            TokenKind::File => "'file'",
            TokenKind::ClassFile => "'classfile'",
            TokenKind::Class => "'class'",
            TokenKind::Function => "'function'",
            TokenKind::Dto => "'dto'",
            TokenKind::Constants => "'constants'",
            TokenKind::Asset => "'asset'",
            TokenKind::UIComponent => "'uicomponent'",
            TokenKind::RunParameter => "'runparameter'",
            TokenKind::Field => "'field'",
            TokenKind::Eq => "'='",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Question => "'?'",
            TokenKind::String => "string",
            TokenKind::Ident => "identifier",
            TokenKind::Error => "error",
            TokenKind::Eof => "end of file",
        }
    }
}

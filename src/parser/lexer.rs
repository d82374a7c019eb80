//! Scanner for the preprocessed source buffer
//!
//! Tokenizes the whole input up front into a `Vec<Token>`. Offsets are
//! character offsets into the buffer (half-open `[start, end)`), so they line
//! up with the preprocessor's section records, which use the same unit.
//!
//! Contextual keywords (`get`, `set`, `var`, `partial`, `where`, `yield`,
//! and the query words) lex as plain identifiers; the parser gives them
//! meaning by position.
//!
//! `///` runs and `/** */` blocks are collected as documentation text and
//! attached to the next token; a plain `//` comment or any token clears the
//! pending run, while `/* */` comments and blank lines do not.

use std::fmt;
use std::sync::LazyLock;

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    IntLit(i64),
    RealLit(f64),
    CharLit(char),
    StrLit(String),

    // Reserved keywords
    Abstract,
    As,
    Break,
    Case,
    Catch,
    Class,
    Continue,
    Default,
    Delegate,
    Do,
    Else,
    Enum,
    False,
    Finally,
    For,
    Foreach,
    Goto,
    If,
    In,
    Instanceof,
    Interface,
    New,
    Null,
    Override,
    Package,
    Private,
    Protected,
    Public,
    Readonly,
    Return,
    Sizeof,
    Static,
    Super,
    Switch,
    Synchronized,
    This,
    Throw,
    True,
    Try,
    Typeof,
    Using,
    Virtual,
    While,

    // Primitive type keywords
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Str,
    Object,
    Void,

    // Punctuation and operators
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Semicolon,
    Colon,
    Question,
    QuestionDot,
    QuestionQuestion,
    FatArrow,
    Tilde,
    Bang,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    Ne,
    Shl,
    // >> and >>> lex as single tokens; the parser splits them when they
    // close nested generic argument lists.
    Shr,
    ShrUnsigned,
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    ShlEq,
    ShrEq,
    Eof,
}

impl TokenKind {
    /// Short human-readable form for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier '{}'", name),
            TokenKind::IntLit(n) => format!("integer literal '{}'", n),
            TokenKind::RealLit(n) => format!("real literal '{}'", n),
            TokenKind::CharLit(c) => format!("character literal '{}'", c),
            TokenKind::StrLit(_) => "string literal".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("'{}'", other.lexeme()),
        }
    }

    fn lexeme(&self) -> &'static str {
        match self {
            TokenKind::Abstract => "abstract",
            TokenKind::As => "as",
            TokenKind::Break => "break",
            TokenKind::Case => "case",
            TokenKind::Catch => "catch",
            TokenKind::Class => "class",
            TokenKind::Continue => "continue",
            TokenKind::Default => "default",
            TokenKind::Delegate => "delegate",
            TokenKind::Do => "do",
            TokenKind::Else => "else",
            TokenKind::Enum => "enum",
            TokenKind::False => "false",
            TokenKind::Finally => "finally",
            TokenKind::For => "for",
            TokenKind::Foreach => "foreach",
            TokenKind::Goto => "goto",
            TokenKind::If => "if",
            TokenKind::In => "in",
            TokenKind::Instanceof => "instanceof",
            TokenKind::Interface => "interface",
            TokenKind::New => "new",
            TokenKind::Null => "null",
            TokenKind::Override => "override",
            TokenKind::Package => "package",
            TokenKind::Private => "private",
            TokenKind::Protected => "protected",
            TokenKind::Public => "public",
            TokenKind::Readonly => "readonly",
            TokenKind::Return => "return",
            TokenKind::Sizeof => "sizeof",
            TokenKind::Static => "static",
            TokenKind::Super => "super",
            TokenKind::Switch => "switch",
            TokenKind::Synchronized => "synchronized",
            TokenKind::This => "this",
            TokenKind::Throw => "throw",
            TokenKind::True => "true",
            TokenKind::Try => "try",
            TokenKind::Typeof => "typeof",
            TokenKind::Using => "using",
            TokenKind::Virtual => "virtual",
            TokenKind::While => "while",
            TokenKind::Bool => "bool",
            TokenKind::Byte => "byte",
            TokenKind::Short => "short",
            TokenKind::Int => "int",
            TokenKind::Long => "long",
            TokenKind::Float => "float",
            TokenKind::Double => "double",
            TokenKind::Char => "char",
            TokenKind::Str => "string",
            TokenKind::Object => "object",
            TokenKind::Void => "void",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::Question => "?",
            TokenKind::QuestionDot => "?.",
            TokenKind::QuestionQuestion => "??",
            TokenKind::FatArrow => "=>",
            TokenKind::Tilde => "~",
            TokenKind::Bang => "!",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::Amp => "&",
            TokenKind::AmpAmp => "&&",
            TokenKind::Pipe => "|",
            TokenKind::PipePipe => "||",
            TokenKind::Caret => "^",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Le => "<=",
            TokenKind::Ge => ">=",
            TokenKind::EqEq => "==",
            TokenKind::Ne => "!=",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::ShrUnsigned => ">>>",
            TokenKind::Eq => "=",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::AmpEq => "&=",
            TokenKind::PipeEq => "|=",
            TokenKind::CaretEq => "^=",
            TokenKind::ShlEq => "<<=",
            TokenKind::ShrEq => ">>=",
            TokenKind::Ident(_)
            | TokenKind::IntLit(_)
            | TokenKind::RealLit(_)
            | TokenKind::CharLit(_)
            | TokenKind::StrLit(_)
            | TokenKind::Eof => "",
        }
    }
}

static KEYWORDS: LazyLock<FxHashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    let mut map = FxHashMap::default();
    map.insert("abstract", TokenKind::Abstract);
    map.insert("as", TokenKind::As);
    map.insert("break", TokenKind::Break);
    map.insert("case", TokenKind::Case);
    map.insert("catch", TokenKind::Catch);
    map.insert("class", TokenKind::Class);
    map.insert("continue", TokenKind::Continue);
    map.insert("default", TokenKind::Default);
    map.insert("delegate", TokenKind::Delegate);
    map.insert("do", TokenKind::Do);
    map.insert("else", TokenKind::Else);
    map.insert("enum", TokenKind::Enum);
    map.insert("false", TokenKind::False);
    map.insert("finally", TokenKind::Finally);
    map.insert("for", TokenKind::For);
    map.insert("foreach", TokenKind::Foreach);
    map.insert("goto", TokenKind::Goto);
    map.insert("if", TokenKind::If);
    map.insert("in", TokenKind::In);
    map.insert("instanceof", TokenKind::Instanceof);
    map.insert("interface", TokenKind::Interface);
    map.insert("new", TokenKind::New);
    map.insert("null", TokenKind::Null);
    map.insert("override", TokenKind::Override);
    map.insert("package", TokenKind::Package);
    map.insert("private", TokenKind::Private);
    map.insert("protected", TokenKind::Protected);
    map.insert("public", TokenKind::Public);
    map.insert("readonly", TokenKind::Readonly);
    map.insert("return", TokenKind::Return);
    map.insert("sizeof", TokenKind::Sizeof);
    map.insert("static", TokenKind::Static);
    map.insert("super", TokenKind::Super);
    map.insert("switch", TokenKind::Switch);
    map.insert("synchronized", TokenKind::Synchronized);
    map.insert("this", TokenKind::This);
    map.insert("throw", TokenKind::Throw);
    map.insert("true", TokenKind::True);
    map.insert("try", TokenKind::Try);
    map.insert("typeof", TokenKind::Typeof);
    map.insert("using", TokenKind::Using);
    map.insert("virtual", TokenKind::Virtual);
    map.insert("while", TokenKind::While);
    map.insert("bool", TokenKind::Bool);
    map.insert("byte", TokenKind::Byte);
    map.insert("short", TokenKind::Short);
    map.insert("int", TokenKind::Int);
    map.insert("long", TokenKind::Long);
    map.insert("float", TokenKind::Float);
    map.insert("double", TokenKind::Double);
    map.insert("char", TokenKind::Char);
    map.insert("string", TokenKind::Str);
    map.insert("object", TokenKind::Object);
    map.insert("void", TokenKind::Void);
    map
});

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
    /// True when at least one newline separates this token from the previous
    /// one. Drives the recoverable missing-semicolon diagnostic.
    pub newline_before: bool,
    /// Documentation text accumulated from `///` runs or a `/** */` block
    /// immediately preceding this token.
    pub doc_comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lex error at line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    pending_doc: Option<String>,
    newline_pending: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            pending_doc: None,
            newline_pending: false,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let start = self.position;
            let line = self.line;
            let column = self.column;
            let newline_before = self.newline_pending;
            let doc_comment = self.pending_doc.take();
            self.newline_pending = false;

            if self.is_at_end() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    start,
                    end: start,
                    line,
                    column,
                    newline_before,
                    doc_comment,
                });
                return Ok(tokens);
            }

            let kind = self.scan_token()?;
            tokens.push(Token {
                kind,
                start,
                end: self.position,
                line,
                column,
                newline_before,
                doc_comment,
            });
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> LexError {
        LexError {
            message: message.into(),
            line: self.line,
            column: self.column,
        }
    }

    /// Skips whitespace and comments, maintaining the pending doc run and
    /// the newline flag for the next token.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some('\n') => {
                    self.newline_pending = true;
                    self.advance();
                }
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    if self.peek_at(2) == Some('/') {
                        // Doc line: strip the marker, keep the rest.
                        self.advance();
                        self.advance();
                        self.advance();
                        let mut text = String::new();
                        while let Some(c) = self.peek() {
                            if c == '\n' {
                                break;
                            }
                            text.push(c);
                            self.advance();
                        }
                        let trimmed = text.trim();
                        match &mut self.pending_doc {
                            Some(run) => {
                                run.push('\n');
                                run.push_str(trimmed);
                            }
                            None => self.pending_doc = Some(trimmed.to_string()),
                        }
                    } else {
                        // An ordinary comment breaks a doc run.
                        self.pending_doc = None;
                        while let Some(c) = self.peek() {
                            if c == '\n' {
                                break;
                            }
                            self.advance();
                        }
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let is_doc = self.peek_at(2) == Some('*') && self.peek_at(3) != Some('/');
                    self.advance();
                    self.advance();
                    if is_doc {
                        self.advance();
                    }
                    let mut text = String::new();
                    loop {
                        match self.peek() {
                            None => return Err(self.error("unterminated block comment")),
                            Some('*') if self.peek_at(1) == Some('/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(c) => {
                                if c == '\n' {
                                    self.newline_pending = true;
                                }
                                text.push(c);
                                self.advance();
                            }
                        }
                    }
                    if is_doc {
                        // A block replaces any pending run.
                        self.pending_doc = Some(text.trim().to_string());
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn scan_token(&mut self) -> Result<TokenKind, LexError> {
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(TokenKind::Eof),
        };

        if c.is_ascii_digit() {
            return self.scan_number();
        }
        if c == '_' || c.is_alphabetic() {
            return Ok(self.scan_word());
        }
        if c == '\'' {
            return self.scan_char();
        }
        if c == '"' {
            return self.scan_string();
        }

        self.advance();
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '~' => TokenKind::Tilde,
            '?' => match self.peek() {
                Some('.') => {
                    self.advance();
                    TokenKind::QuestionDot
                }
                Some('?') => {
                    self.advance();
                    TokenKind::QuestionQuestion
                }
                _ => TokenKind::Question,
            },
            '+' => match self.peek() {
                Some('+') => {
                    self.advance();
                    TokenKind::PlusPlus
                }
                Some('=') => {
                    self.advance();
                    TokenKind::PlusEq
                }
                _ => TokenKind::Plus,
            },
            '-' => match self.peek() {
                Some('-') => {
                    self.advance();
                    TokenKind::MinusMinus
                }
                Some('=') => {
                    self.advance();
                    TokenKind::MinusEq
                }
                _ => TokenKind::Minus,
            },
            '*' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::StarEq
                }
                _ => TokenKind::Star,
            },
            '/' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::SlashEq
                }
                _ => TokenKind::Slash,
            },
            '%' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::PercentEq
                }
                _ => TokenKind::Percent,
            },
            '&' => match self.peek() {
                Some('&') => {
                    self.advance();
                    TokenKind::AmpAmp
                }
                Some('=') => {
                    self.advance();
                    TokenKind::AmpEq
                }
                _ => TokenKind::Amp,
            },
            '|' => match self.peek() {
                Some('|') => {
                    self.advance();
                    TokenKind::PipePipe
                }
                Some('=') => {
                    self.advance();
                    TokenKind::PipeEq
                }
                _ => TokenKind::Pipe,
            },
            '^' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::CaretEq
                }
                _ => TokenKind::Caret,
            },
            '!' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::Ne
                }
                _ => TokenKind::Bang,
            },
            '=' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::EqEq
                }
                Some('>') => {
                    self.advance();
                    TokenKind::FatArrow
                }
                _ => TokenKind::Eq,
            },
            '<' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::Le
                }
                Some('<') => {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::ShlEq
                    } else {
                        TokenKind::Shl
                    }
                }
                _ => TokenKind::Lt,
            },
            '>' => match self.peek() {
                Some('=') => {
                    self.advance();
                    TokenKind::Ge
                }
                Some('>') => {
                    self.advance();
                    match self.peek() {
                        Some('>') => {
                            self.advance();
                            TokenKind::ShrUnsigned
                        }
                        Some('=') => {
                            self.advance();
                            TokenKind::ShrEq
                        }
                        _ => TokenKind::Shr,
                    }
                }
                _ => TokenKind::Gt,
            },
            other => return Err(self.error(format!("unexpected character '{}'", other))),
        };
        Ok(kind)
    }

    fn scan_word(&mut self) -> TokenKind {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c == '_' || c.is_alphanumeric() {
                word.push(c);
                self.advance();
            } else {
                break;
            }
        }
        match KEYWORDS.get(word.as_str()) {
            Some(kind) => kind.clone(),
            None => TokenKind::Ident(word),
        }
    }

    fn scan_number(&mut self) -> Result<TokenKind, LexError> {
        // Hex literal
        if self.peek() == Some('0')
            && matches!(self.peek_at(1), Some('x') | Some('X'))
            && self.peek_at(2).map(|c| c.is_ascii_hexdigit()).unwrap_or(false)
        {
            self.advance();
            self.advance();
            let mut digits = String::new();
            while let Some(c) = self.peek() {
                if c.is_ascii_hexdigit() {
                    digits.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
            if matches!(self.peek(), Some('l') | Some('L')) {
                self.advance();
            }
            let value = i64::from_str_radix(&digits, 16)
                .map_err(|_| self.error("hex literal out of range"))?;
            return Ok(TokenKind::IntLit(value));
        }

        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let mut is_real = false;
        // A fraction only when a digit follows the dot, so `1.ToString()`
        // still lexes as int, dot, identifier.
        if self.peek() == Some('.')
            && self.peek_at(1).map(|c| c.is_ascii_digit()).unwrap_or(false)
        {
            is_real = true;
            text.push('.');
            self.advance();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let sign_offset = if matches!(self.peek_at(1), Some('+') | Some('-')) {
                2
            } else {
                1
            };
            if self
                .peek_at(sign_offset)
                .map(|c| c.is_ascii_digit())
                .unwrap_or(false)
            {
                is_real = true;
                for _ in 0..sign_offset {
                    if let Some(c) = self.advance() {
                        text.push(c);
                    }
                }
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        text.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }

        match self.peek() {
            Some('f') | Some('F') | Some('d') | Some('D') => {
                self.advance();
                is_real = true;
            }
            Some('l') | Some('L') if !is_real => {
                self.advance();
            }
            _ => {}
        }

        if is_real {
            let value = text
                .parse::<f64>()
                .map_err(|_| self.error("malformed real literal"))?;
            Ok(TokenKind::RealLit(value))
        } else {
            let value = text
                .parse::<i64>()
                .map_err(|_| self.error("integer literal out of range"))?;
            Ok(TokenKind::IntLit(value))
        }
    }

    fn scan_escape(&mut self) -> Result<char, LexError> {
        self.advance();
        let c = self
            .advance()
            .ok_or_else(|| self.error("unterminated escape sequence"))?;
        match c {
            'n' => Ok('\n'),
            't' => Ok('\t'),
            'r' => Ok('\r'),
            '0' => Ok('\0'),
            '\\' => Ok('\\'),
            '\'' => Ok('\''),
            '"' => Ok('"'),
            other => Err(self.error(format!("unknown escape sequence '\\{}'", other))),
        }
    }

    fn scan_char(&mut self) -> Result<TokenKind, LexError> {
        self.advance();
        let c = match self.peek() {
            None | Some('\n') => return Err(self.error("unterminated character literal")),
            Some('\\') => self.scan_escape()?,
            Some('\'') => return Err(self.error("empty character literal")),
            Some(c) => {
                self.advance();
                c
            }
        };
        if self.peek() != Some('\'') {
            return Err(self.error("unterminated character literal"));
        }
        self.advance();
        Ok(TokenKind::CharLit(c))
    }

    fn scan_string(&mut self) -> Result<TokenKind, LexError> {
        self.advance();
        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => return Err(self.error("unterminated string literal")),
                Some('"') => {
                    self.advance();
                    return Ok(TokenKind::StrLit(value));
                }
                Some('\\') => value.push(self.scan_escape()?),
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .expect("lexing failed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let toks = kinds("class Foo var get");
        assert_eq!(
            toks,
            vec![
                TokenKind::Class,
                TokenKind::Ident("Foo".to_string()),
                TokenKind::Ident("var".to_string()),
                TokenKind::Ident("get".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_shift_operators_lex_whole() {
        let toks = kinds("a >> b >>> c >>= d");
        assert!(toks.contains(&TokenKind::Shr));
        assert!(toks.contains(&TokenKind::ShrUnsigned));
        assert!(toks.contains(&TokenKind::ShrEq));
    }

    #[test]
    fn test_number_literals() {
        assert_eq!(kinds("42")[0], TokenKind::IntLit(42));
        assert_eq!(kinds("0x1F")[0], TokenKind::IntLit(31));
        assert_eq!(kinds("3.5")[0], TokenKind::RealLit(3.5));
        assert_eq!(kinds("2e3")[0], TokenKind::RealLit(2000.0));
        assert_eq!(kinds("4f")[0], TokenKind::RealLit(4.0));
        // Dot without following digit is member access, not a fraction.
        let toks = kinds("1.ToString");
        assert_eq!(toks[0], TokenKind::IntLit(1));
        assert_eq!(toks[1], TokenKind::Dot);
    }

    #[test]
    fn test_string_and_char_escapes() {
        assert_eq!(
            kinds(r#""a\nb""#)[0],
            TokenKind::StrLit("a\nb".to_string())
        );
        assert_eq!(kinds(r"'\t'")[0], TokenKind::CharLit('\t'));
    }

    #[test]
    fn test_doc_comment_run_coalesces() {
        let tokens = Lexer::new("/// first\n/// second\nclass Foo {}")
            .tokenize()
            .expect("lexing failed");
        assert_eq!(tokens[0].kind, TokenKind::Class);
        assert_eq!(tokens[0].doc_comment.as_deref(), Some("first\nsecond"));
        assert!(tokens[1].doc_comment.is_none());
    }

    #[test]
    fn test_plain_comment_clears_doc_run() {
        let tokens = Lexer::new("/// doc\n// not doc\nclass Foo {}")
            .tokenize()
            .expect("lexing failed");
        assert!(tokens[0].doc_comment.is_none());
    }

    #[test]
    fn test_block_comment_keeps_doc_run() {
        let tokens = Lexer::new("/// doc\n/* plain */\nclass Foo {}")
            .tokenize()
            .expect("lexing failed");
        assert_eq!(tokens[0].doc_comment.as_deref(), Some("doc"));
    }

    #[test]
    fn test_doc_block_comment() {
        let tokens = Lexer::new("/** block doc */ class Foo {}")
            .tokenize()
            .expect("lexing failed");
        assert_eq!(tokens[0].doc_comment.as_deref(), Some("block doc"));
    }

    #[test]
    fn test_newline_before_flag() {
        let tokens = Lexer::new("a b\nc").tokenize().expect("lexing failed");
        assert!(!tokens[1].newline_before);
        assert!(tokens[2].newline_before);
    }

    #[test]
    fn test_offsets_are_char_offsets() {
        let tokens = Lexer::new("ab cd").tokenize().expect("lexing failed");
        assert_eq!((tokens[0].start, tokens[0].end), (0, 2));
        assert_eq!((tokens[1].start, tokens[1].end), (3, 5));
        assert_eq!(tokens[1].column, 4);
    }

    #[test]
    fn test_unterminated_string_fails() {
        assert!(Lexer::new("\"abc").tokenize().is_err());
    }
}

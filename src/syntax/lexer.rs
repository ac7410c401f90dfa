#![allow(non_camel_case_types)]

use std::fmt;
use std::mem::discriminant;

use beef::lean::Cow;
use logos::Logos;

use crate::error::LexError;
use crate::span::Span;

/// A single token: its kind (tag + payload) and where it came from.
///
/// Equality compares kinds only; the span exists for error reporting.
#[derive(Clone, Debug)]
pub struct Token<'src> {
  pub kind: TokenKind<'src>,
  pub span: Span,
}

impl<'src> Token<'src> {
  /// True if `self` has the same tag as `kind`, ignoring payloads.
  pub fn is(&self, kind: &TokenKind<'_>) -> bool {
    discriminant(&self.kind) == discriminant(kind)
  }
}

impl<'src> PartialEq for Token<'src> {
  fn eq(&self, other: &Self) -> bool {
    self.kind == other.kind
  }
}

impl<'src> fmt::Display for Token<'src> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.kind)
  }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind<'src> {
  // Valued
  Number(i64),
  Id(Cow<'src, str>),
  Char(char),
  String(Cow<'src, str>),

  // Keywords
  Class,
  Return,
  If,
  Else,
  Def,
  Print,
  And,
  Or,
  Not,
  None,
  True,
  False,

  // Operators
  Eq,
  NotEq,
  LessOrEq,
  GreaterOrEq,

  // Line structure
  Newline,
  Indent,
  Dedent,

  Eof,
}

impl<'src> TokenKind<'src> {
  pub fn name(&self) -> &'static str {
    match self {
      TokenKind::Number(_) => "Number",
      TokenKind::Id(_) => "Id",
      TokenKind::Char(_) => "Char",
      TokenKind::String(_) => "String",
      TokenKind::Class => "class",
      TokenKind::Return => "return",
      TokenKind::If => "if",
      TokenKind::Else => "else",
      TokenKind::Def => "def",
      TokenKind::Print => "print",
      TokenKind::And => "and",
      TokenKind::Or => "or",
      TokenKind::Not => "not",
      TokenKind::None => "None",
      TokenKind::True => "True",
      TokenKind::False => "False",
      TokenKind::Eq => "==",
      TokenKind::NotEq => "!=",
      TokenKind::LessOrEq => "<=",
      TokenKind::GreaterOrEq => ">=",
      TokenKind::Newline => "<newline>",
      TokenKind::Indent => "<indent>",
      TokenKind::Dedent => "<dedent>",
      TokenKind::Eof => "<eof>",
    }
  }
}

impl<'src> fmt::Display for TokenKind<'src> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TokenKind::Number(value) => write!(f, "Number({value})"),
      TokenKind::Id(value) => write!(f, "Id({})", value.as_ref()),
      TokenKind::Char(value) => write!(f, "Char({value})"),
      TokenKind::String(value) => write!(f, "String({:?})", value.as_ref()),
      other => f.write_str(other.name()),
    }
  }
}

// Raw scanner. Line structure is not visible at this layer: `_Tok_Indent`
// carries a line break plus the next line's leading spaces, and the
// driving pass in `Lexer::lex` turns that into Newline/Indent/Dedent.
#[derive(Clone, Copy, Debug, Logos, PartialEq)]
enum Scan {
  // Keywords
  #[token("class")]
  Kw_Class,
  #[token("return")]
  Kw_Return,
  #[token("if")]
  Kw_If,
  #[token("else")]
  Kw_Else,
  #[token("def")]
  Kw_Def,
  #[token("print")]
  Kw_Print,
  #[token("and")]
  Kw_And,
  #[token("or")]
  Kw_Or,
  #[token("not")]
  Kw_Not,
  #[token("None")]
  Kw_None,
  #[token("True")]
  Kw_True,
  #[token("False")]
  Kw_False,

  // Comparison operators
  #[token("==")]
  Op_EqualEqual,
  #[token("!=")]
  Op_BangEqual,
  #[token("<=")]
  Op_LessEqual,
  #[token(">=")]
  Op_MoreEqual,

  // Literals
  #[regex("[0-9]+")]
  Lit_Int,
  #[regex(r#""([^"\\\n\r]|\\[^\n\r])*""#)]
  #[regex(r#"'([^'\\\n\r]|\\[^\n\r])*'"#)]
  Lit_Str,
  #[regex("[a-zA-Z_][a-zA-Z0-9_]*")]
  Lit_Ident,

  // Everything the parser sees as a bare character
  #[regex(r"[.,()+\-*/:@%$^&;?{}\[\]=!<>]")]
  Tok_Punct,

  #[regex(r"(\r?\n)+[ ]*", priority = 10)]
  _Tok_Indent,
  #[regex(r"[ ]+")]
  _Tok_Whitespace,
  #[regex(r"#[^\n\r]*")]
  _Tok_Comment,

  #[error]
  _Tok_Error,
}

/// Tokenizer and token cursor.
///
/// `lex` materializes the full token stream up front, synthesizing
/// `Newline` after every line that produced a token, `Indent`/`Dedent`
/// in two-space units around every change of indentation, trailing
/// `Dedent`s back to column zero, and a final `Eof`. Blank lines and
/// comment-only lines produce nothing.
pub struct Lexer<'src> {
  tokens: Vec<Token<'src>>,
  cursor: usize,
  eof: Token<'src>,
}

impl<'src> Lexer<'src> {
  pub fn lex(src: &'src str) -> crate::Result<Lexer<'src>> {
    let eof = Token {
      kind: TokenKind::Eof,
      span: Span::empty(src.len()),
    };

    let mut tokens = Vec::new();
    let mut scanner = Scan::lexer(src);
    // Leading spaces of the very first line count toward its indent.
    let mut ws = Some(src.len() - src.trim_start_matches(' ').len());
    let mut level = 0;
    let mut line_open = false;

    while let Some(kind) = scanner.next() {
      let lexeme = scanner.slice();
      let span = Span::from(scanner.span());

      match kind {
        Scan::_Tok_Whitespace | Scan::_Tok_Comment => continue,
        Scan::_Tok_Indent => {
          if line_open {
            tokens.push(Token {
              kind: TokenKind::Newline,
              span: Span::empty(span.start),
            });
            line_open = false;
          }
          ws = Some(measure_indent(lexeme));
        }
        Scan::_Tok_Error => return Err(scan_error(src, span).into()),
        _ => {
          if let Some(width) = ws.take() {
            indentation(&mut tokens, &mut level, width, span.start);
          }
          tokens.push(token(kind, lexeme, span)?);
          line_open = true;
        }
      }
    }

    if line_open {
      tokens.push(Token {
        kind: TokenKind::Newline,
        span: Span::empty(src.len()),
      });
    }
    indentation(&mut tokens, &mut level, 0, src.len());
    tokens.push(eof.clone());

    Ok(Lexer {
      tokens,
      cursor: 0,
      eof,
    })
  }

  /// The full token stream, `Eof` included.
  pub fn tokens(&self) -> &[Token<'src>] {
    &self.tokens
  }

  pub fn current_token(&self) -> &Token<'src> {
    self.tokens.get(self.cursor).unwrap_or(&self.eof)
  }

  /// Advances the cursor and returns the new current token. Advancing
  /// past the end keeps returning `Eof`.
  pub fn next_token(&mut self) -> &Token<'src> {
    if self.cursor < self.tokens.len() {
      self.cursor += 1;
    }
    self.current_token()
  }

  /// Fails unless the current token has the same tag as `kind`.
  /// Payloads are not compared; see [`Lexer::expect_exact`].
  pub fn expect(&self, kind: &TokenKind<'_>) -> crate::Result<&Token<'src>> {
    let token = self.current_token();
    if token.is(kind) {
      return Ok(token);
    }
    Err(LexError::new(format!("expected {}, found {}", kind.name(), token.kind), token.span).into())
  }

  /// Fails unless the current token matches `kind`, payload included.
  pub fn expect_exact(&self, kind: &TokenKind<'_>) -> crate::Result<&Token<'src>> {
    let token = self.current_token();
    if &token.kind == kind {
      return Ok(token);
    }
    Err(LexError::new(format!("expected {}, found {}", kind, token.kind), token.span).into())
  }

  pub fn expect_next(&mut self, kind: &TokenKind<'_>) -> crate::Result<&Token<'src>> {
    self.next_token();
    self.expect(kind)
  }

  pub fn expect_next_exact(&mut self, kind: &TokenKind<'_>) -> crate::Result<&Token<'src>> {
    self.next_token();
    self.expect_exact(kind)
  }

  pub fn expect_id(&self) -> crate::Result<&str> {
    match &self.expect(&TokenKind::Id(Cow::borrowed("")))?.kind {
      TokenKind::Id(id) => Ok(id.as_ref()),
      _ => unreachable!(),
    }
  }

  pub fn expect_number(&self) -> crate::Result<i64> {
    match self.expect(&TokenKind::Number(0))?.kind {
      TokenKind::Number(value) => Ok(value),
      _ => unreachable!(),
    }
  }

  pub fn expect_string(&self) -> crate::Result<&str> {
    match &self.expect(&TokenKind::String(Cow::borrowed("")))?.kind {
      TokenKind::String(value) => Ok(value.as_ref()),
      _ => unreachable!(),
    }
  }
}

impl<'src> fmt::Debug for Lexer<'src> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.tokens.iter().map(|t| &t.kind)).finish()
  }
}

fn token<'src>(kind: Scan, lexeme: &'src str, span: Span) -> crate::Result<Token<'src>> {
  let kind = match kind {
    Scan::Kw_Class => TokenKind::Class,
    Scan::Kw_Return => TokenKind::Return,
    Scan::Kw_If => TokenKind::If,
    Scan::Kw_Else => TokenKind::Else,
    Scan::Kw_Def => TokenKind::Def,
    Scan::Kw_Print => TokenKind::Print,
    Scan::Kw_And => TokenKind::And,
    Scan::Kw_Or => TokenKind::Or,
    Scan::Kw_Not => TokenKind::Not,
    Scan::Kw_None => TokenKind::None,
    Scan::Kw_True => TokenKind::True,
    Scan::Kw_False => TokenKind::False,
    Scan::Op_EqualEqual => TokenKind::Eq,
    Scan::Op_BangEqual => TokenKind::NotEq,
    Scan::Op_LessEqual => TokenKind::LessOrEq,
    Scan::Op_MoreEqual => TokenKind::GreaterOrEq,
    Scan::Lit_Int => match lexeme.parse() {
      Ok(value) => TokenKind::Number(value),
      Err(_) => return Err(LexError::new("number literal out of range", span).into()),
    },
    Scan::Lit_Str => TokenKind::String(unescape(lexeme, span)?),
    Scan::Lit_Ident => TokenKind::Id(Cow::borrowed(lexeme)),
    Scan::Tok_Punct => match lexeme.chars().next() {
      Some(c) => TokenKind::Char(c),
      None => return Err(LexError::new("empty punctuation token", span).into()),
    },
    Scan::_Tok_Indent | Scan::_Tok_Whitespace | Scan::_Tok_Comment | Scan::_Tok_Error => {
      return Err(LexError::new(format!("unexpected character `{lexeme}`"), span).into())
    }
  };
  Ok(Token { kind, span })
}

// The width of the last line in an `_Tok_Indent` lexeme, which looks
// like one or more line breaks followed by zero or more spaces.
fn measure_indent(lexeme: &str) -> usize {
  let pos = lexeme.rfind('\n').unwrap_or(0);
  lexeme.len() - pos - 1
}

// Emits Indent/Dedent tokens for a line at `width` spaces against the
// previous significant line at `level` spaces, in units of two spaces.
// When the growing side is not a multiple of two, nothing is emitted,
// but the recorded level still updates.
fn indentation(tokens: &mut Vec<Token<'_>>, level: &mut usize, width: usize, pos: usize) {
  let span = Span::empty(pos);
  if width > *level && width % 2 == 0 {
    let mut at = width;
    while at > *level {
      tokens.push(Token {
        kind: TokenKind::Indent,
        span,
      });
      at -= 2;
    }
  } else if width < *level && *level % 2 == 0 {
    let mut at = *level;
    while at > width {
      tokens.push(Token {
        kind: TokenKind::Dedent,
        span,
      });
      at -= 2;
    }
  }
  *level = width;
}

fn unescape<'src>(lexeme: &'src str, span: Span) -> Result<Cow<'src, str>, LexError> {
  let body = &lexeme[1..lexeme.len() - 1];
  if !body.contains('\\') {
    return Ok(Cow::borrowed(body));
  }

  let mut out = String::with_capacity(body.len());
  let mut chars = body.chars();
  while let Some(c) = chars.next() {
    if c != '\\' {
      out.push(c);
      continue;
    }
    match chars.next() {
      Some('n') => out.push('\n'),
      Some('t') => out.push('\t'),
      Some('"') => out.push('"'),
      Some('\'') => out.push('\''),
      Some('\\') => out.push('\\'),
      Some(c) => {
        return Err(LexError::new(
          format!("unrecognized escape sequence `\\{c}`"),
          span,
        ))
      }
      None => return Err(LexError::new("unexpected end of string literal", span)),
    }
  }
  Ok(Cow::owned(out))
}

// Scanner failures carry no detail of their own, so look at the source
// to say what actually went wrong.
fn scan_error(src: &str, span: Span) -> LexError {
  let rest = &src[span.start..];
  let mut chars = rest.chars();
  match chars.next() {
    Some(quote @ ('"' | '\'')) => {
      while let Some(c) = chars.next() {
        match c {
          '\n' | '\r' => {
            return LexError::new("unexpected line break inside string literal", span)
          }
          '\\' => match chars.next() {
            None | Some('\n' | '\r') => {
              return LexError::new("unexpected line break inside string literal", span)
            }
            Some('n' | 't' | '"' | '\'' | '\\') => {}
            Some(c) => {
              return LexError::new(format!("unrecognized escape sequence `\\{c}`"), span)
            }
          },
          c if c == quote => return LexError::new("malformed string literal", span),
          _ => {}
        }
      }
      LexError::new("unterminated string literal", span)
    }
    Some(c) => LexError::new(format!("unexpected character `{c}`"), span),
    None => LexError::new("unexpected end of input", span),
  }
}

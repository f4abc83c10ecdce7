//! Lexical analysis of one input line into words and redirection operators.
//!
//! The lexer is a small finite state machine. Bare text, single-quoted spans
//! and double-quoted spans each have their own state with their own escaping
//! rules; a backslash outside quotes moves into a one-character escape state.

use crate::error::ParseError;
use std::fmt;

/// Output redirection operator recognized outside quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Redirect {
    /// `>` or `1>`: write standard output to a file, truncating it.
    Stdout,
    /// `>>` or `1>>`: append standard output to a file.
    StdoutAppend,
    /// `2>`: write standard error to a file, truncating it.
    Stderr,
    /// `2>>`: append standard error to a file.
    StderrAppend,
}

impl Redirect {
    fn new(stream: Stream, append: bool) -> Self {
        match (stream, append) {
            (Stream::Stdout, false) => Redirect::Stdout,
            (Stream::Stdout, true) => Redirect::StdoutAppend,
            (Stream::Stderr, false) => Redirect::Stderr,
            (Stream::Stderr, true) => Redirect::StderrAppend,
        }
    }

    pub fn is_stderr(self) -> bool {
        matches!(self, Redirect::Stderr | Redirect::StderrAppend)
    }

    pub fn is_append(self) -> bool {
        matches!(self, Redirect::StdoutAppend | Redirect::StderrAppend)
    }
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Redirect::Stdout => ">",
            Redirect::StdoutAppend => ">>",
            Redirect::Stderr => "2>",
            Redirect::StderrAppend => "2>>",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Represents a token resulting from lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A word with quotes and escapes already resolved.
    Word(String),
    /// An output redirection operator.
    Redirect(Redirect),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Normal,
    Escape,
    SingleQuoted,
    DoubleQuoted,
    DoubleQuotedEscape,
}

struct LexingFSM<'a> {
    input: &'a str,
    pos: usize,
    state: LexingState,
    buffer: String,
}

impl<'a> LexingFSM<'a> {
    /// Creates a lexer positioned at byte offset `pos` of `input`.
    fn new(input: &'a str, pos: usize) -> Self {
        LexingFSM {
            input,
            pos,
            state: LexingState::Normal,
            buffer: String::new(),
        }
    }

    /// Produces the next token, or `None` once the input is exhausted.
    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        while let Some(ch) = self.peek_char() {
            let token = match self.state {
                LexingState::Normal => self.handle_normal(ch),
                LexingState::Escape => {
                    self.advance(ch);
                    self.buffer.push(ch);
                    self.state = LexingState::Normal;
                    None
                }
                LexingState::SingleQuoted => {
                    self.handle_single_quote(ch);
                    None
                }
                LexingState::DoubleQuoted => {
                    self.handle_double_quote(ch);
                    None
                }
                LexingState::DoubleQuotedEscape => {
                    self.handle_double_quote_escape(ch);
                    None
                }
            };
            if token.is_some() {
                return Ok(token);
            }
        }

        match self.state {
            LexingState::SingleQuoted => return Err(ParseError::UnclosedSingleQuote),
            LexingState::DoubleQuoted | LexingState::DoubleQuotedEscape => {
                return Err(ParseError::UnclosedDoubleQuote);
            }
            // A dangling backslash has nothing to escape and is dropped.
            LexingState::Normal | LexingState::Escape => self.state = LexingState::Normal,
        }

        Ok(self.take_word())
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.pos..].chars().nth(1)
    }

    fn advance(&mut self, ch: char) {
        self.pos += ch.len_utf8();
    }

    fn take_word(&mut self) -> Option<Token> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(Token::Word(std::mem::take(&mut self.buffer)))
        }
    }

    fn handle_normal(&mut self, ch: char) -> Option<Token> {
        match ch {
            c if c.is_whitespace() => {
                self.advance(c);
                self.take_word()
            }
            '\\' => {
                self.advance(ch);
                self.state = LexingState::Escape;
                None
            }
            '\'' => {
                self.advance(ch);
                self.state = LexingState::SingleQuoted;
                None
            }
            '"' => {
                self.advance(ch);
                self.state = LexingState::DoubleQuoted;
                None
            }
            '>' if !self.buffer.is_empty() => {
                // Close the word; the operator is picked up by the next call.
                self.take_word()
            }
            '>' => {
                self.advance(ch);
                Some(self.read_operator(Stream::Stdout))
            }
            '1' | '2' if self.buffer.is_empty() && self.peek_second() == Some('>') => {
                self.advance(ch);
                self.advance('>');
                let stream = if ch == '2' {
                    Stream::Stderr
                } else {
                    Stream::Stdout
                };
                Some(self.read_operator(stream))
            }
            c => {
                self.advance(c);
                self.buffer.push(c);
                None
            }
        }
    }

    /// Called with the first `>` already consumed; folds in a second one.
    fn read_operator(&mut self, stream: Stream) -> Token {
        let append = self.peek_char() == Some('>');
        if append {
            self.advance('>');
        }
        Token::Redirect(Redirect::new(stream, append))
    }

    fn handle_single_quote(&mut self, ch: char) {
        self.advance(ch);
        match ch {
            '\'' => self.state = LexingState::Normal,
            c => self.buffer.push(c),
        }
    }

    fn handle_double_quote(&mut self, ch: char) {
        self.advance(ch);
        match ch {
            '"' => self.state = LexingState::Normal,
            '\\' => self.state = LexingState::DoubleQuotedEscape,
            c => self.buffer.push(c),
        }
    }

    fn handle_double_quote_escape(&mut self, ch: char) {
        self.advance(ch);
        if ch != '"' && ch != '\\' {
            self.buffer.push('\\');
        }
        self.buffer.push(ch);
        self.state = LexingState::DoubleQuoted;
    }
}

/// Reads a single token from `line` starting at byte offset `cursor`.
///
/// Returns the token together with the offset where lexing should resume, or
/// `None` when only whitespace remains. A cursor past the end of `line` or
/// inside a multi-byte character also yields `None`.
pub fn next_token(line: &str, cursor: usize) -> Result<Option<(Token, usize)>, ParseError> {
    if !line.is_char_boundary(cursor) {
        return Ok(None);
    }
    let mut lexer = LexingFSM::new(line, cursor);
    let token = lexer.next_token()?;
    Ok(token.map(|token| (token, lexer.pos)))
}

/// Splits a whole line into tokens.
///
/// Fails without producing any tokens if a quoted span is left open.
pub fn split_into_tokens(line: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut cursor = 0;
    while let Some((token, next)) = next_token(line, cursor)? {
        tokens.push(token);
        cursor = next;
    }
    tracing::trace!(?tokens, "tokenized line");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    fn words(line: &str) -> Vec<String> {
        split_into_tokens(line)
            .unwrap()
            .into_iter()
            .map(|t| match t {
                Token::Word(w) => w,
                other => panic!("unexpected token {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_unquoted_input_splits_on_whitespace_runs() {
        let line = "  ls   -la\t/tmp  foo\n";
        let expected: Vec<String> = line.split_whitespace().map(String::from).collect();
        assert_eq!(words(line), expected);
    }

    #[test]
    fn test_plain_words_round_trip() {
        let original = ["echo", "hello", "world", "a-b_c.d", "/usr/bin"];
        let line = original.join("   ");
        assert_eq!(words(&line).join(" "), original.join(" "));
    }

    #[test]
    fn test_empty_and_blank_lines_have_no_tokens() {
        assert!(split_into_tokens("").unwrap().is_empty());
        assert!(split_into_tokens(" \t \n").unwrap().is_empty());
    }

    #[test]
    fn test_single_quotes_preserve_everything() {
        assert_eq!(words("echo 'hello   world'"), ["echo", "hello   world"]);
        assert_eq!(words(r#"'a\nb "c"'"#), [r#"a\nb "c""#]);
        assert_eq!(words("'a > b'"), ["a > b"]);
    }

    #[test]
    fn test_quotes_concatenate_with_adjacent_text() {
        assert_eq!(words(r#"ab'cd'"ef"gh"#), ["abcdefgh"]);
        assert_eq!(words("'hello''world'"), ["helloworld"]);
    }

    #[test]
    fn test_double_quote_escapes() {
        assert_eq!(words(r#"echo "a\"b\\c\d""#), ["echo", r#"a"b\c\d"#]);
        assert_eq!(words(r#""it's""#), ["it's"]);
        assert_eq!(words(r#""a   b""#), ["a   b"]);
    }

    #[test]
    fn test_backslash_outside_quotes() {
        assert_eq!(words(r"a\ b"), ["a b"]);
        assert_eq!(words(r"\'x\'"), ["'x'"]);
        assert_eq!(words(r#"\"quoted\""#), [r#""quoted""#]);
        assert_eq!(words(r"x\\y"), [r"x\y"]);
        assert_eq!(words(r"a\>b"), ["a>b"]);
        assert_eq!(words(r"trailing\"), ["trailing"]);
    }

    #[test]
    fn test_empty_quotes_produce_no_word() {
        assert_eq!(words("echo '' \"\" x"), ["echo", "x"]);
    }

    #[test]
    fn test_unclosed_quotes() {
        assert_eq!(
            split_into_tokens("echo 'abc\n"),
            Err(ParseError::UnclosedSingleQuote)
        );
        assert_eq!(
            split_into_tokens("echo \"abc"),
            Err(ParseError::UnclosedDoubleQuote)
        );
        assert_eq!(
            split_into_tokens("echo \"abc\\"),
            Err(ParseError::UnclosedDoubleQuote)
        );
    }

    #[test]
    fn test_redirect_operators() {
        use Redirect::*;
        let cases = [
            ("a > f", Stdout),
            ("a >> f", StdoutAppend),
            ("a 1> f", Stdout),
            ("a 1>> f", StdoutAppend),
            ("a 2> f", Stderr),
            ("a 2>> f", StderrAppend),
        ];
        for (line, op) in cases {
            assert_eq!(
                split_into_tokens(line).unwrap(),
                vec![word("a"), Token::Redirect(op), word("f")],
                "line {line:?}"
            );
        }
    }

    #[test]
    fn test_operator_splits_adjacent_words() {
        assert_eq!(
            split_into_tokens("echo hi>out.txt").unwrap(),
            vec![
                word("echo"),
                word("hi"),
                Token::Redirect(Redirect::Stdout),
                word("out.txt")
            ]
        );
        assert_eq!(
            split_into_tokens("cmd 2>>err.log").unwrap(),
            vec![
                word("cmd"),
                Token::Redirect(Redirect::StderrAppend),
                word("err.log")
            ]
        );
    }

    #[test]
    fn test_digit_inside_word_is_not_a_descriptor() {
        assert_eq!(
            split_into_tokens("foo2>bar").unwrap(),
            vec![word("foo2"), Token::Redirect(Redirect::Stdout), word("bar")]
        );
        assert_eq!(
            split_into_tokens("foo1>>bar").unwrap(),
            vec![
                word("foo1"),
                Token::Redirect(Redirect::StdoutAppend),
                word("bar")
            ]
        );
        assert_eq!(
            split_into_tokens("12>x").unwrap(),
            vec![word("12"), Token::Redirect(Redirect::Stdout), word("x")]
        );
    }

    #[test]
    fn test_lone_digits_stay_words() {
        assert_eq!(words("echo 1 2 3"), ["echo", "1", "2", "3"]);
    }

    #[test]
    fn test_quoted_operators_are_words() {
        assert_eq!(words(r#"echo ">" '2>>'"#), ["echo", ">", "2>>"]);
    }

    #[test]
    fn test_triple_angle_is_two_operators() {
        assert_eq!(
            split_into_tokens(">>>").unwrap(),
            vec![
                Token::Redirect(Redirect::StdoutAppend),
                Token::Redirect(Redirect::Stdout)
            ]
        );
    }

    #[test]
    fn test_next_token_reports_resume_offset() {
        let line = "ab>c";
        let (first, cursor) = next_token(line, 0).unwrap().unwrap();
        assert_eq!(first, word("ab"));
        assert_eq!(cursor, 2);
        let (second, cursor) = next_token(line, cursor).unwrap().unwrap();
        assert_eq!(second, Token::Redirect(Redirect::Stdout));
        let (third, cursor) = next_token(line, cursor).unwrap().unwrap();
        assert_eq!(third, word("c"));
        assert_eq!(next_token(line, cursor).unwrap(), None);
    }

    #[test]
    fn test_next_token_out_of_range_cursor() {
        assert_eq!(next_token("echo", 4).unwrap(), None);
        assert_eq!(next_token("echo", 10).unwrap(), None);
        // inside the two-byte 'é'
        assert_eq!(next_token("é x", 1).unwrap(), None);
    }

    #[test]
    fn test_non_ascii_words() {
        assert_eq!(words("echo héllo 'wörld'"), ["echo", "héllo", "wörld"]);
    }

    #[test]
    fn test_redirect_display() {
        assert_eq!(Redirect::Stdout.to_string(), ">");
        assert_eq!(Redirect::StderrAppend.to_string(), "2>>");
    }
}

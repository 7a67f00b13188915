// SQL Lexer Implementation
//
// This module implements a lexer for SQL that tokenizes input queries.

use std::collections::HashMap;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use once_cell::sync::Lazy;

/// SQL Token types
#[derive(Debug, PartialEq, Clone)]
pub enum TokenType {
    // Keywords
    SELECT,
    FROM,
    WHERE,
    INSERT,
    INTO,
    VALUES,
    CREATE,
    TABLE,
    DROP,
    IF,
    EXISTS,
    JOIN,
    INNER,
    LEFT,
    OUTER,
    CROSS,
    ON,
    GROUP,
    BY,
    HAVING,
    ORDER,
    ASC,
    DESC,
    LIMIT,
    OFFSET,
    AS,
    AND,
    OR,
    NOT,
    IS,
    NULL,
    TRUE,
    FALSE,
    PRIMARY,
    KEY,
    CASE,
    WHEN,
    THEN,
    ELSE,
    END,

    // Literals
    STRING(String),
    INTEGER(i64),
    FLOAT(f64),

    // Identifiers
    IDENTIFIER(String),

    // Operators
    EQ,             // =
    NotEq,          // <> or !=
    LT,             // <
    GT,             // >
    LtEq,           // <=
    GtEq,           // >=
    PLUS,           // +
    MINUS,          // -
    ASTERISK,       // *
    SLASH,          // /
    PERCENT,        // %

    // Punctuation
    SEMICOLON,      // ;
    COMMA,          // ,
    LPAREN,         // (
    RPAREN,         // )
    DOT,            // .

    // Special
    EOF,
    ILLEGAL(String),
}

static KEYWORDS: Lazy<HashMap<&'static str, TokenType>> = Lazy::new(|| {
    HashMap::from([
        ("SELECT", TokenType::SELECT),
        ("FROM", TokenType::FROM),
        ("WHERE", TokenType::WHERE),
        ("INSERT", TokenType::INSERT),
        ("INTO", TokenType::INTO),
        ("VALUES", TokenType::VALUES),
        ("CREATE", TokenType::CREATE),
        ("TABLE", TokenType::TABLE),
        ("DROP", TokenType::DROP),
        ("IF", TokenType::IF),
        ("EXISTS", TokenType::EXISTS),
        ("JOIN", TokenType::JOIN),
        ("INNER", TokenType::INNER),
        ("LEFT", TokenType::LEFT),
        ("OUTER", TokenType::OUTER),
        ("CROSS", TokenType::CROSS),
        ("ON", TokenType::ON),
        ("GROUP", TokenType::GROUP),
        ("BY", TokenType::BY),
        ("HAVING", TokenType::HAVING),
        ("ORDER", TokenType::ORDER),
        ("ASC", TokenType::ASC),
        ("DESC", TokenType::DESC),
        ("LIMIT", TokenType::LIMIT),
        ("OFFSET", TokenType::OFFSET),
        ("AS", TokenType::AS),
        ("AND", TokenType::AND),
        ("OR", TokenType::OR),
        ("NOT", TokenType::NOT),
        ("IS", TokenType::IS),
        ("NULL", TokenType::NULL),
        ("TRUE", TokenType::TRUE),
        ("FALSE", TokenType::FALSE),
        ("PRIMARY", TokenType::PRIMARY),
        ("KEY", TokenType::KEY),
        ("CASE", TokenType::CASE),
        ("WHEN", TokenType::WHEN),
        ("THEN", TokenType::THEN),
        ("ELSE", TokenType::ELSE),
        ("END", TokenType::END),
    ])
});

/// A Token represents a lexical unit in the SQL query
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub literal: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.token_type == TokenType::EOF {
            write!(f, "end of input")
        } else {
            write!(f, "'{}' at line {}, column {}", self.literal, self.line, self.column)
        }
    }
}

/// SQL Lexer for breaking a query string into tokens
pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
    ch: Option<char>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer from a SQL query string
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer {
            input: input.chars().peekable(),
            line: 1,
            column: 0,
            ch: None,
        };
        lexer.read_char();
        lexer
    }

    /// Tokenize the whole input, ending with an EOF token
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.token_type == TokenType::EOF;
            tokens.push(token);
            if is_eof {
                return tokens;
            }
        }
    }

    /// Read the next character from the input
    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.next();
        self.ch = ch;

        if let Some(c) = ch {
            self.column += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            }
        }

        ch
    }

    /// Peek at the next character without advancing
    fn peek_char(&mut self) -> Option<char> {
        self.input.peek().copied()
    }

    /// Skip whitespace and `--` line comments
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.ch {
            if ch.is_whitespace() {
                self.read_char();
            } else if ch == '-' && self.peek_char() == Some('-') {
                while let Some(c) = self.ch {
                    if c == '\n' {
                        break;
                    }
                    self.read_char();
                }
            } else {
                break;
            }
        }
    }

    /// Read an identifier or keyword; leaves `ch` on the character after it
    fn read_identifier(&mut self) -> String {
        let mut identifier = String::new();

        while let Some(ch) = self.ch {
            if is_letter(ch) || ch.is_ascii_digit() {
                identifier.push(ch);
                self.read_char();
            } else {
                break;
            }
        }

        identifier
    }

    /// Read a number (integer or float); leaves `ch` on the character after it
    fn read_number(&mut self) -> String {
        let mut number = String::new();
        let mut has_dot = false;

        while let Some(ch) = self.ch {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.read_char();
            } else if ch == '.' && !has_dot && self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                has_dot = true;
                number.push(ch);
                self.read_char();
            } else {
                break;
            }
        }

        number
    }

    /// Read text enclosed in `quote`, where a doubled quote stands for one.
    /// Returns None when the closing quote is missing.
    fn read_quoted(&mut self, quote: char) -> Option<String> {
        let mut text = String::new();

        // Skip opening quote which is in self.ch
        self.read_char();

        while let Some(ch) = self.ch {
            if ch == quote {
                if self.peek_char() == Some(quote) {
                    text.push(quote);
                    self.read_char();
                    self.read_char();
                    continue;
                }
                // Skip closing quote
                self.read_char();
                return Some(text);
            }
            text.push(ch);
            self.read_char();
        }

        None
    }

    /// Get the token type for an identifier (could be a keyword)
    fn lookup_identifier(&self, ident: &str) -> TokenType {
        KEYWORDS
            .get(ident.to_uppercase().as_str())
            .cloned()
            .unwrap_or_else(|| TokenType::IDENTIFIER(ident.to_string()))
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let mut token = Token {
            token_type: TokenType::EOF,
            literal: String::new(),
            line: self.line,
            column: self.column,
        };

        let ch = match self.ch {
            Some(ch) => ch,
            None => return token,
        };
        token.literal = ch.to_string();

        match ch {
            ';' => token.token_type = TokenType::SEMICOLON,
            ',' => token.token_type = TokenType::COMMA,
            '(' => token.token_type = TokenType::LPAREN,
            ')' => token.token_type = TokenType::RPAREN,
            '.' => token.token_type = TokenType::DOT,
            '+' => token.token_type = TokenType::PLUS,
            '-' => token.token_type = TokenType::MINUS,
            '*' => token.token_type = TokenType::ASTERISK,
            '/' => token.token_type = TokenType::SLASH,
            '%' => token.token_type = TokenType::PERCENT,
            '=' => token.token_type = TokenType::EQ,
            '<' => match self.peek_char() {
                Some('=') => {
                    self.read_char();
                    token.literal.push('=');
                    token.token_type = TokenType::LtEq;
                }
                Some('>') => {
                    self.read_char();
                    token.literal.push('>');
                    token.token_type = TokenType::NotEq;
                }
                _ => token.token_type = TokenType::LT,
            },
            '>' => {
                if self.peek_char() == Some('=') {
                    self.read_char();
                    token.literal.push('=');
                    token.token_type = TokenType::GtEq;
                } else {
                    token.token_type = TokenType::GT;
                }
            }
            '!' => {
                if self.peek_char() == Some('=') {
                    self.read_char();
                    token.literal.push('=');
                    token.token_type = TokenType::NotEq;
                } else {
                    token.token_type = TokenType::ILLEGAL(ch.to_string());
                }
            }
            '\'' => {
                // read_quoted leaves ch past the closing quote
                match self.read_quoted('\'') {
                    Some(value) => {
                        token.literal = format!("'{}'", value);
                        token.token_type = TokenType::STRING(value);
                    }
                    None => token.token_type = TokenType::ILLEGAL("unterminated string".to_string()),
                }
                return token;
            }
            '"' => {
                // Quoted identifiers are never keywords
                match self.read_quoted('"') {
                    Some(name) => {
                        token.literal = name.clone();
                        token.token_type = TokenType::IDENTIFIER(name);
                    }
                    None => token.token_type = TokenType::ILLEGAL("unterminated identifier".to_string()),
                }
                return token;
            }
            _ if is_letter(ch) => {
                let identifier = self.read_identifier();
                token.token_type = self.lookup_identifier(&identifier);
                token.literal = identifier;
                return token;
            }
            _ if ch.is_ascii_digit() => {
                let number = self.read_number();
                token.token_type = if number.contains('.') {
                    number
                        .parse::<f64>()
                        .map(TokenType::FLOAT)
                        .unwrap_or_else(|_| TokenType::ILLEGAL(number.clone()))
                } else {
                    number
                        .parse::<i64>()
                        .map(TokenType::INTEGER)
                        .unwrap_or_else(|_| TokenType::ILLEGAL(number.clone()))
                };
                token.literal = number;
                return token;
            }
            _ => token.token_type = TokenType::ILLEGAL(ch.to_string()),
        }

        self.read_char();
        token
    }
}

/// Check if a character can start an identifier
fn is_letter(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

//! 内存执行器的词法分析
//!
//! 只覆盖引擎会生成的 MySQL 语句子集：反引号标识符、单/双引号字符串
//! （支持反斜杠转义和重复引号）、数字、比较操作符和少量标点

use crate::executor::DriverError;

/// 词法单元
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    /// 裸单词，关键字按大小写不敏感比较
    Word(String),
    /// 反引号包裹的标识符
    Quoted(String),
    /// 字符串字面量（已反转义）
    Str(String),
    /// 数字字面量原文
    Number(String),
    /// 比较操作符
    Op(String),
    LeftParen,
    RightParen,
    Comma,
    Dot,
    Star,
    Semicolon,
    Eof,
}

impl Token {
    /// 是否为指定关键字
    pub(crate) fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(word) if word.eq_ignore_ascii_case(keyword))
    }
}

/// 把语句文本切分为词法单元
pub(crate) struct Scanner<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    /// 扫描全部词法单元，末尾总是 `Eof`
    pub(crate) fn scan_tokens(&mut self) -> Result<Vec<Token>, DriverError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan_token()?;
            let is_eof = token == Token::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn scan_token(&mut self) -> Result<Token, DriverError> {
        self.skip_whitespace();

        let Some((pos, c)) = self.advance() else {
            return Ok(Token::Eof);
        };

        match c {
            '(' => Ok(Token::LeftParen),
            ')' => Ok(Token::RightParen),
            ',' => Ok(Token::Comma),
            '.' => Ok(Token::Dot),
            '*' => Ok(Token::Star),
            ';' => Ok(Token::Semicolon),
            '=' => Ok(Token::Op("=".to_string())),
            '!' => {
                if self.match_char('=') {
                    Ok(Token::Op("<>".to_string()))
                } else {
                    Err(self.syntax_error(pos))
                }
            }
            '<' => {
                if self.match_char('>') {
                    Ok(Token::Op("<>".to_string()))
                } else if self.match_char('=') {
                    Ok(Token::Op("<=".to_string()))
                } else {
                    Ok(Token::Op("<".to_string()))
                }
            }
            '>' => {
                if self.match_char('=') {
                    Ok(Token::Op(">=".to_string()))
                } else {
                    Ok(Token::Op(">".to_string()))
                }
            }
            '`' => self.scan_quoted_identifier(pos),
            '\'' | '"' => self.scan_string(c, pos),
            '-' if self.peek().is_some_and(|n| n.is_ascii_digit()) => Ok(self.scan_number(c)),
            c if c.is_ascii_digit() => Ok(self.scan_number(c)),
            c if c.is_alphabetic() || c == '_' => Ok(self.scan_word(c)),
            _ => Err(self.syntax_error(pos)),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn scan_quoted_identifier(&mut self, start: usize) -> Result<Token, DriverError> {
        let mut name = String::new();
        loop {
            match self.advance() {
                Some((_, '`')) => {
                    // 两个连续反引号表示一个字面反引号
                    if self.match_char('`') {
                        name.push('`');
                    } else {
                        return Ok(Token::Quoted(name));
                    }
                }
                Some((_, ch)) => name.push(ch),
                None => return Err(self.syntax_error(start)),
            }
        }
    }

    fn scan_string(&mut self, quote: char, start: usize) -> Result<Token, DriverError> {
        let mut value = String::new();
        loop {
            match self.advance() {
                Some((_, '\\')) => match self.advance() {
                    Some((_, escaped)) => match escaped {
                        '0' => value.push('\0'),
                        'n' => value.push('\n'),
                        'r' => value.push('\r'),
                        't' => value.push('\t'),
                        'Z' => value.push('\x1a'),
                        // LIKE 通配符的转义保持原样，由匹配阶段处理
                        '%' | '_' => {
                            value.push('\\');
                            value.push(escaped);
                        }
                        other => value.push(other),
                    },
                    None => return Err(self.syntax_error(start)),
                },
                Some((_, ch)) if ch == quote => {
                    if self.match_char(quote) {
                        value.push(quote);
                    } else {
                        return Ok(Token::Str(value));
                    }
                }
                Some((_, ch)) => value.push(ch),
                None => return Err(self.syntax_error(start)),
            }
        }
    }

    fn scan_number(&mut self, first: char) -> Token {
        let mut text = String::from(first);
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        Token::Number(text)
    }

    fn scan_word(&mut self, first: char) -> Token {
        let mut word = String::from(first);
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.advance();
            } else {
                break;
            }
        }
        Token::Word(word)
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn syntax_error(&self, pos: usize) -> DriverError {
        let near: String = self.source[pos..].chars().take(40).collect();
        DriverError::new(format!(
            "You have an error in your SQL syntax near '{}'",
            near
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Vec<Token> {
        Scanner::new(source).scan_tokens().unwrap()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            scan("select * from `users` as `User` where `User`.`id` <= '2'"),
            vec![
                Token::Word("select".to_string()),
                Token::Star,
                Token::Word("from".to_string()),
                Token::Quoted("users".to_string()),
                Token::Word("as".to_string()),
                Token::Quoted("User".to_string()),
                Token::Word("where".to_string()),
                Token::Quoted("User".to_string()),
                Token::Dot,
                Token::Quoted("id".to_string()),
                Token::Op("<=".to_string()),
                Token::Str("2".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            scan(r"'O\'Brien' 'it''s' 'a\\b' '50\%'"),
            vec![
                Token::Str("O'Brien".to_string()),
                Token::Str("it's".to_string()),
                Token::Str("a\\b".to_string()),
                Token::Str("50\\%".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_operators_and_numbers() {
        assert_eq!(
            scan("!= <> >= -5 1.5"),
            vec![
                Token::Op("<>".to_string()),
                Token::Op("<>".to_string()),
                Token::Op(">=".to_string()),
                Token::Number("-5".to_string()),
                Token::Number("1.5".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string_is_error() {
        assert!(Scanner::new("select 'abc").scan_tokens().is_err());
    }
}

//! 内存执行器的语句解析
//!
//! 递归下降解析器，产出 `Statement`。条件表达式的优先级从低到高为
//! `or`、`and`、`not`、比较/括号

use super::lexer::{Scanner, Token};
use crate::executor::DriverError;

/// 列引用，可带表别名限定
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ColumnRef {
    pub qualifier: Option<String>,
    pub name: String,
}

/// 字面量
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Literal {
    Null,
    Str(String),
    Number(String),
}

/// 操作数
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    Column(ColumnRef),
    Literal(Literal),
}

/// 比较操作符
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Like,
    NotLike,
}

/// 条件表达式
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    In {
        operand: Operand,
        list: Vec<Literal>,
        negated: bool,
    },
    IsNull {
        operand: Operand,
        negated: bool,
    },
    /// 单独的操作数，按真值解释（例如 `where 1`）
    Value(Operand),
}

/// 选择列表
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Projection {
    All,
    Columns(Vec<ColumnRef>),
    Count {
        column: Option<ColumnRef>,
        label: String,
    },
}

/// 排序项
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrderItem {
    pub column: ColumnRef,
    pub descending: bool,
}

/// 查询语句
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Select {
    pub projection: Projection,
    pub table: String,
    pub alias: Option<String>,
    pub filter: Option<Expr>,
    pub order_by: Vec<OrderItem>,
    pub limit: Option<(u64, u64)>,
}

/// 支持的语句
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Statement {
    Describe {
        table: String,
    },
    Select(Select),
    Insert {
        table: String,
        columns: Vec<String>,
        values: Vec<Literal>,
    },
    Update {
        table: String,
        assignments: Vec<(String, Literal)>,
        filter: Option<Expr>,
        limit: Option<u64>,
    },
    Delete {
        table: String,
        filter: Option<Expr>,
        limit: Option<u64>,
    },
    Truncate {
        table: String,
    },
}

/// 解析一条语句
pub(crate) fn parse(sql: &str) -> Result<Statement, DriverError> {
    let tokens = Scanner::new(sql).scan_tokens()?;
    let mut parser = Parser { tokens, pos: 0 };
    let statement = parser.statement()?;
    parser.match_token(&Token::Semicolon);
    if parser.peek() != &Token::Eof {
        return Err(parser.error());
    }
    Ok(statement)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn statement(&mut self) -> Result<Statement, DriverError> {
        if self.match_keyword("describe") || self.match_keyword("desc") {
            let table = self.identifier()?;
            return Ok(Statement::Describe { table });
        }
        if self.match_keyword("select") {
            return self.select().map(Statement::Select);
        }
        if self.match_keyword("insert") {
            self.expect_keyword("into")?;
            return self.insert();
        }
        if self.match_keyword("update") {
            return self.update();
        }
        if self.match_keyword("delete") {
            self.expect_keyword("from")?;
            let table = self.identifier()?;
            let filter = self.where_clause()?;
            let limit = self.single_limit()?;
            return Ok(Statement::Delete { table, filter, limit });
        }
        if self.match_keyword("truncate") {
            self.match_keyword("table");
            let table = self.identifier()?;
            return Ok(Statement::Truncate { table });
        }
        Err(self.error())
    }

    fn select(&mut self) -> Result<Select, DriverError> {
        let projection = self.projection()?;
        self.expect_keyword("from")?;
        let table = self.identifier()?;
        let alias = if self.match_keyword("as") {
            Some(self.identifier()?)
        } else {
            None
        };
        let filter = self.where_clause()?;

        let mut order_by = Vec::new();
        if self.match_keyword("order") {
            self.expect_keyword("by")?;
            loop {
                let column = self.column_ref()?;
                let descending = if self.match_keyword("desc") {
                    true
                } else {
                    self.match_keyword("asc");
                    false
                };
                order_by.push(OrderItem { column, descending });
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }

        let limit = if self.match_keyword("limit") {
            let first = self.unsigned()?;
            if self.match_token(&Token::Comma) {
                Some((first, self.unsigned()?))
            } else if self.match_keyword("offset") {
                Some((self.unsigned()?, first))
            } else {
                Some((0, first))
            }
        } else {
            None
        };

        Ok(Select {
            projection,
            table,
            alias,
            filter,
            order_by,
            limit,
        })
    }

    fn projection(&mut self) -> Result<Projection, DriverError> {
        if self.match_token(&Token::Star) {
            return Ok(Projection::All);
        }
        if self.peek().is_keyword("count") && self.peek_at(1) == &Token::LeftParen {
            self.advance();
            self.advance();
            let column = if self.match_token(&Token::Star) {
                None
            } else {
                Some(self.column_ref()?)
            };
            self.expect(&Token::RightParen)?;
            let label = if self.match_keyword("as") {
                self.identifier()?
            } else {
                match &column {
                    Some(c) => format!("count(`{}`)", c.name),
                    None => "count(*)".to_string(),
                }
            };
            return Ok(Projection::Count { column, label });
        }

        let mut columns = vec![self.column_ref()?];
        while self.match_token(&Token::Comma) {
            columns.push(self.column_ref()?);
        }
        Ok(Projection::Columns(columns))
    }

    fn insert(&mut self) -> Result<Statement, DriverError> {
        let table = self.identifier()?;
        self.expect(&Token::LeftParen)?;
        // `()` 列表合法，所有列取默认值
        let mut columns = Vec::new();
        if !self.match_token(&Token::RightParen) {
            columns.push(self.identifier()?);
            while self.match_token(&Token::Comma) {
                columns.push(self.identifier()?);
            }
            self.expect(&Token::RightParen)?;
        }
        if !(self.match_keyword("values") || self.match_keyword("value")) {
            return Err(self.error());
        }
        self.expect(&Token::LeftParen)?;
        let mut values = Vec::new();
        if !self.match_token(&Token::RightParen) {
            values.push(self.literal()?);
            while self.match_token(&Token::Comma) {
                values.push(self.literal()?);
            }
            self.expect(&Token::RightParen)?;
        }
        Ok(Statement::Insert {
            table,
            columns,
            values,
        })
    }

    fn update(&mut self) -> Result<Statement, DriverError> {
        let table = self.identifier()?;
        self.expect_keyword("set")?;
        let mut assignments = Vec::new();
        loop {
            let column = self.column_ref()?;
            self.expect(&Token::Op("=".to_string()))?;
            let value = self.literal()?;
            assignments.push((column.name, value));
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        let filter = self.where_clause()?;
        let limit = self.single_limit()?;
        Ok(Statement::Update {
            table,
            assignments,
            filter,
            limit,
        })
    }

    fn where_clause(&mut self) -> Result<Option<Expr>, DriverError> {
        if self.match_keyword("where") {
            Ok(Some(self.or_expr()?))
        } else {
            Ok(None)
        }
    }

    fn single_limit(&mut self) -> Result<Option<u64>, DriverError> {
        if self.match_keyword("limit") {
            Ok(Some(self.unsigned()?))
        } else {
            Ok(None)
        }
    }

    fn or_expr(&mut self) -> Result<Expr, DriverError> {
        let mut expr = self.and_expr()?;
        while self.match_keyword("or") {
            let right = self.and_expr()?;
            expr = Expr::Or(Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn and_expr(&mut self) -> Result<Expr, DriverError> {
        let mut expr = self.not_expr()?;
        while self.match_keyword("and") {
            let right = self.not_expr()?;
            expr = Expr::And(Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn not_expr(&mut self) -> Result<Expr, DriverError> {
        if self.match_keyword("not") {
            return Ok(Expr::Not(Box::new(self.not_expr()?)));
        }
        self.predicate()
    }

    fn predicate(&mut self) -> Result<Expr, DriverError> {
        if self.match_token(&Token::LeftParen) {
            let expr = self.or_expr()?;
            self.expect(&Token::RightParen)?;
            return Ok(expr);
        }

        let left = self.operand()?;

        if let Token::Op(op) = self.peek().clone() {
            self.advance();
            let op = match op.as_str() {
                "=" => CompareOp::Eq,
                "<>" => CompareOp::Ne,
                "<" => CompareOp::Lt,
                ">" => CompareOp::Gt,
                "<=" => CompareOp::Le,
                ">=" => CompareOp::Ge,
                _ => return Err(self.error()),
            };
            let right = self.operand()?;
            return Ok(Expr::Compare { left, op, right });
        }

        let negated = self.match_keyword("not");
        if self.match_keyword("like") {
            let right = self.operand()?;
            let op = if negated { CompareOp::NotLike } else { CompareOp::Like };
            return Ok(Expr::Compare { left, op, right });
        }
        if self.match_keyword("in") {
            self.expect(&Token::LeftParen)?;
            let mut list = vec![self.literal()?];
            while self.match_token(&Token::Comma) {
                list.push(self.literal()?);
            }
            self.expect(&Token::RightParen)?;
            return Ok(Expr::In {
                operand: left,
                list,
                negated,
            });
        }
        if negated {
            return Err(self.error());
        }
        if self.match_keyword("is") {
            let negated = self.match_keyword("not");
            self.expect_keyword("null")?;
            return Ok(Expr::IsNull {
                operand: left,
                negated,
            });
        }

        Ok(Expr::Value(left))
    }

    fn operand(&mut self) -> Result<Operand, DriverError> {
        match self.peek() {
            Token::Str(_) | Token::Number(_) => Ok(Operand::Literal(self.literal()?)),
            Token::Word(word)
                if ["null", "true", "false"]
                    .iter()
                    .any(|k| word.eq_ignore_ascii_case(k)) =>
            {
                Ok(Operand::Literal(self.literal()?))
            }
            _ => Ok(Operand::Column(self.column_ref()?)),
        }
    }

    fn literal(&mut self) -> Result<Literal, DriverError> {
        let literal = match self.peek() {
            Token::Str(s) => Literal::Str(s.clone()),
            Token::Number(n) => Literal::Number(n.clone()),
            token if token.is_keyword("null") => Literal::Null,
            token if token.is_keyword("true") => Literal::Number("1".to_string()),
            token if token.is_keyword("false") => Literal::Number("0".to_string()),
            _ => return Err(self.error()),
        };
        self.advance();
        Ok(literal)
    }

    fn column_ref(&mut self) -> Result<ColumnRef, DriverError> {
        let first = self.identifier()?;
        if self.match_token(&Token::Dot) {
            let name = self.identifier()?;
            Ok(ColumnRef {
                qualifier: Some(first),
                name,
            })
        } else {
            Ok(ColumnRef {
                qualifier: None,
                name: first,
            })
        }
    }

    fn identifier(&mut self) -> Result<String, DriverError> {
        let name = match self.peek() {
            Token::Quoted(name) | Token::Word(name) => name.clone(),
            _ => return Err(self.error()),
        };
        self.advance();
        Ok(name)
    }

    fn unsigned(&mut self) -> Result<u64, DriverError> {
        let value = match self.peek() {
            Token::Number(n) => n.parse().map_err(|_| self.error())?,
            _ => return Err(self.error()),
        };
        self.advance();
        Ok(value)
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.pos + offset)
            .unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn match_token(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_keyword(&mut self, keyword: &str) -> bool {
        if self.peek().is_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), DriverError> {
        if self.match_token(token) {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), DriverError> {
        if self.match_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn error(&self) -> DriverError {
        DriverError::new(format!(
            "You have an error in your SQL syntax near {:?}",
            self.peek()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(qualifier: &str, name: &str) -> ColumnRef {
        ColumnRef {
            qualifier: Some(qualifier.to_string()),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_parse_select() {
        let statement = parse(
            "select `User`.`id`,`User`.`name` from `users` as `User` where `User`.`name` = 'Bob' or `User`.`id` = '2' order by `User`.`id` desc limit 1, 1",
        )
        .unwrap();

        let Statement::Select(select) = statement else {
            panic!("应解析为查询语句");
        };
        assert_eq!(
            select.projection,
            Projection::Columns(vec![column("User", "id"), column("User", "name")])
        );
        assert_eq!(select.table, "users");
        assert_eq!(select.alias.as_deref(), Some("User"));
        assert!(matches!(select.filter, Some(Expr::Or(_, _))));
        assert_eq!(select.order_by, vec![OrderItem { column: column("User", "id"), descending: true }]);
        assert_eq!(select.limit, Some((1, 1)));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let Statement::Select(select) =
            parse("select * from `t` where `a` = '1' or `b` = '2' and `c` = '3'").unwrap()
        else {
            panic!("应解析为查询语句");
        };
        match select.filter {
            Some(Expr::Or(_, right)) => assert!(matches!(*right, Expr::And(_, _))),
            other => panic!("意外的表达式: {:?}", other),
        }
    }

    #[test]
    fn test_parse_count_and_in() {
        let Statement::Select(select) =
            parse("select count(*) as `row_count` from `users` where `id` in ('1', '2')").unwrap()
        else {
            panic!("应解析为查询语句");
        };
        assert_eq!(
            select.projection,
            Projection::Count { column: None, label: "row_count".to_string() }
        );
        assert!(matches!(select.filter, Some(Expr::In { negated: false, .. })));
    }

    #[test]
    fn test_parse_mutations() {
        assert_eq!(
            parse("insert into `users` (`name`, `joined`) values ('Bob', 5)").unwrap(),
            Statement::Insert {
                table: "users".to_string(),
                columns: vec!["name".to_string(), "joined".to_string()],
                values: vec![Literal::Str("Bob".to_string()), Literal::Number("5".to_string())],
            }
        );
        assert_eq!(
            parse("insert into `tags` () values ()").unwrap(),
            Statement::Insert {
                table: "tags".to_string(),
                columns: Vec::new(),
                values: Vec::new(),
            }
        );
        assert!(matches!(
            parse("update `users` set `name` = 'Jim', `password` = NULL where `id` = '2' limit 1").unwrap(),
            Statement::Update { limit: Some(1), .. }
        ));
        assert!(matches!(
            parse("delete from `users` where `id` = '2' limit 1;").unwrap(),
            Statement::Delete { limit: Some(1), .. }
        ));
        assert_eq!(
            parse("describe `users`").unwrap(),
            Statement::Describe { table: "users".to_string() }
        );
    }

    #[test]
    fn test_trailing_garbage_is_error() {
        assert!(parse("select * from `users` nonsense here").is_err());
        assert!(parse("drop table `users`").is_err());
    }
}

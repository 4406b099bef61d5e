use crate::sql::ast::{ColumnDef, CreateIndex, CreateTable, DropIndex, DropTable, Statement};
use crate::sql::lexer::{lex, Keyword, Symbol, Token, TokenKind};
use crate::types::error::{DbError, Result};
use crate::types::value::DataType;

/// Parse a line of input into its statements. Statements are separated by
/// semicolons; a trailing semicolon is optional.
pub fn parse(sql: &str) -> Result<Vec<Statement>> {
    let tokens = lex(sql)?;
    let mut stream = TokenStream::new(tokens);
    let mut statements = Vec::new();

    while !stream.is_eof() {
        if stream.consume_symbol(Symbol::Semicolon) {
            continue;
        }
        statements.push(parse_statement(&mut stream)?);
        if !stream.is_eof() {
            stream.expect_symbol(Symbol::Semicolon)?;
        }
    }

    Ok(statements)
}

fn parse_statement(stream: &mut TokenStream) -> Result<Statement> {
    if stream.consume_keyword(Keyword::Create) {
        if stream.consume_keyword(Keyword::Table) {
            parse_create_table(stream).map(Statement::CreateTable)
        } else if stream.consume_keyword(Keyword::Index) {
            parse_create_index(stream).map(Statement::CreateIndex)
        } else {
            Err(stream.unexpected("expected TABLE or INDEX after CREATE"))
        }
    } else if stream.consume_keyword(Keyword::Drop) {
        if stream.consume_keyword(Keyword::Table) {
            let table = stream.expect_identifier()?;
            Ok(Statement::DropTable(DropTable { table }))
        } else if stream.consume_keyword(Keyword::Index) {
            let index = stream.expect_identifier()?;
            stream.expect_keyword(Keyword::On)?;
            let table = stream.expect_identifier()?;
            Ok(Statement::DropIndex(DropIndex { index, table }))
        } else {
            Err(stream.unexpected("expected TABLE or INDEX after DROP"))
        }
    } else if stream.consume_keyword(Keyword::Show) {
        if stream.consume_keyword(Keyword::Tables) {
            Ok(Statement::ShowTables)
        } else if stream.consume_keyword(Keyword::Columns) {
            stream.expect_keyword(Keyword::From)?;
            let table = stream.expect_identifier()?;
            Ok(Statement::ShowColumns { table })
        } else if stream.consume_keyword(Keyword::Index) {
            stream.expect_keyword(Keyword::From)?;
            let table = stream.expect_identifier()?;
            Ok(Statement::ShowIndex { table })
        } else {
            Err(stream.unexpected("expected TABLES, COLUMNS, or INDEX after SHOW"))
        }
    } else {
        Err(stream.unexpected("expected CREATE, DROP, or SHOW"))
    }
}

fn parse_create_table(stream: &mut TokenStream) -> Result<CreateTable> {
    let mut if_not_exists = false;
    if stream.consume_keyword(Keyword::If) {
        stream.expect_keyword(Keyword::Not)?;
        stream.expect_keyword(Keyword::Exists)?;
        if_not_exists = true;
    }
    let table = stream.expect_identifier()?;
    stream.expect_symbol(Symbol::LParen)?;

    let mut columns = Vec::new();
    loop {
        let name = stream.expect_identifier()?;
        let data_type = parse_data_type(stream)?;
        columns.push(ColumnDef { name, data_type });
        if stream.consume_symbol(Symbol::Comma) {
            continue;
        }
        break;
    }
    stream.expect_symbol(Symbol::RParen)?;

    Ok(CreateTable {
        table,
        columns,
        if_not_exists,
    })
}

fn parse_create_index(stream: &mut TokenStream) -> Result<CreateIndex> {
    let index = stream.expect_identifier()?;
    stream.expect_keyword(Keyword::On)?;
    let table = stream.expect_identifier()?;

    // USING may come before or after the column list
    let mut index_type = None;
    if stream.consume_keyword(Keyword::Using) {
        index_type = Some(stream.expect_identifier()?);
    }

    stream.expect_symbol(Symbol::LParen)?;
    let mut columns = Vec::new();
    loop {
        columns.push(stream.expect_identifier()?);
        if stream.consume_symbol(Symbol::Comma) {
            continue;
        }
        break;
    }
    stream.expect_symbol(Symbol::RParen)?;

    if index_type.is_none() && stream.consume_keyword(Keyword::Using) {
        index_type = Some(stream.expect_identifier()?);
    }

    Ok(CreateIndex {
        index,
        table,
        columns,
        index_type: index_type
            .map(|t| t.to_ascii_uppercase())
            .unwrap_or_else(|| "BTREE".to_string()),
    })
}

fn parse_data_type(stream: &mut TokenStream) -> Result<DataType> {
    if stream.consume_keyword(Keyword::Int) || stream.consume_keyword(Keyword::Integer) {
        Ok(DataType::Int)
    } else if stream.consume_keyword(Keyword::Text) || stream.consume_keyword(Keyword::Varchar) {
        Ok(DataType::Text)
    } else if stream.consume_keyword(Keyword::Boolean) {
        Ok(DataType::Boolean)
    } else if let Some(name) = stream.consume_identifier() {
        Err(DbError::UnsupportedType { name })
    } else {
        Err(stream.unexpected("expected a column type"))
    }
}

struct TokenStream {
    tokens: Vec<Token>,
    index: usize,
}

impl TokenStream {
    fn new(tokens: Vec<Token>) -> Self {
        TokenStream { tokens, index: 0 }
    }

    fn is_eof(&self) -> bool {
        self.index >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn consume_keyword(&mut self, keyword: Keyword) -> bool {
        matches!(self.peek(), Some(Token { kind: TokenKind::Keyword(k), .. }) if *k == keyword)
            && self.consume().is_some()
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if self.consume_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("expected {:?}", keyword)))
        }
    }

    fn consume_symbol(&mut self, symbol: Symbol) -> bool {
        matches!(self.peek(), Some(Token { kind: TokenKind::Symbol(s), .. }) if *s == symbol)
            && self.consume().is_some()
    }

    fn expect_symbol(&mut self, symbol: Symbol) -> Result<()> {
        if self.consume_symbol(symbol) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("expected {:?}", symbol)))
        }
    }

    fn consume_identifier(&mut self) -> Option<String> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Identifier(_),
                ..
            }) => match self.consume() {
                Some(Token {
                    kind: TokenKind::Identifier(name),
                    ..
                }) => Some(name),
                _ => None,
            },
            _ => None,
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        self.consume_identifier()
            .ok_or_else(|| self.unexpected("expected an identifier"))
    }

    fn unexpected(&self, expected: &str) -> DbError {
        let details = match self.peek() {
            Some(token) => format!("{} at byte {}", expected, token.pos),
            None => format!("{} at end of input", expected),
        };
        DbError::Parse { details }
    }
}

// This module implements the textual tile-IR parser as a hand-rolled cursor
// over the input, tracking line numbers for error reporting. The grammar is
// line oriented: functions with typed percent-prefixed parameters and
// optional @scope tags, `local` declarations that scope the remainder of the
// enclosing block, `thread` scopes, and `call` statements whose operation
// names resolve through the closed catalog. Unknown operation names and any
// syntax error surface as CompileError::Parse with the offending line.

//! Tile IR text format parser.

use super::{DType, Expr, Param, PrimFunc, Stmt, TileOp, TirModule};
use crate::core::{CompileError, CompileResult};

pub fn parse_module(text: &str) -> CompileResult<TirModule> {
    let mut parser = Parser::new(text);
    parser.parse()
}

struct Parser<'a> {
    text: &'a [u8],
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            text: src.as_bytes(),
            src,
            pos: 0,
            line: 1,
        }
    }

    fn parse(&mut self) -> CompileResult<TirModule> {
        let mut module = TirModule::new();
        self.skip_whitespace();
        while !self.is_eof() {
            self.expect_keyword("func")?;
            module.functions.push(self.parse_function()?);
            self.skip_whitespace();
        }
        Ok(module)
    }

    fn err(&self, message: impl Into<String>) -> CompileError {
        CompileError::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<u8> {
        self.text.get(self.pos).copied()
    }

    fn advance(&mut self) {
        if self.peek() == Some(b'\n') {
            self.line += 1;
        }
        self.pos += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == b';' {
                while let Some(ch) = self.peek() {
                    if ch == b'\n' {
                        break;
                    }
                    self.advance();
                }
            } else if ch.is_ascii_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn try_read(&mut self, ch: u8) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, ch: u8) -> CompileResult<()> {
        if !self.try_read(ch) {
            return Err(self.err(format!(
                "expected '{}', found {:?}",
                ch as char,
                self.peek().map(|c| c as char)
            )));
        }
        Ok(())
    }

    fn read_identifier(&mut self) -> CompileResult<&'a str> {
        self.skip_whitespace();
        let start = self.pos;
        match self.peek() {
            Some(ch) if ch.is_ascii_alphabetic() || ch == b'_' => {}
            other => {
                return Err(self.err(format!(
                    "expected identifier, found {:?}",
                    other.map(|c| c as char)
                )))
            }
        }
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        Ok(&self.src[start..self.pos])
    }

    /// Dotted operation name, e.g. `dlc.add`.
    fn read_op_name(&mut self) -> CompileResult<String> {
        let mut name = self.read_identifier()?.to_string();
        while self.peek() == Some(b'.') {
            self.advance();
            name.push('.');
            name.push_str(self.read_identifier()?);
        }
        Ok(name)
    }

    fn try_keyword(&mut self, kw: &str) -> bool {
        self.skip_whitespace();
        let end = self.pos + kw.len();
        // Compare bytes: `end` may fall inside a multi-byte character, where
        // a str slice would panic instead of failing the match.
        if end <= self.text.len() && self.text[self.pos..end] == *kw.as_bytes() {
            // Keyword must not run into a longer identifier.
            let next = self.text.get(end).copied();
            if !matches!(next, Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
                self.pos = end;
                return true;
            }
        }
        false
    }

    fn expect_keyword(&mut self, kw: &str) -> CompileResult<()> {
        if !self.try_keyword(kw) {
            return Err(self.err(format!("expected '{kw}'")));
        }
        Ok(())
    }

    fn read_value_name(&mut self) -> CompileResult<String> {
        self.expect(b'%')?;
        Ok(self.read_identifier()?.to_string())
    }

    fn read_int(&mut self) -> CompileResult<i64> {
        match self.read_number()? {
            Expr::IntImm(v) => Ok(v),
            _ => Err(self.err("expected integer")),
        }
    }

    fn read_number(&mut self) -> CompileResult<Expr> {
        self.skip_whitespace();
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.advance();
        }
        let mut is_float = false;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.advance();
            } else if ch == b'.' && !is_float {
                is_float = true;
                self.advance();
            } else {
                break;
            }
        }
        let lit = &self.src[start..self.pos];
        if is_float {
            lit.parse::<f64>()
                .map(Expr::FloatImm)
                .map_err(|_| self.err(format!("bad float literal '{lit}'")))
        } else {
            lit.parse::<i64>()
                .map(Expr::IntImm)
                .map_err(|_| self.err(format!("bad integer literal '{lit}'")))
        }
    }

    /// Consumes one whole character. `pos` only ever rests on a character
    /// boundary, so the slice below is valid.
    fn read_char(&mut self) -> CompileResult<char> {
        match self.src[self.pos..].chars().next() {
            Some(ch) => {
                for _ in 0..ch.len_utf8() {
                    self.advance();
                }
                Ok(ch)
            }
            None => Err(self.err("unexpected end of input")),
        }
    }

    fn read_string(&mut self) -> CompileResult<String> {
        self.expect(b'"')?;
        let mut out = String::new();
        loop {
            match self.peek() {
                Some(b'"') => {
                    self.advance();
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.advance();
                    if self.is_eof() {
                        return Err(self.err("unterminated string"));
                    }
                    out.push(self.read_char()?);
                }
                Some(_) => out.push(self.read_char()?),
                None => return Err(self.err("unterminated string")),
            }
        }
    }

    fn read_scalar_type(&mut self) -> CompileResult<DType> {
        let name = self.read_identifier()?;
        match name {
            "f32" => Ok(DType::Float32),
            "i32" => Ok(DType::Int32),
            "handle" => Ok(DType::Handle),
            "void" => Ok(DType::Void),
            _ => {
                if let Some(lanes) = name.strip_prefix("f32x") {
                    let lanes = lanes
                        .parse()
                        .map_err(|_| self.err(format!("bad lane count in '{name}'")))?;
                    Ok(DType::Float32x { lanes })
                } else if let Some(lanes) = name.strip_prefix("i32x") {
                    let lanes = lanes
                        .parse()
                        .map_err(|_| self.err(format!("bad lane count in '{name}'")))?;
                    Ok(DType::Int32x { lanes })
                } else {
                    Err(self.err(format!("unknown type '{name}'")))
                }
            }
        }
    }

    fn read_scope_tag(&mut self) -> CompileResult<String> {
        if self.try_read(b'@') {
            Ok(self.read_identifier()?.to_string())
        } else {
            Ok(String::new())
        }
    }

    fn parse_function(&mut self) -> CompileResult<PrimFunc> {
        let name = self.read_identifier()?.to_string();
        self.expect(b'(')?;
        let mut params = Vec::new();
        if !self.try_read(b')') {
            loop {
                params.push(self.parse_param()?);
                if self.try_read(b')') {
                    break;
                }
                self.expect(b',')?;
            }
        }

        let mut no_alias = false;
        let mut non_restrict = Vec::new();
        loop {
            if self.try_keyword("noalias") {
                no_alias = true;
            } else if self.try_keyword("norestrict") {
                self.expect(b'(')?;
                loop {
                    non_restrict.push(self.read_value_name()?);
                    if self.try_read(b')') {
                        break;
                    }
                    self.expect(b',')?;
                }
            } else {
                break;
            }
        }

        self.expect(b'{')?;
        let body = self.parse_block()?;
        Ok(PrimFunc {
            name,
            params,
            body,
            no_alias,
            non_restrict,
        })
    }

    fn parse_param(&mut self) -> CompileResult<Param> {
        let name = self.read_value_name()?;
        self.expect(b':')?;
        let is_pointer = self.try_read(b'*');
        let dtype = self.read_scalar_type()?;
        let scope = self.read_scope_tag()?;
        Ok(Param {
            name,
            dtype,
            is_pointer,
            scope,
        })
    }

    /// Parses statements up to the closing brace. A `local` declaration
    /// scopes the remainder of the block as its body.
    fn parse_block(&mut self) -> CompileResult<Stmt> {
        let mut stmts = Vec::new();
        loop {
            if self.try_read(b'}') {
                return Ok(Stmt::Block(stmts));
            }
            if self.try_keyword("local") {
                let var = self.read_value_name()?;
                self.expect(b':')?;
                let dtype = self.read_scalar_type()?;
                self.expect(b'[')?;
                self.skip_whitespace();
                let size = if self.peek() == Some(b'%') {
                    Expr::Var(self.read_value_name()?)
                } else {
                    self.read_number()?
                };
                self.expect(b']')?;
                let scope = self.read_scope_tag()?;
                let body = self.parse_block()?;
                stmts.push(Stmt::Alloc {
                    var,
                    dtype,
                    scope,
                    size,
                    body: Box::new(body),
                });
                return Ok(Stmt::Block(stmts));
            }
            if self.try_keyword("thread") {
                let var = self.read_value_name()?;
                self.expect_keyword("extent")?;
                let extent = self.read_int()?;
                self.expect(b'{')?;
                let body = self.parse_block()?;
                stmts.push(Stmt::ThreadScope {
                    var,
                    extent,
                    body: Box::new(body),
                });
                continue;
            }
            if self.try_keyword("call") {
                stmts.push(Stmt::Eval(self.parse_call()?));
                continue;
            }
            return Err(self.err("expected 'local', 'thread', 'call' or '}'"));
        }
    }

    fn parse_call(&mut self) -> CompileResult<Expr> {
        let name = self.read_op_name()?;
        let op = TileOp::from_name(&name).ok_or_else(|| CompileError::UnknownOp {
            name: name.clone(),
        })?;
        self.expect(b'(')?;
        let mut args = Vec::new();
        if !self.try_read(b')') {
            loop {
                args.push(self.parse_arg()?);
                if self.try_read(b')') {
                    break;
                }
                self.expect(b',')?;
            }
        }
        Ok(Expr::Call { op, args })
    }

    fn parse_arg(&mut self) -> CompileResult<Expr> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'%') => Ok(Expr::Var(self.read_value_name()?)),
            Some(b'"') => Ok(Expr::Str(self.read_string()?)),
            Some(c) if c.is_ascii_digit() || c == b'-' => self.read_number(),
            other => Err(self.err(format!(
                "expected call argument, found {:?}",
                other.map(|c| c as char)
            ))),
        }
    }
}

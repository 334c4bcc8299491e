use crate::error::ExpressionError;
use crate::traits::{Scalar, ScalarFunction};
use std::cell::RefCell;

/// OpCodes for the Stack-based Virtual Machine.
/// The VM operates on a stack of `Scalar` values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpCode {
    /// Pushes a constant `f64` value onto the stack.
    LoadConst(f64),
    /// Pushes the value of the function's variable onto the stack.
    LoadVar,
    /// Pops top two values (b, a), pushes (a + b).
    Add,
    /// Pops top two values (b, a), pushes (a - b).
    Sub,
    /// Pops top two values (b, a), pushes (a * b).
    Mul,
    /// Pops top two values (b, a), pushes (a / b).
    Div,
    /// Pops top two values (b, a), pushes (a ^ b).
    Pow,
    /// Pops top value (a), pushes -a.
    Neg,
    /// Pops top value (a), pushes f(a) for a built-in function.
    Call(Function),
}

/// Represents a compiled sequence of operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bytecode {
    pub ops: Vec<OpCode>,
}

impl Bytecode {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }
}

/// Stack-based Virtual Machine for evaluating expressions.
///
/// The VM is stateless; `execute` takes all necessary context:
/// - `bytecode`: Instructions to run.
/// - `x`: Value of the variable.
/// - `stack`: A mutable buffer for intermediate computations.
///
/// Returns the value left on the stack. Malformed bytecode yields NaN rather
/// than panicking.
pub struct VM;

impl VM {
    pub fn execute<T: Scalar>(bytecode: &Bytecode, x: T, stack: &mut Vec<T>) -> T {
        stack.clear();

        for op in &bytecode.ops {
            match *op {
                OpCode::LoadConst(val) => {
                    stack.push(T::from_f64(val).unwrap_or_else(T::nan));
                }
                OpCode::LoadVar => stack.push(x),
                OpCode::Add => binary(stack, |a, b| a + b),
                OpCode::Sub => binary(stack, |a, b| a - b),
                OpCode::Mul => binary(stack, |a, b| a * b),
                OpCode::Div => binary(stack, |a, b| a / b),
                OpCode::Pow => binary(stack, |a, b| a.powf(b)),
                OpCode::Neg => {
                    let a = pop(stack);
                    stack.push(-a);
                }
                OpCode::Call(func) => {
                    let a = pop(stack);
                    stack.push(func.apply(a));
                }
            }
        }

        pop(stack)
    }
}

fn pop<T: Scalar>(stack: &mut Vec<T>) -> T {
    stack.pop().unwrap_or_else(T::nan)
}

fn binary<T: Scalar>(stack: &mut Vec<T>, op: impl Fn(T, T) -> T) {
    let b = pop(stack);
    let a = pop(stack);
    stack.push(op(a, b));
}

// --- AST & Parser ---

/// Functions a user expression may call. Nothing outside this list is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Ln,
    Log10,
    Exp,
    Sqrt,
    Abs,
}

impl Function {
    /// `sen` is accepted as a spelling of `sin`; `log` is base 10.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sen" | "sin" => Some(Function::Sin),
            "cos" => Some(Function::Cos),
            "tan" | "tg" => Some(Function::Tan),
            "ln" => Some(Function::Ln),
            "log" => Some(Function::Log10),
            "exp" => Some(Function::Exp),
            "sqrt" | "raiz" => Some(Function::Sqrt),
            "abs" => Some(Function::Abs),
            _ => None,
        }
    }

    pub fn apply<T: Scalar>(self, a: T) -> T {
        match self {
            Function::Sin => a.sin(),
            Function::Cos => a.cos(),
            Function::Tan => a.tan(),
            Function::Ln => a.ln(),
            Function::Log10 => a.log10(),
            Function::Exp => a.exp(),
            Function::Sqrt => a.sqrt(),
            Function::Abs => a.abs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Abstract Syntax Tree nodes for expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable,
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Neg(Box<Expr>),
    Call(Function, Box<Expr>),
}

/// Compiles an AST (`Expr`) into `Bytecode`.
pub struct Compiler;

impl Compiler {
    pub fn compile(expr: &Expr) -> Bytecode {
        let mut ops = Vec::new();
        Self::compile_recursive(expr, &mut ops);
        Bytecode { ops }
    }

    fn compile_recursive(expr: &Expr, ops: &mut Vec<OpCode>) {
        match expr {
            Expr::Number(n) => ops.push(OpCode::LoadConst(*n)),
            Expr::Variable => ops.push(OpCode::LoadVar),
            Expr::Binary(left, op, right) => {
                Self::compile_recursive(left, ops);
                Self::compile_recursive(right, ops);
                ops.push(match op {
                    BinaryOp::Add => OpCode::Add,
                    BinaryOp::Sub => OpCode::Sub,
                    BinaryOp::Mul => OpCode::Mul,
                    BinaryOp::Div => OpCode::Div,
                    BinaryOp::Pow => OpCode::Pow,
                });
            }
            Expr::Neg(operand) => {
                Self::compile_recursive(operand, ops);
                ops.push(OpCode::Neg);
            }
            Expr::Call(func, arg) => {
                Self::compile_recursive(arg, ops);
                ops.push(OpCode::Call(*func));
            }
        }
    }
}

// --- Parser ---

/// Parses an expression in one variable. `lhs = rhs` is read as `lhs - rhs`.
pub fn parse(input: &str, variable: &str) -> Result<Expr, ExpressionError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExpressionError::at(0, "empty expression"));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        variable,
        end: input.chars().count(),
    };
    parser.parse_equation()
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Equals,
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    position: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().enumerate().peekable();

    while let Some(&(position, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() || c == '.' || c == ',' {
            let mut num_str = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if d.is_ascii_digit() {
                    num_str.push(d);
                } else if d == '.' || d == ',' {
                    num_str.push('.');
                } else {
                    break;
                }
                chars.next();
            }
            let value = num_str
                .parse()
                .map_err(|_| ExpressionError::at(position, format!("invalid number '{num_str}'")))?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                position,
            });
        } else if c.is_alphabetic() {
            let mut ident = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if d.is_alphanumeric() || d == '_' {
                    ident.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token {
                kind: TokenKind::Identifier(ident.to_lowercase()),
                position,
            });
        } else {
            let kind = match c {
                '+' => TokenKind::Plus,
                '-' | '−' => TokenKind::Minus,
                '*' | '·' | '×' => TokenKind::Star,
                '/' | '÷' => TokenKind::Slash,
                '^' => TokenKind::Caret,
                '(' | '[' => TokenKind::LParen,
                ')' | ']' => TokenKind::RParen,
                '=' => TokenKind::Equals,
                other => {
                    return Err(ExpressionError::at(
                        position,
                        format!("unexpected character '{other}'"),
                    ))
                }
            };
            tokens.push(Token { kind, position });
            chars.next();
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    variable: &'a str,
    end: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn position(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |t| t.position)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_equation(&mut self) -> Result<Expr, ExpressionError> {
        let lhs = self.parse_expression()?;
        let expr = if let Some(TokenKind::Equals) = self.peek() {
            self.consume();
            let rhs = self.parse_expression()?;
            Expr::Binary(Box::new(lhs), BinaryOp::Sub, Box::new(rhs))
        } else {
            lhs
        };
        match self.peek() {
            None => Ok(expr),
            Some(TokenKind::Equals) => Err(ExpressionError::at(
                self.position(),
                "only one '=' is allowed",
            )),
            Some(TokenKind::RParen) => {
                Err(ExpressionError::at(self.position(), "unmatched ')'"))
            }
            Some(_) => Err(ExpressionError::at(self.position(), "unexpected token")),
        }
    }

    fn parse_expression(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_term()?;

        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.consume();
            let right = self.parse_term()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    /// Products and quotients, including implicit products such as `2x` or `(x+1)(x-1)`.
    fn parse_term(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek() {
                Some(TokenKind::Star) => {
                    self.consume();
                    BinaryOp::Mul
                }
                Some(TokenKind::Slash) => {
                    self.consume();
                    BinaryOp::Div
                }
                Some(TokenKind::Number(_) | TokenKind::Identifier(_) | TokenKind::LParen) => {
                    BinaryOp::Mul
                }
                _ => break,
            };
            let right = self.parse_unary()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExpressionError> {
        match self.peek() {
            Some(TokenKind::Minus) => {
                self.consume();
                let operand = self.parse_unary()?;
                Ok(Expr::Neg(Box::new(operand)))
            }
            Some(TokenKind::Plus) => {
                self.consume();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    /// `^` is right-associative and binds tighter than a leading minus: `-x^2 = -(x^2)`.
    fn parse_power(&mut self) -> Result<Expr, ExpressionError> {
        let base = self.parse_primary()?;
        if let Some(TokenKind::Caret) = self.peek() {
            self.consume();
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary(
                Box::new(base),
                BinaryOp::Pow,
                Box::new(exponent),
            ));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExpressionError> {
        let position = self.position();
        match self.consume().map(|t| t.kind) {
            Some(TokenKind::Number(n)) => Ok(Expr::Number(n)),
            Some(TokenKind::Identifier(name)) => self.parse_identifier(name, position),
            Some(TokenKind::LParen) => {
                let expr = self.parse_expression()?;
                self.expect_closing(position)?;
                Ok(expr)
            }
            Some(_) => Err(ExpressionError::at(position, "unexpected token")),
            None => Err(ExpressionError::at(position, "unexpected end of expression")),
        }
    }

    fn parse_identifier(&mut self, name: String, position: usize) -> Result<Expr, ExpressionError> {
        if name == self.variable {
            return Ok(Expr::Variable);
        }
        match name.as_str() {
            "pi" => return Ok(Expr::Number(std::f64::consts::PI)),
            "e" => return Ok(Expr::Number(std::f64::consts::E)),
            _ => {}
        }
        let Some(func) = Function::from_name(&name) else {
            return Err(ExpressionError::at(
                position,
                format!("unknown identifier '{name}'"),
            ));
        };
        let open = self.position();
        if let Some(TokenKind::LParen) = self.peek() {
            self.consume();
            let arg = self.parse_expression()?;
            self.expect_closing(open)?;
            Ok(Expr::Call(func, Box::new(arg)))
        } else {
            Err(ExpressionError::at(
                position,
                format!("function '{name}' needs parentheses"),
            ))
        }
    }

    fn expect_closing(&mut self, open: usize) -> Result<(), ExpressionError> {
        match self.consume().map(|t| t.kind) {
            Some(TokenKind::RParen) => Ok(()),
            _ => Err(ExpressionError::at(open, "expected ')' to close '('")),
        }
    }
}

// --- CompiledFunction ---

/// A parsed and compiled user function of one variable.
#[derive(Debug, Clone)]
pub struct CompiledFunction {
    pub source: String,
    pub variable: String,
    pub bytecode: Bytecode,
    // Scratch stack reused across evaluations.
    stack: RefCell<Vec<f64>>,
}

impl CompiledFunction {
    pub fn new(source: &str, variable: &str) -> Result<Self, ExpressionError> {
        let expr = parse(source, variable)?;
        Ok(Self {
            source: source.to_string(),
            variable: variable.to_string(),
            bytecode: Compiler::compile(&expr),
            stack: RefCell::new(Vec::with_capacity(16)),
        })
    }

    pub fn eval(&self, x: f64) -> f64 {
        let mut stack = self.stack.borrow_mut();
        VM::execute(&self.bytecode, x, &mut stack)
    }
}

impl ScalarFunction for CompiledFunction {
    fn evaluate(&self, x: f64) -> f64 {
        self.eval(x)
    }
}

/// Compiles `source` as a function of `x`.
pub fn compile_function(source: &str) -> Result<CompiledFunction, ExpressionError> {
    CompiledFunction::new(source, "x")
}

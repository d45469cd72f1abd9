//! Lambda compiler: turns `"x => x.value > 1"` into a callable [`Lambda`].
//!
//! The source is split on the first `=>`. The left side must be a single
//! identifier, optionally parenthesized; the right side is parsed into an
//! [`AstNode`] once, and every call walks that tree with the parameter bound
//! to the element.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::ast::AstNode;
use crate::error::{Error, Result};
use crate::evaluator::Evaluator;
use crate::options::CompileOptions;
use crate::parser;
use crate::value::Value;

/// Separator between the parameter and the body
pub const ARROW: &str = "=>";

type NativeFn = dyn Fn(&Value) -> Result<Value> + Send + Sync;

/// A compiled single-argument callable.
///
/// Cloning is cheap: the syntax tree (or native closure) is shared.
#[derive(Clone)]
pub struct Lambda {
    kind: LambdaKind,
}

#[derive(Clone)]
enum LambdaKind {
    Expression {
        source: Arc<str>,
        param: Arc<str>,
        body: Arc<AstNode>,
    },
    Native(Arc<NativeFn>),
}

impl Lambda {
    /// Wrap a Rust closure so it can be passed wherever a lambda string is accepted.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        Lambda {
            kind: LambdaKind::Native(Arc::new(f)),
        }
    }

    /// Declared parameter name; `None` for native lambdas.
    pub fn param(&self) -> Option<&str> {
        match &self.kind {
            LambdaKind::Expression { param, .. } => Some(param),
            LambdaKind::Native(_) => None,
        }
    }

    /// Parsed body; `None` for native lambdas.
    pub fn body(&self) -> Option<&AstNode> {
        match &self.kind {
            LambdaKind::Expression { body, .. } => Some(body),
            LambdaKind::Native(_) => None,
        }
    }

    /// Source text the lambda was compiled from.
    pub fn source(&self) -> Option<&str> {
        match &self.kind {
            LambdaKind::Expression { source, .. } => Some(source),
            LambdaKind::Native(_) => None,
        }
    }

    /// Invoke as a selector.
    pub fn apply(&self, element: &Value) -> Result<Value> {
        match &self.kind {
            LambdaKind::Expression { param, body, .. } => {
                Ok(Evaluator::new(param, element).evaluate(body)?)
            }
            LambdaKind::Native(f) => f(element),
        }
    }

    /// Invoke as a predicate: the result's truthiness.
    pub fn test(&self, element: &Value) -> Result<bool> {
        Ok(self.apply(element)?.is_truthy())
    }
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LambdaKind::Expression { source, .. } => f.debug_tuple("Lambda").field(source).finish(),
            LambdaKind::Native(_) => f.write_str("Lambda(<native>)"),
        }
    }
}

impl FromStr for Lambda {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        compile(s)
    }
}

/// Compile a lambda string with default [`CompileOptions`].
///
/// ```
/// use linq_core::{compile, value};
///
/// let over_one = compile("x => x.value > 1").unwrap();
/// assert!(over_one.test(&value!({"value": 2})).unwrap());
/// assert!(!over_one.test(&value!({"value": 1})).unwrap());
/// ```
pub fn compile(source: &str) -> Result<Lambda> {
    compile_with(source, &CompileOptions::default())
}

/// Compile a lambda string under explicit limits.
pub fn compile_with(source: &str, options: &CompileOptions) -> Result<Lambda> {
    let length = source.chars().count();
    if length > options.max_source_len {
        return Err(Error::MalformedExpression(format!(
            "lambda is {} characters long, the limit is {}",
            length, options.max_source_len
        )));
    }

    let (param, body) = split_lambda(source)?;
    let ast = parser::parse_with_max_depth(body, options.max_depth).map_err(|e| {
        debug!(source, error = %e, "lambda body failed to parse");
        Error::from(e)
    })?;

    debug!(param, body_len = body.len(), "compiled lambda");
    Ok(Lambda {
        kind: LambdaKind::Expression {
            source: source.into(),
            param: param.into(),
            body: Arc::new(ast),
        },
    })
}

/// Split `param => body` on the first arrow and validate both halves.
fn split_lambda(source: &str) -> Result<(&str, &str)> {
    let (head, body) = source.split_once(ARROW).ok_or_else(|| {
        Error::MalformedExpression(format!("missing `{}` in `{}`", ARROW, source))
    })?;

    let mut param = head.trim();
    if let Some(inner) = param.strip_prefix('(').and_then(|p| p.strip_suffix(')')) {
        param = inner.trim();
    }
    if param.is_empty() {
        return Err(Error::MalformedExpression(
            "lambda parameter is empty".to_string(),
        ));
    }
    if !parser::is_identifier(param) {
        return Err(Error::MalformedExpression(format!(
            "`{}` is not a valid parameter name",
            param
        )));
    }

    let body = body.trim();
    if body.is_empty() {
        return Err(Error::MalformedExpression("lambda body is empty".to_string()));
    }

    Ok((param, body))
}

/// Anything an operator accepts in place of a compiled lambda.
pub trait IntoLambda {
    fn into_lambda(self) -> Result<Lambda>;
}

impl IntoLambda for &str {
    fn into_lambda(self) -> Result<Lambda> {
        compile(self)
    }
}

impl IntoLambda for String {
    fn into_lambda(self) -> Result<Lambda> {
        compile(&self)
    }
}

impl IntoLambda for &String {
    fn into_lambda(self) -> Result<Lambda> {
        compile(self)
    }
}

impl IntoLambda for Lambda {
    fn into_lambda(self) -> Result<Lambda> {
        Ok(self)
    }
}

impl IntoLambda for &Lambda {
    fn into_lambda(self) -> Result<Lambda> {
        Ok(self.clone())
    }
}

/// Opt-in memo of compiled lambdas keyed by source text.
///
/// Failed compiles are not stored, so a bad source fails every time.
#[derive(Debug, Default)]
pub struct LambdaCache {
    options: CompileOptions,
    entries: HashMap<String, Lambda>,
}

impl LambdaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CompileOptions) -> Self {
        LambdaCache {
            options,
            entries: HashMap::new(),
        }
    }

    pub fn get_or_compile(&mut self, source: &str) -> Result<Lambda> {
        if let Some(lambda) = self.entries.get(source) {
            trace!(source, "lambda cache hit");
            return Ok(lambda.clone());
        }

        trace!(source, "lambda cache miss");
        let lambda = compile_with(source, &self.options)?;
        self.entries.insert(source.to_string(), lambda.clone());
        Ok(lambda)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// Expression evaluator
// Walks a lambda body with exactly one name in scope: the lambda parameter

use crate::ast::{AstNode, BinaryOp, UnaryOp};
use crate::value::Value;
use thiserror::Error;

/// Evaluator errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluatorError {
    #[error("Type error: {0}")]
    TypeError(String),

    /// Carries the name that failed to resolve
    #[error("Reference error: {0} is not defined")]
    ReferenceError(String),
}

/// Evaluation context
///
/// Holds the single binding a lambda body can see. There is no parent scope:
/// names other than `name` never resolve.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    name: &'a str,
    value: &'a Value,
}

impl<'a> Context<'a> {
    pub fn bind(name: &'a str, value: &'a Value) -> Self {
        Context { name, value }
    }

    pub fn lookup(&self, name: &str) -> Option<&'a Value> {
        (name == self.name).then_some(self.value)
    }
}

/// Evaluator for lambda bodies
pub struct Evaluator<'a> {
    context: Context<'a>,
}

impl<'a> Evaluator<'a> {
    pub fn new(param: &'a str, value: &'a Value) -> Self {
        Evaluator {
            context: Context::bind(param, value),
        }
    }

    pub fn with_context(context: Context<'a>) -> Self {
        Evaluator { context }
    }

    /// Evaluate `node` against the bound parameter
    pub fn evaluate(&self, node: &AstNode) -> Result<Value, EvaluatorError> {
        match node {
            AstNode::String(s) => Ok(Value::string(s.as_str())),
            AstNode::Number(n) => Ok(Value::Number(*n)),
            AstNode::Boolean(b) => Ok(Value::Bool(*b)),
            AstNode::Null => Ok(Value::Null),
            AstNode::Undefined => Ok(Value::Undefined),

            AstNode::Identifier(name) => self
                .context
                .lookup(name)
                .cloned()
                .ok_or_else(|| EvaluatorError::ReferenceError(name.clone())),

            AstNode::Member { object, property } => {
                let object = self.evaluate(object)?;
                self.member(&object, property)
            }

            AstNode::Index { object, index } => {
                let object = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                self.array_index(&object, &index)
            }

            AstNode::Array(elements) => {
                let values = elements
                    .iter()
                    .map(|element| self.evaluate(element))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::array(values))
            }

            AstNode::Binary { op, lhs, rhs } => self.evaluate_binary_op(*op, lhs, rhs),

            AstNode::Unary { op, operand } => self.evaluate_unary_op(*op, operand),

            AstNode::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }
        }
    }

    /// Evaluate a binary operation; `&&` and `||` short-circuit and yield an operand
    fn evaluate_binary_op(
        &self,
        op: BinaryOp,
        lhs: &AstNode,
        rhs: &AstNode,
    ) -> Result<Value, EvaluatorError> {
        let left = self.evaluate(lhs)?;

        match op {
            BinaryOp::And => {
                return if left.is_truthy() {
                    self.evaluate(rhs)
                } else {
                    Ok(left)
                };
            }
            BinaryOp::Or => {
                return if left.is_truthy() {
                    Ok(left)
                } else {
                    self.evaluate(rhs)
                };
            }
            _ => {}
        }

        let right = self.evaluate(rhs)?;

        match op {
            BinaryOp::Add => self.add(&left, &right),
            BinaryOp::Subtract => self.arithmetic(op, &left, &right, |a, b| a - b),
            BinaryOp::Multiply => self.arithmetic(op, &left, &right, |a, b| a * b),
            BinaryOp::Divide => self.arithmetic(op, &left, &right, |a, b| a / b),
            BinaryOp::Modulo => self.arithmetic(op, &left, &right, |a, b| a % b),
            BinaryOp::Equal => Ok(Value::Bool(left.strict_equals(&right))),
            BinaryOp::NotEqual => Ok(Value::Bool(!left.strict_equals(&right))),
            BinaryOp::LessThan => self.ordered_compare(op, &left, &right, |a, b| a < b, |a, b| a < b),
            BinaryOp::LessThanOrEqual => {
                self.ordered_compare(op, &left, &right, |a, b| a <= b, |a, b| a <= b)
            }
            BinaryOp::GreaterThan => {
                self.ordered_compare(op, &left, &right, |a, b| a > b, |a, b| a > b)
            }
            BinaryOp::GreaterThanOrEqual => {
                self.ordered_compare(op, &left, &right, |a, b| a >= b, |a, b| a >= b)
            }
            BinaryOp::And => Ok(if left.is_truthy() { right } else { left }),
            BinaryOp::Or => Ok(if left.is_truthy() { left } else { right }),
        }
    }

    fn evaluate_unary_op(&self, op: UnaryOp, operand: &AstNode) -> Result<Value, EvaluatorError> {
        let value = self.evaluate(operand)?;
        match op {
            UnaryOp::Negate => match value {
                Value::Number(n) => Ok(Value::Number(-n)),
                other => Err(EvaluatorError::TypeError(format!(
                    "The operand of the unary - operator must evaluate to a number, got {}",
                    other.type_name()
                ))),
            },
            UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
        }
    }

    /// Member access (`object.property`)
    fn member(&self, object: &Value, property: &str) -> Result<Value, EvaluatorError> {
        match object {
            Value::Object(map) => Ok(map.get(property).cloned().unwrap_or(Value::Undefined)),
            Value::Array(arr) if property == "length" => Ok(Value::from(arr.len())),
            Value::String(s) if property == "length" => Ok(Value::from(s.chars().count())),
            Value::Null | Value::Undefined => Err(EvaluatorError::TypeError(format!(
                "Cannot read property '{}' of {}",
                property,
                object.type_name()
            ))),
            _ => Ok(Value::Undefined),
        }
    }

    /// Indexed access (`object[index]`)
    fn array_index(&self, object: &Value, index: &Value) -> Result<Value, EvaluatorError> {
        match (object, index) {
            (Value::Array(arr), Value::Number(n)) => Ok(as_position(*n)
                .and_then(|i| arr.get(i))
                .cloned()
                .unwrap_or(Value::Undefined)),
            (Value::String(s), Value::Number(n)) => Ok(as_position(*n)
                .and_then(|i| s.chars().nth(i))
                .map(|ch| Value::from(ch.to_string()))
                .unwrap_or(Value::Undefined)),
            (Value::Array(_) | Value::String(_), Value::String(key)) => self.member(object, key),
            (Value::Object(_), Value::String(key)) => self.member(object, key),
            (Value::Object(_), Value::Number(_)) => self.member(object, &index.to_string()),
            (Value::Null | Value::Undefined, _) => Err(EvaluatorError::TypeError(format!(
                "Cannot read property '{}' of {}",
                index,
                object.type_name()
            ))),
            _ => Err(EvaluatorError::TypeError(format!(
                "Cannot index {} with {}",
                object.type_name(),
                index.type_name()
            ))),
        }
    }

    /// Addition; a string on either side turns `+` into concatenation
    fn add(&self, left: &Value, right: &Value) -> Result<Value, EvaluatorError> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(_), _) | (_, Value::String(_)) => {
                Ok(Value::from(format!("{}{}", left, right)))
            }
            _ => Err(EvaluatorError::TypeError(format!(
                "Cannot add {} and {}",
                left.type_name(),
                right.type_name()
            ))),
        }
    }

    /// Numeric binary operation with IEEE-754 semantics (`x / 0` is infinite, `x % 0` is NaN)
    fn arithmetic(
        &self,
        op: BinaryOp,
        left: &Value,
        right: &Value,
        apply: fn(f64, f64) -> f64,
    ) -> Result<Value, EvaluatorError> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(apply(*a, *b))),
            (Value::Number(_), _) => Err(EvaluatorError::TypeError(format!(
                "The right side of the {} operator must evaluate to a number, got {}",
                op.symbol(),
                right.type_name()
            ))),
            _ => Err(EvaluatorError::TypeError(format!(
                "The left side of the {} operator must evaluate to a number, got {}",
                op.symbol(),
                left.type_name()
            ))),
        }
    }

    /// Ordered comparison shared across <, <=, >, >=
    ///
    /// Both operands must be numbers or both strings.
    fn ordered_compare(
        &self,
        op: BinaryOp,
        left: &Value,
        right: &Value,
        compare_nums: fn(f64, f64) -> bool,
        compare_strs: fn(&str, &str) -> bool,
    ) -> Result<Value, EvaluatorError> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(compare_nums(*a, *b))),
            (Value::String(a), Value::String(b)) => Ok(Value::Bool(compare_strs(a, b))),
            _ => Err(EvaluatorError::TypeError(format!(
                "Cannot compare {} and {} with {}",
                left.type_name(),
                right.type_name(),
                op.symbol()
            ))),
        }
    }
}

/// Non-negative integral number as a position
fn as_position(n: f64) -> Option<usize> {
    (n >= 0.0 && n.fract() == 0.0 && n <= usize::MAX as f64).then_some(n as usize)
}

/// Evaluate `node` with `param` bound to `value`
pub fn evaluate(node: &AstNode, param: &str, value: &Value) -> Result<Value, EvaluatorError> {
    Evaluator::new(param, value).evaluate(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::value;

    fn eval(body: &str, data: &Value) -> Result<Value, EvaluatorError> {
        evaluate(&parse(body).unwrap(), "x", data)
    }

    #[test]
    fn test_evaluate_literals() {
        let data = Value::Null;
        assert_eq!(eval("'hello'", &data).unwrap(), value!("hello"));
        assert_eq!(eval("42", &data).unwrap(), value!(42));
        assert_eq!(eval("true", &data).unwrap(), value!(true));
        assert_eq!(eval("null", &data).unwrap(), Value::Null);
        assert_eq!(eval("undefined", &data).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_evaluate_parameter() {
        let data = value!({"value": 1});
        let result = eval("x", &data).unwrap();
        assert!(result.strict_equals(&data));
    }

    #[test]
    fn test_unbound_identifier() {
        let data = value!({"value": 1});
        assert_eq!(
            eval("y.value", &data),
            Err(EvaluatorError::ReferenceError("y".to_string()))
        );
        assert_eq!(
            eval("x.value + total", &data),
            Err(EvaluatorError::ReferenceError("total".to_string()))
        );
    }

    #[test]
    fn test_member_access() {
        let data = value!({"user": {"profile": {"name": "Bob"}}, "tags": ["a", "b"]});
        assert_eq!(eval("x.user.profile.name", &data).unwrap(), value!("Bob"));
        assert_eq!(eval("x.missing", &data).unwrap(), Value::Undefined);
        assert_eq!(eval("x.tags.length", &data).unwrap(), value!(2));
        assert_eq!(eval("x.user.profile.name.length", &data).unwrap(), value!(3));
        assert!(matches!(eval("x.missing.name", &data), Err(EvaluatorError::TypeError(_))));
    }

    #[test]
    fn test_index_access() {
        let data = value!({"items": [10, 20, 30], "name": "abc", "by": {"k": 1, "2": "two"}});
        assert_eq!(eval("x.items[1]", &data).unwrap(), value!(20));
        assert_eq!(eval("x.items[3]", &data).unwrap(), Value::Undefined);
        assert_eq!(eval("x.items[0.5]", &data).unwrap(), Value::Undefined);
        assert_eq!(eval("x.items[x.items.length - 1]", &data).unwrap(), value!(30));
        assert_eq!(eval("x.name[0]", &data).unwrap(), value!("a"));
        assert_eq!(eval("x['by']['k']", &data).unwrap(), value!(1));
        assert_eq!(eval("x.by[2]", &data).unwrap(), value!("two"));
        assert!(matches!(eval("x.items[true]", &data), Err(EvaluatorError::TypeError(_))));
        assert!(matches!(eval("x.nope[0]", &data), Err(EvaluatorError::TypeError(_))));
    }

    #[test]
    fn test_arithmetic_operations() {
        let data = value!({"a": 10, "b": 4});
        assert_eq!(eval("x.a + x.b", &data).unwrap(), value!(14));
        assert_eq!(eval("x.a - x.b", &data).unwrap(), value!(6));
        assert_eq!(eval("x.a * x.b", &data).unwrap(), value!(40));
        assert_eq!(eval("x.a / x.b", &data).unwrap(), value!(2.5));
        assert_eq!(eval("x.a % x.b", &data).unwrap(), value!(2));
        assert_eq!(eval("-x.a % 3", &data).unwrap(), value!(-1));
        assert_eq!(eval("2 + 3 * 4 - 1", &data).unwrap(), value!(13));
        assert_eq!(eval("(2 + 3) * 4", &data).unwrap(), value!(20));
    }

    #[test]
    fn test_division_by_zero() {
        let data = value!({"a": 1});
        assert_eq!(eval("x.a / 0", &data).unwrap(), Value::Number(f64::INFINITY));
        assert!(eval("x.a % 0", &data).unwrap().as_f64().is_some_and(f64::is_nan));
    }

    #[test]
    fn test_arithmetic_type_errors() {
        let data = value!({"a": 1, "flag": true});
        assert!(matches!(eval("x.a - 'b'", &data), Err(EvaluatorError::TypeError(_))));
        assert!(matches!(eval("x.flag * 2", &data), Err(EvaluatorError::TypeError(_))));
        assert!(matches!(eval("x.a + x.flag", &data), Err(EvaluatorError::TypeError(_))));
        assert!(matches!(eval("-x.flag", &data), Err(EvaluatorError::TypeError(_))));
    }

    #[test]
    fn test_string_concatenation() {
        let data = value!({"first": "Ada", "n": 2});
        assert_eq!(eval("x.first + ' ' + 'L'", &data).unwrap(), value!("Ada L"));
        assert_eq!(eval("'n=' + x.n", &data).unwrap(), value!("n=2"));
    }

    #[test]
    fn test_comparison_operations() {
        let data = value!({"v": 2, "s": "b"});
        assert_eq!(eval("x.v == 2", &data).unwrap(), value!(true));
        assert_eq!(eval("x.v === 2", &data).unwrap(), value!(true));
        assert_eq!(eval("x.v != 2", &data).unwrap(), value!(false));
        assert_eq!(eval("x.v == '2'", &data).unwrap(), value!(false));
        assert_eq!(eval("x.v < 3", &data).unwrap(), value!(true));
        assert_eq!(eval("x.v <= 2", &data).unwrap(), value!(true));
        assert_eq!(eval("x.v > 2", &data).unwrap(), value!(false));
        assert_eq!(eval("x.v >= 3", &data).unwrap(), value!(false));
        assert_eq!(eval("x.s > 'a'", &data).unwrap(), value!(true));
        assert!(matches!(eval("x.v < x.s", &data), Err(EvaluatorError::TypeError(_))));
    }

    #[test]
    fn test_equality_is_identity_for_containers() {
        let data = value!({"a": [1], "b": [1]});
        assert_eq!(eval("x.a == x.a", &data).unwrap(), value!(true));
        assert_eq!(eval("x.a == x.b", &data).unwrap(), value!(false));
    }

    #[test]
    fn test_logical_operations() {
        let data = value!({"on": true, "off": false, "name": ""});
        assert_eq!(eval("x.on && x.off", &data).unwrap(), value!(false));
        assert_eq!(eval("x.on || x.off", &data).unwrap(), value!(true));
        assert_eq!(eval("!x.off", &data).unwrap(), value!(true));
        assert_eq!(eval("!x.name", &data).unwrap(), value!(true));
        assert_eq!(eval("x.name || 'anon'", &data).unwrap(), value!("anon"));
    }

    #[test]
    fn test_short_circuit_skips_rhs() {
        // The right-hand side would fail if evaluated
        let data = value!({"off": false, "on": true});
        assert_eq!(eval("x.off && x.missing.deep", &data).unwrap(), value!(false));
        assert_eq!(eval("x.on || y", &data).unwrap(), value!(true));
    }

    #[test]
    fn test_conditional() {
        let data = value!({"v": (-3)});
        assert_eq!(eval("x.v > 0 ? 'pos' : x.v < 0 ? 'neg' : 'zero'", &data).unwrap(), value!("neg"));
        assert_eq!(eval("true ? 1 : y", &data).unwrap(), value!(1));
    }

    #[test]
    fn test_array_construction() {
        let data = value!({"a": 1, "b": 2});
        assert_eq!(eval("[x.a, x.b, x.a + x.b]", &data).unwrap(), value!([1, 2, 3]));
    }

    #[test]
    fn test_context_lookup() {
        let value = value!(5);
        let context = Context::bind("item", &value);
        assert!(context.lookup("item").is_some());
        assert!(context.lookup("x").is_none());

        let evaluator = Evaluator::with_context(context);
        let result = evaluator.evaluate(&AstNode::identifier("item")).unwrap();
        assert_eq!(result, value!(5));
    }
}

// linq_core - Query operators over ordered sequences, driven by string lambdas
// Copyright (c) 2025 linq_core contributors
// Licensed under the MIT License

//! # linq_core
//!
//! Declarative query operators (filter, project, group, aggregate, order,
//! search, mutate) over an ordered collection of dynamic values. Operators
//! take either literal arguments or a textual mini-lambda such as
//! `"x => x.value > 1"`, compiled at call time into a callable.
//!
//! ## Architecture
//!
//! - `value` - Dynamic element type and its equality/identity rules
//! - `ast` - Abstract Syntax Tree for lambda bodies
//! - `parser` - Lambda body parser (text to AST)
//! - `evaluator` - Tree-walking evaluator with one parameter binding
//! - `compiler` - `"param => expr"` to [`Lambda`]; optional [`LambdaCache`]
//! - `options` - Compile limits ([`CompileOptions`])
//! - `sequence` - [`Sequence`] and every query operator
//! - `error` - Crate-level [`Error`] taxonomy
//!
//! ## Example
//!
//! ```
//! use linq_core::{value, IntoSequence};
//!
//! let s = vec![value!({"value": 1}), value!({"value": 2}), value!({"value": 2})]
//!     .into_sequence();
//!
//! let first = s.first("x => x.value > 1")?.unwrap();
//! assert!(first.strict_equals(&s[1]));
//!
//! let groups = s.group("x => x.value")?;
//! assert_eq!(groups.len(), 2);
//! assert_eq!(groups[1].len(), 2);
//! # Ok::<(), linq_core::Error>(())
//! ```

pub mod ast;
pub mod compiler;
pub mod error;
pub mod evaluator;
pub mod options;
pub mod parser;
pub mod sequence;
pub mod value;

pub use compiler::{compile, compile_with, IntoLambda, Lambda, LambdaCache};
pub use error::{Error, Result};
pub use options::CompileOptions;
pub use sequence::{Group, IntoSequence, Sequence};
pub use value::Value;

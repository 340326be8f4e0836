//! Special forms and primitive procedures: the two ways a symbol can name
//! callable behavior (spec.md §4.4/§4.5). Special forms see their
//! operands unevaluated and are resolved by [`crate::eval::eval_pair`]
//! before any argument evaluation happens; primitives are ordinary
//! [`crate::construct::value::Value::Primitive`] values reached through
//! [`crate::construct::env::Env`] like any other binding.

pub mod primitives;
pub mod special_forms;

//! This module contains the [Rule] type as well as the [chain_rules] macro for applying
//! guards on top of one another. The first failing rule short-circuits the chain.

/// A [Rule] takes a value and either hands it back unchanged or rejects it.
pub type Rule<T, E = anyhow::Error> = Box<dyn Fn(T) -> Result<T, E>>;

#[macro_export]
macro_rules! chain_rules {
    ($state:expr, $($rule:expr),+) => {{
        let mut result = Ok($state);

        $(
            result = match result {
                Ok(val) => $rule(val),
                err @ Err(_) => err,
            };
        )+

        result
    }};
}

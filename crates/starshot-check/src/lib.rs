//! Static checks over Starshot programs.
//!
//! Each pass takes a parsed [`Program`](starshot_ir::Program), never stops at
//! the first finding and returns its diagnostics as human-readable strings.
//! Whether diagnostics block compilation is up to the caller.
//!
//! ```
//! let program = starshot_ir::parse(
//!     "(program (graph hello (input) (output Unit) (effect pure) (body (print \"hi\"))))",
//! )
//! .unwrap();
//! let report = starshot_check::check_program(&program);
//! assert_eq!(
//!     report.effects,
//!     vec!["Graph 'hello' is declared pure but requires effects: io"]
//! );
//! ```

mod contracts;
mod effects;
mod env;
mod names;
mod report;
mod types;

pub use contracts::{check_contracts, free_vars};
pub use effects::{EffectTable, check_effects, effect_table, required_effects};
pub use env::TypeEnv;
pub use names::check_names;
pub use report::{Report, check_program};
pub use types::{Typer, Variant, check_types};

#[cfg(test)]
mod tests;

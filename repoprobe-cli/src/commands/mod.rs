//! CLI command implementations

pub mod generate;
pub mod list;
pub mod run;

pub use generate::GenerateArgs;
pub use list::ListArgs;
pub use run::RunArgs;

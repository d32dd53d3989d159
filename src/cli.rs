mod args;

pub use args::{Cli, Command, GenerateArgs, ModuleArgs, RunArgs, TokenArgs};

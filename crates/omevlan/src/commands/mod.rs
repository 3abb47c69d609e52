//! Command dispatch: bridges CLI args -> core pipeline -> output formatting.

pub mod apply;
pub mod networks;
pub mod show;
pub mod util;

use omevlan_core::Mode;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an appliance-bound command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Apply(args) => apply::handle(args, Mode::Apply, global).await,
        Command::Plan(args) => apply::handle(args, Mode::DryRun, global).await,
        Command::Show(args) => show::handle(args, global).await,
        Command::Networks => networks::handle(global).await,
        Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "completions are generated before dispatch".into(),
        }),
    }
}

use std::path::Path;

use clap::Args;
use ripple_core::ChangeKind;
use ripple_git::GitClient;
use ripple_operations::operations::{ChangePrompter, ChangeRequest, create_change};

use crate::commands::open_session;
use crate::error::CliError;
use crate::interaction::TerminalPrompter;

#[derive(Args)]
pub struct ChangeArgs {
    /// Packages the change applies to
    #[arg(required = true)]
    packages: Vec<String>,

    /// Change kind; prompted for when omitted
    #[arg(long = "type", value_enum)]
    kind: Option<ChangeKind>,

    /// Change description; prompted for when omitted
    #[arg(long, short = 'm')]
    message: Option<String>,

    /// Kind that dependents of these packages receive (default: patch)
    #[arg(long = "dependent-type", value_enum)]
    dependent_kind: Option<ChangeKind>,

    /// Fail instead of prompting for missing inputs
    #[arg(long)]
    no_prompt: bool,
}

pub fn run(args: &ChangeArgs, start_path: &Path) -> Result<(), CliError> {
    let session = open_session(start_path)?;

    let request = ChangeRequest {
        packages: args.packages.clone(),
        kind: args.kind,
        comment: args.message.clone(),
        dependent_kind: args.dependent_kind,
    };
    let prompter = TerminalPrompter;
    let prompter: Option<&dyn ChangePrompter> = if args.no_prompt { None } else { Some(&prompter) };
    let written = create_change(
        &session.workspace,
        &session.git,
        &session.config,
        &request,
        prompter,
    )?;

    for path in written {
        let shown = path
            .strip_prefix(session.git.root())
            .unwrap_or(&path)
            .display();
        println!("created {shown}");
    }
    Ok(())
}

//
//  asc-cli
//  cli/completion.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Shell completion commands

use clap::{Args, Subcommand};
use clap_complete::{generate, Shell};

use crate::context::InvocationContext;
use crate::error::AscError;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionCommand {
    #[command(subcommand)]
    pub command: CompletionSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CompletionSubcommand {
    /// Generate Bash completions
    Bash,

    /// Generate Zsh completions
    Zsh,

    /// Generate Fish completions
    Fish,

    /// Generate PowerShell completions
    Powershell,
}

impl CompletionSubcommand {
    fn shell(&self) -> Shell {
        match self {
            Self::Bash => Shell::Bash,
            Self::Zsh => Shell::Zsh,
            Self::Fish => Shell::Fish,
            Self::Powershell => Shell::PowerShell,
        }
    }
}

impl CompletionCommand {
    pub async fn run(&self, _ctx: &InvocationContext) -> Result<(), AscError> {
        // The full tree, so catalog commands complete too.
        let mut cmd = super::command();
        generate(self.command.shell(), &mut cmd, crate::APP_NAME, &mut std::io::stdout());
        Ok(())
    }
}

use clap::{Args, Subcommand};

pub mod restrict;

use crate::cli::op::Op;

crate::command_enum! {
    (Restrict, restrict::Restrict),
}

pub type KeyCommand = Command;

/// Offline capability handling; nothing here talks to the daemon
#[derive(Args, Debug, Clone)]
pub struct Key {
    #[command(subcommand)]
    pub command: KeyCommand,
}

#[async_trait::async_trait]
impl Op for Key {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

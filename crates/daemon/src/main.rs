// CLI modules
mod cli;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Bucket, Daemon, Health, Init, Key, Project, Version};

command_enum! {
    (Bucket, Bucket),
    (Daemon, Daemon),
    (Health, Health),
    (Init, Init),
    (Key, Key),
    (Project, Project),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Resolve remote URLs: explicit flag > config port > default
    let remote = cli::op::resolve_remote(args.remote, args.config_path.clone());
    let admin_remote = cli::op::resolve_admin_remote(args.admin_remote, args.config_path.clone());

    // Build context - always has both API clients initialized
    let ctx = match cli::op::OpContext::new(remote, admin_remote, args.token, args.config_path) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: Failed to create API client: {}", e);
            std::process::exit(1);
        }
    };

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

//! CLI command handler: resolve options, then dispatch the subcommand.

use anyhow::Result;
use log::debug;
use std::time::Duration;

use crate::Opts;
use crate::engine::arg_parser::{Cli, Commands, GlobalArgs};
use crate::engine::handlers::{handle_ingest, handle_list, handle_show};
use crate::utils::photocat_toml::{apply_file_to_opts, load_photocat_toml};
use crate::utils::{apply_env_to_opts, load_dotenv, setup_logging};

/// Apply CLI flags over `opts`; only flags the user set.
pub(crate) fn apply_cli_to_opts(global: &GlobalArgs, opts: &mut Opts) {
    if let Some(ref d) = global.data_dir {
        opts.ingest.data_dir = d.clone();
    }
    if let Some(ref p) = global.ffprobe {
        opts.ingest.ffprobe = p.clone();
    }
    if let Some(ref p) = global.ffmpeg {
        opts.ingest.ffmpeg = p.clone();
    }
    if let Some(secs) = global.tool_timeout {
        opts.ingest.tool_timeout = Duration::from_secs(secs);
    }
    if let Some(v) = global.verbose {
        opts.verbose = v;
    }
}

/// Defaults, then `.photocat.toml` in the working directory, then env (`.env` too), then CLI flags.
fn setup_opts(cli: &Cli) -> Opts {
    let mut opts = Opts::default();
    if let Ok(cwd) = std::env::current_dir()
        && let Some(file) = load_photocat_toml(&cwd)
    {
        apply_file_to_opts(&file, &mut opts);
    }
    load_dotenv();
    apply_env_to_opts(&mut opts);
    apply_cli_to_opts(&cli.global, &mut opts);
    if let Commands::Ingest {
        follow_links,
        exclude,
        ..
    } = &cli.command
    {
        if let Some(f) = follow_links {
            opts.ingest.follow_links = *f;
        }
        if !exclude.is_empty() {
            opts.ingest.exclude = exclude.clone();
        }
    }
    setup_logging(opts.verbose);
    opts
}

/// Run the selected subcommand.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = setup_opts(cli);
    debug!("{} CONFIG:{:#?}", env!("CARGO_PKG_NAME").to_uppercase(), opts);
    match &cli.command {
        Commands::Ingest { dir, .. } => handle_ingest(dir, &opts),
        Commands::List {
            sort,
            desc,
            kind,
            json,
        } => handle_list(&opts, *sort, *desc, *kind, *json),
        Commands::Show { path, json } => handle_show(&opts, path, *json),
    }
}

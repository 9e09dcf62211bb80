use std::process::exit;

use colored::Colorize;
use human_panic::setup_panic;
use log::{error, info};

use zipbook::prelude::*;

fn main() {
    setup_panic!();

    let matches = get_matches();

    let log_file = match get_log_file(&matches) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Failed to determine the log file: {e}");
            exit(2);
        }
    };
    if let Err(e) = init_logger(get_verbosity(&matches), &log_file) {
        eprintln!("Failed to initialise logger: {e:#}");
        exit(2);
    }

    if let Err(e) = run(&matches) {
        error!("{e:#}");
        exit(1);
    }
}

fn run(matches: &clap::ArgMatches) -> anyhow::Result<()> {
    let options = build_options(matches)?;

    if options.dry_run {
        print_plan(&plan(&options)?, &options);
        return Ok(());
    }

    let summary = if options.show_progress {
        pack(&options, &ConsoleProgress::new())?
    } else {
        pack(&options, &NoProgress)?
    };

    info!(
        "{}",
        format_message(
            &format!(
                "Packed {} files into {}",
                summary.entries,
                options.output.display()
            ),
            &format!(
                "Packed {} files into {}",
                summary.entries.to_string().bold(),
                options.output.display().to_string().green()
            ),
        )
    );

    Ok(())
}

fn print_plan(plans: &[DirectoryPlan], options: &PackOptions) {
    info!(
        "Dry run, nothing is written to {}",
        options.output.display()
    );
    for directory in plans {
        info!(
            "{}",
            format_message(
                &directory.dir.display().to_string(),
                &directory.dir.display().to_string().bold().to_string(),
            )
        );
        for (record, name) in directory.records.iter().zip(&directory.entry_names) {
            info!(
                "{}",
                format_message(
                    &format!("  {} -> {}", record.path().display(), name),
                    &format!(
                        "  {} -> {}",
                        record.path().display().to_string().dimmed(),
                        name.cyan()
                    ),
                )
            );
        }
    }
}

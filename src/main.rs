use log::{error, info};

use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, Command};

use svd2regs::{generate, Config, SourceType};

fn run() -> Result<()> {
    use irx_config::parsers::{cmd, toml};
    use irx_config::ConfigBuilder;

    let app = Command::new("svd2regs")
        .about("Generate padded register layouts from SVD files")
        .arg(
            Arg::new("input")
                .help("Input SVD file")
                .short('i')
                .action(ArgAction::Set)
                .value_name("FILE"),
        )
        .arg(
            Arg::new("output_dir")
                .long("output-dir")
                .help("Directory to place generated headers")
                .short('o')
                .action(ArgAction::Set)
                .value_name("PATH"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Config TOML file with peripheral naming rules")
                .short('c')
                .action(ArgAction::Set)
                .value_name("TOML_FILE"),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .short('s')
                .action(ArgAction::SetTrue)
                .help("Make advanced checks due to parsing SVD"),
        )
        .arg(
            Arg::new("fail_fast")
                .long("fail-fast")
                .action(ArgAction::SetTrue)
                .help("Abort on the first peripheral whose layout can't be built"),
        )
        .arg(
            Arg::new("log_level")
                .long("log")
                .short('l')
                .help(format!(
                    "Choose which messages to log (overrides {})",
                    env_logger::DEFAULT_FILTER_ENV
                ))
                .action(ArgAction::Set)
                .value_parser(["off", "error", "warn", "info", "debug", "trace"]),
        )
        .version(env!("CARGO_PKG_VERSION"));

    let irxconfig = ConfigBuilder::default()
        .append_parser(
            cmd::ParserBuilder::new(app)
                .exit_on_error(true)
                .use_arg_types(true)
                .build()?,
        )
        .append_parser(
            toml::ParserBuilder::default()
                .default_path("svd2regs.toml")
                .path_option("config")
                .ignore_missing_file(true)
                .build()?,
        )
        .load()?;

    let mut config: Config = irxconfig.get()?;

    setup_logging(&config);

    let input = &mut String::new();
    match config.input.as_ref() {
        Some(file) => {
            config.source_type = SourceType::from_path(file);
            File::open(file)
                .context("Cannot open the SVD file")?
                .read_to_string(input)
                .context("Cannot read the SVD file")?;
        }
        None => {
            let stdin = std::io::stdin();
            stdin
                .lock()
                .read_to_string(input)
                .context("Cannot read from stdin")?;
        }
    }

    let path = config.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&path)
        .with_context(|| format!("Cannot create output directory {}", path.display()))?;

    let generation = generate(input, &config)?;

    for header in &generation.headers {
        let file = path.join(&header.file_name);
        File::create(&file)
            .and_then(|mut f| f.write_all(header.text.as_bytes()))
            .with_context(|| format!("Cannot write {}", file.display()))?;
        info!("Wrote {}", file.display());
    }

    if !generation.failed.is_empty() {
        let names: Vec<_> = generation.failed.iter().map(|(name, _)| name.as_str()).collect();
        bail!(
            "{} peripherals were skipped: {}",
            generation.failed.len(),
            names.join(", ")
        );
    }

    Ok(())
}

fn setup_logging(config: &Config) {
    // * Log at info by default.
    // * Allow users the option of setting complex logging filters using
    //   env_logger's `RUST_LOG` environment variable.
    // * Override both of those if the logging level is set via the `--log`
    //   command line argument.
    let env = env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info");
    let mut builder = env_logger::Builder::from_env(env);
    builder.format_timestamp(None);

    let log_lvl_from_env = std::env::var_os(env_logger::DEFAULT_FILTER_ENV).is_some();

    if log_lvl_from_env {
        log::set_max_level(log::LevelFilter::Trace);
    } else {
        let level = match config.log_level.as_deref() {
            Some(lvl) => lvl.parse().unwrap_or(log::LevelFilter::Info),
            None => log::LevelFilter::Info,
        };
        log::set_max_level(level);
        builder.filter_level(level);
    }

    builder.init();
}

fn main() {
    if let Err(ref e) = run() {
        error!("{:?}", e);

        process::exit(1);
    }
}

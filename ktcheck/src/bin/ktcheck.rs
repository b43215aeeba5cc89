use chrono::{DateTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use ktcheck::{
    crypto::enctype_to_name,
    keytab_checksum,
    report::{self, Format},
    CheckOutcome, Checker, Context, FileKdc, FileSecretStore, Keytab, LogFormat, Principal,
};
use once_cell::sync::Lazy;
use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const PROGNAME: &str = "ktcheck";
const EXIT_CHECK_FAILED: u8 = 2;

static ARGS: Lazy<Args> = Lazy::new(Args::parse);
static NOW: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);
static TIMESTAMP_WIDTH: Lazy<usize> = Lazy::new(|| timestamp_to_sfstring(*NOW).len());

#[derive(Parser)]
#[command(name = PROGNAME, version)]
struct Args {
    /// configuration profile (Default is $KTCHECK_CONFIG or /etc/ktcheck.conf)
    #[arg(long, global = true)]
    config: Option<String>,
    /// principal database file
    #[arg(long, global = true)]
    principal_db: Option<PathBuf>,
    /// directory holding the keytab secrets
    #[arg(long, global = true)]
    secrets_dir: Option<PathBuf>,
    /// prints results as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    /// log filter directives, overrides RUST_LOG and the profile
    #[arg(long, global = true)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct SecretArgs {
    /// name of the keytab secret
    #[arg(short = 's', long)]
    secret: String,
    /// the secret holds raw keytab bytes instead of base64 text
    #[arg(short = 'b', long, default_value_t = false)]
    binary: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Checks that principals exist in the KDC and in a keytab secret
    Check {
        #[command(flatten)]
        secret: SecretArgs,
        #[arg(required = true)]
        principals: Vec<Principal>,
    },
    /// Lists KDC principals, optionally only those present in a keytab secret
    List {
        /// wildcard expression matched against principal names
        #[arg(short = 'f', long, default_value = "*")]
        filter: String,
        /// keeps only principals with keys in this keytab secret
        #[arg(short = 's', long)]
        secret: Option<String>,
        /// the secret holds raw keytab bytes instead of base64 text
        #[arg(short = 'b', long, default_value_t = false)]
        binary: bool,
    },
    /// Adds missing principals and stores their keytab as a secret
    Add {
        #[command(flatten)]
        secret: SecretArgs,
        #[arg(required = true)]
        principals: Vec<Principal>,
    },
    /// Deletes a keytab secret and its principals
    Delete {
        #[command(flatten)]
        secret: SecretArgs,
        #[arg(required = true)]
        principals: Vec<Principal>,
    },
    /// Computes the checksum of principals in a local keytab file
    Checksum {
        /// keytab file
        #[arg(short = 'k', long)]
        keytab: PathBuf,
        #[arg(required = true)]
        principals: Vec<Principal>,
    },
    /// Prints the entries of a local keytab file
    Dump {
        /// shows keytab entry timestamps
        #[arg(short = 't', default_value_t = false)]
        show_time: bool,
        /// shows keytab entry keys
        #[arg(short = 'K', default_value_t = false)]
        show_keys: bool,
        /// shows the encryption type
        #[arg(short = 'e', default_value_t = false)]
        show_etype: bool,
        keytab: PathBuf,
    },
}

fn main() -> ExitCode {
    let format = if ARGS.json { Format::Json } else { Format::Text };
    match run(format) {
        Ok(code) => code,
        Err(err) => {
            let message = report::render_error(&format!("{:#}", err), format);
            match format {
                Format::Json => println!("{}", message),
                Format::Text => eprintln!("{}: {}", PROGNAME, message),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(format: Format) -> anyhow::Result<ExitCode> {
    let context = match &ARGS.config {
        Some(config) => Context::from_file(config),
        None => Context::init(),
    }
    .map_err(|e| anyhow::anyhow!("{:#} while loading configuration", e))?;
    init_logging(&context);

    match &ARGS.command {
        Command::Check { secret, principals } => {
            let outcome = checker(&context)?.check(
                principals,
                &secret.secret,
                binary(&context, secret.binary),
            )?;
            println!("{}", report::render_check(&outcome, format)?);
            if let CheckOutcome::Fail { .. } = outcome {
                return Ok(ExitCode::from(EXIT_CHECK_FAILED));
            }
        }
        Command::List {
            filter,
            secret,
            binary: binary_flag,
        } => {
            let listing = checker(&context)?.list(
                filter,
                secret.as_deref(),
                binary(&context, *binary_flag),
            )?;
            println!("{}", report::render_listing(&listing, format)?);
        }
        Command::Add { secret, principals } => {
            checker(&context)?.provision(
                principals,
                &secret.secret,
                binary(&context, secret.binary),
            )?;
            println!("{}", report::render_success(format)?);
        }
        Command::Delete { secret, principals } => {
            checker(&context)?.revoke(
                principals,
                &secret.secret,
                binary(&context, secret.binary),
            )?;
            println!("{}", report::render_success(format)?);
        }
        Command::Checksum { keytab, principals } => {
            let bytes = fs::read(keytab)
                .map_err(|e| anyhow::anyhow!("{} while reading keytab {}", e, keytab.display()))?;
            let checksum = keytab_checksum(&bytes, principals)?;
            println!("{}", checksum);
        }
        Command::Dump {
            show_time,
            show_keys,
            show_etype,
            keytab,
        } => {
            let options = DumpOptions {
                show_time: *show_time,
                show_keys: *show_keys,
                show_etype: *show_etype,
            };
            do_dump(keytab, options)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn init_logging(context: &Context) {
    let env_filter = match &ARGS.log_filter {
        Some(filter) => EnvFilter::new(filter),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&context.log_filter)),
    };
    let registry = tracing_subscriber::registry().with(env_filter);
    match context.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init(),
    }
}

fn binary(context: &Context, flag: bool) -> bool {
    flag || context.binary_secrets
}

fn checker(context: &Context) -> anyhow::Result<Checker<FileKdc, FileSecretStore>> {
    let principal_db = ARGS
        .principal_db
        .clone()
        .or_else(|| context.principal_db.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("No principal database configured (ktcheck.principal_db or --principal-db)")
        })?;
    let secrets_dir = ARGS
        .secrets_dir
        .clone()
        .or_else(|| context.secrets_dir.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("No secrets directory configured (ktcheck.secrets_dir or --secrets-dir)")
        })?;
    Ok(Checker::new(
        FileKdc::new(principal_db),
        FileSecretStore::new(secrets_dir),
    ))
}

#[derive(Debug, Clone, Copy)]
struct DumpOptions {
    show_time: bool,
    show_keys: bool,
    show_etype: bool,
}

fn do_dump(path: &Path, options: DumpOptions) -> anyhow::Result<()> {
    let bytes = fs::read(path)
        .map_err(|e| anyhow::anyhow!("{} while reading keytab {}", e, path.display()))?;
    let keytab = Keytab::parse(&bytes)
        .map_err(|e| anyhow::anyhow!("{} while scanning keytab", e))?;

    println!("Keytab name: FILE:{}", path.display());
    if options.show_time {
        println!(
            "KVNO Timestamp{} Principal",
            " ".repeat(TIMESTAMP_WIDTH.saturating_sub("Timestamp".len()))
        );
        println!(
            "{} {} {}",
            "-".repeat(4),
            "-".repeat(*TIMESTAMP_WIDTH),
            "-".repeat(73usize.saturating_sub(*TIMESTAMP_WIDTH))
        );
    } else {
        println!("KVNO Principal");
        println!("{} {}", "-".repeat(4), "-".repeat(74));
    }

    for entry in &keytab.entries {
        print!("{:>4} ", entry.vno);
        if options.show_time {
            let timestamp = Utc
                .timestamp_opt(entry.timestamp.into(), 0)
                .single()
                .map(timestamp_to_sfstring)
                .unwrap_or_default();
            print!("{:<width$} ", timestamp, width = *TIMESTAMP_WIDTH);
        }
        print!("{}", entry.principal.unparse_name());
        if options.show_etype {
            print!(" ({}) ", enctype_to_name(entry.key.enctype, false));
        }
        if options.show_keys {
            print!(" (0x{})", hex::encode(&entry.key.contents));
        }
        println!();
    }
    Ok(())
}

fn timestamp_to_sfstring(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%x %X").to_string()
}

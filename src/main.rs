#![deny(clippy::unwrap_used)]

use clap::{arg, command, value_parser};
use std::path::{Path, PathBuf};
use std::process::exit;
use std::time::Duration;

use hmc8012ctrl::{Address, Device, Error, Result};

const FUNCTION_NAMES: [&str; 11] = [
    "dcv", "acv", "dci", "aci", "res", "fres", "cap", "temp", "freq", "cont", "diod",
];

#[tokio::main]
async fn main() {
    env_logger::init();

    let matches = command!() // requires `cargo` feature
        .arg(arg!(
            <ADDRESS> "IP address (e.g. 192.168.0.2) or COM port (e.g. COM3)"
        ))
        .arg(
            arg!(
                -t --timeout <MS> "Command timeout in milliseconds"
            )
            .default_value("5000")
            .value_parser(value_parser!(u64)),
        )
        .arg(
            arg!(
                -o --output <FILE> "Result file"
            )
            .default_value("result.txt")
            .value_parser(value_parser!(PathBuf)),
        )
        .subcommand(
            clap::Command::new("measure")
                .about("Trigger a single measurement")
                .arg(
                    arg!([function] "Configure this measurement function first")
                        .value_parser(FUNCTION_NAMES),
                )
                .arg(
                    arg!([range] "Range: AUTO or a fixed value in instrument units")
                        .default_value("AUTO"),
                )
                .arg(
                    arg!(
                        -d --delay <SECONDS> "Wait before measuring"
                    )
                    .default_value("0")
                    .value_parser(value_parser!(f64)),
                ),
        )
        .subcommand(
            clap::Command::new("range")
                .about("Select a measurement function and range without measuring")
                .arg(arg!(<function> "Measurement function").value_parser(FUNCTION_NAMES))
                .arg(arg!(<range> "Range: AUTO or a fixed value in instrument units")),
        )
        .subcommand(clap::Command::new("reset").about("Reset the instrument to factory defaults"))
        .subcommand(clap::Command::new("ident").about("Device identification"))
        .subcommand_required(true)
        .get_matches();

    let output = matches
        .get_one::<PathBuf>("output")
        .expect("Requires output parameter")
        .clone();

    match run(&matches).await {
        Ok(result) => {
            write_result(&output, &[&result]);
        }
        Err(e) => {
            eprintln!("Operation failed: {}", e);
            write_result(&output, &["ERR", &e.to_string()]);
            exit(exit_code(&e));
        }
    }
}

async fn run(matches: &clap::ArgMatches) -> Result<String> {
    let address = matches
        .get_one::<String>("ADDRESS")
        .expect("Requires address parameter");
    let address = Address::parse(address)?;
    let timeout = Duration::from_millis(
        *matches
            .get_one::<u64>("timeout")
            .expect("Requires timeout parameter"),
    );

    let mut device = Device::connect(&address, timeout).await?;
    let outcome = handle_args(&mut device, matches.subcommand()).await;
    // Teardown runs on every path once the connection was opened
    device.close().await;
    outcome
}

async fn handle_args(
    device: &mut Device,
    subcommand: Option<(&str, &clap::ArgMatches)>,
) -> Result<String> {
    match subcommand {
        Some(("measure", args)) => {
            let delay = *args.get_one::<f64>("delay").expect("Requires delay parameter");
            if delay < 0.0 {
                return Err(Error::InvalidArgument(format!(
                    "delay must be >= 0, got {}",
                    delay
                )));
            }
            if let Some(function) = args.get_one::<String>("function") {
                let range = args.get_one::<String>("range").expect("Requires range parameter");
                device.set_range(function, range).await?;
            }
            if delay > 0.0 {
                eprintln!("Waiting {}s for device positioning...", delay);
                tokio::time::sleep(Duration::from_secs_f64(delay)).await;
            }
            let value = device.measure().await?;
            println!("Result: {}", value);
            Ok(value.to_string())
        }
        Some(("range", args)) => {
            let function = args
                .get_one::<String>("function")
                .expect("Requires function parameter");
            let range = args.get_one::<String>("range").expect("Requires range parameter");
            device.set_range(function, range).await?;
            println!("OK");
            Ok("OK".to_string())
        }
        Some(("reset", _args)) => {
            device.reset().await?;
            println!("OK");
            Ok("OK".to_string())
        }
        Some(("ident", _args)) => {
            let identity = device.identify().await?;
            println!("{}", identity);
            Ok(identity)
        }
        _ => unreachable!("subcommand is required"),
    }
}

fn write_result(path: &Path, lines: &[&str]) {
    let mut contents = lines.join("\n");
    contents.push('\n');
    if let Err(err) = std::fs::write(path, contents) {
        eprintln!("Failed to write {}: {}", path.display(), err);
        exit(1);
    }
}

fn exit_code(err: &Error) -> i32 {
    match err {
        Error::InvalidAddress(_) | Error::InvalidArgument(_) => 2,
        Error::Io(_) | Error::Serial(_) | Error::Timeout(_) | Error::NotConnected => 3,
        Error::Protocol(_) => 4,
        Error::Instrument { .. } => 5,
        Error::Overflow(_) => 6,
    }
}

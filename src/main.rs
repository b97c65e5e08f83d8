extern crate clap;
extern crate env_logger;
extern crate error_chain;
#[macro_use]
extern crate log;
extern crate sirenofshame;

use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use error_chain::ChainedError;

use sirenofshame::{BackendKind, Config, ControlOverrides, Device, Result};
use sirenofshame::backends::Backend;
use sirenofshame::protocol::usbhid::MANUAL_LED_COUNT;

#[derive(Debug, Parser)]
#[command(name = "sirenofshame", version, about = "Talk to a Siren of Shame build siren")]
struct Args {
    /// Transport to open the siren with: hid or usb
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    /// Per-transfer timeout in milliseconds
    #[arg(long, global = true, default_value_t = 10_000, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_ms: u64,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the device info block
    Info,
    /// List LED and audio patterns
    Patterns,
    /// Info block and both pattern lists
    All,
    /// Start an LED and/or audio pattern
    Play {
        /// LED pattern id
        #[arg(long)]
        led: Option<u8>,
        /// How long the LED pattern runs, in milliseconds
        #[arg(long)]
        led_duration: Option<u16>,
        /// Audio pattern id
        #[arg(long)]
        audio: Option<u8>,
        /// How long the audio pattern runs, in milliseconds
        #[arg(long)]
        audio_duration: Option<u16>,
    },
    /// Set the manual LED channels
    Leds {
        /// One level per channel; 255 leaves a channel unchanged
        #[arg(num_args = MANUAL_LED_COUNT, required = true)]
        levels: Vec<u8>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn fail(e: &sirenofshame::Error, code: i32) -> ! {
    eprint!("{}", e.display_chain());
    process::exit(code);
}

fn run(command: Command, siren: &mut Device<Backend>) -> Result<()> {
    match command {
        Command::Info => println!("{}", siren.read_info()?),
        Command::Patterns => {
            println!("LED patterns:");
            for pattern in siren.read_led_patterns()? {
                println!("  {}", pattern);
            }
            println!("Audio patterns:");
            for pattern in siren.read_audio_patterns()? {
                println!("  {}", pattern);
            }
        }
        Command::All => println!("{}", siren.read_all_info()?),
        Command::Play { led, led_duration, audio, audio_duration } => {
            let mut overrides = ControlOverrides::new();
            overrides.led_mode = led;
            overrides.led_play_duration = led_duration;
            overrides.audio_mode = audio;
            overrides.audio_play_duration = audio_duration;

            if overrides.is_empty() {
                warn!("Nothing to play; sending an empty control packet");
            }
            siren.send_control_packet(&overrides)?;
        }
        Command::Leds { levels } => {
            let overrides = levels
                .iter()
                .enumerate()
                .fold(ControlOverrides::new(), |o, (i, &level)| o.manual_led(i, level));
            siren.send_control_packet(&overrides)?;
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = Config::default().with_timeout(Duration::from_millis(args.timeout_ms));
    if let Some(backend) = args.backend {
        config = config.with_backend(backend);
    }

    let mut siren = match sirenofshame::connect(&config) {
        Ok(siren) => siren,
        Err(ref e) if e.is_not_found() => fail(e, 2),
        Err(ref e) => fail(e, 1),
    };

    if let Err(ref e) = run(args.command, &mut siren) {
        fail(e, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leds_takes_exactly_five_levels() {
        let args = Args::try_parse_from(["sirenofshame", "leds", "0", "64", "128", "255", "10"]).unwrap();
        match args.command {
            Command::Leds { ref levels } => assert_eq!(levels, &vec![0, 64, 128, 255, 10]),
            ref other => panic!("unexpected command {:?}", other),
        }

        assert!(Args::try_parse_from(["sirenofshame", "leds", "1", "2", "3"]).is_err());
        assert!(Args::try_parse_from(["sirenofshame", "leds", "1", "2", "3", "4", "5", "6"]).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(Args::try_parse_from(["sirenofshame", "--timeout-ms", "0", "info"]).is_err());

        let args = Args::try_parse_from(["sirenofshame", "--timeout-ms", "250", "info"]).unwrap();
        assert_eq!(args.timeout_ms, 250);
    }

    #[test]
    fn backend_flag_parses() {
        let args = Args::try_parse_from(["sirenofshame", "--backend", "usb", "all"]).unwrap();
        assert_eq!(args.backend, Some(BackendKind::Usb));
        assert!(Args::try_parse_from(["sirenofshame", "--backend", "serial", "all"]).is_err());
    }
}

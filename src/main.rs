use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scorebox::commands;
use scorebox::firmware::CertStyle;
use scorebox::firmware::cert::{DEFAULT_INPUT, DEFAULT_OUTPUT, DEFAULT_VAR};
use scorebox::firmware::ota::{DEFAULT_CHIP, DEFAULT_ESPTOOL, Esptool};

#[derive(Parser)]
#[command(name = "scorebox")]
#[command(about = "Build helpers for the scoring device firmware")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw the connection sets of a layout file
    Render {
        /// Layout file (YAML)
        #[arg(long, short)]
        layout: String,
        /// Only render these sets (comma-separated or repeat flag)
        #[arg(long, short, value_delimiter = ',')]
        set: Vec<String>,
    },
    /// Print the solved column of every terminal
    Positions {
        /// Layout file (YAML)
        #[arg(long, short)]
        layout: String,
    },
    /// Embed a PEM certificate into a C source file
    EmbedCert {
        /// PEM certificate to embed
        #[arg(long, short, default_value = DEFAULT_INPUT)]
        input: String,
        /// C source file to write
        #[arg(long, short, default_value = DEFAULT_OUTPUT)]
        output: String,
        /// Name of the C variable
        #[arg(long, default_value = DEFAULT_VAR)]
        var: String,
        /// Layout of the generated source
        #[arg(long, value_enum, default_value_t = CertStyle::Bytes)]
        style: CertStyle,
    },
    /// Print extra C++ flags for the build frameworks
    Flags {
        /// Build frameworks (comma-separated or repeat flag)
        #[arg(long, short, value_delimiter = ',')]
        framework: Vec<String>,
    },
    /// Copy the OTA image and merge a full flash image with esptool
    MergeOta {
        /// PlatformIO build environment name
        #[arg(long, short)]
        env: String,
        /// Project root containing .pio, bootloader and partition_table
        #[arg(long, default_value = ".")]
        project_dir: String,
        /// Target chip passed to esptool
        #[arg(long, default_value = DEFAULT_CHIP)]
        chip: String,
        /// esptool executable
        #[arg(long, default_value = DEFAULT_ESPTOOL)]
        esptool: String,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("warning: logging disabled: {}", e);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Render { layout, set } => commands::render(&layout, &set),
        Commands::Positions { layout } => commands::positions(&layout),
        Commands::EmbedCert {
            input,
            output,
            var,
            style,
        } => commands::embed_cert(&input, &output, &var, style),
        Commands::Flags { framework } => {
            commands::flags(&framework);
            Ok(())
        }
        Commands::MergeOta {
            env,
            project_dir,
            chip,
            esptool,
        } => commands::merge_ota(
            &project_dir,
            &env,
            Esptool {
                program: esptool,
                chip,
            },
        ),
    };

    if let Err(e) = result {
        eprint!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        init_logging(0);
        init_logging(2);
    }
}

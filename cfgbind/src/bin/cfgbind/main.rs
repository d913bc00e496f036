mod commands;
mod examples;
mod output;
mod theme;

use anyhow::Result;
use clap::{
    ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand,
    builder::{Styles, styling::Style},
    error::ErrorKind,
};

use colored::{Colorize, control::ShouldColorize};
use std::fmt::Write;
use std::io::{self, Write as IoWrite};

use commands::{
    generate::{GenerateArgs, handle_generate},
    inspect::{InspectArgs, handle_inspect},
    scan::{ScanArgs, handle_scan},
};
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::{ICONS, THEME, Tone};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("RUST_LOG", "Log filter, e.g. cfgbind_build=debug (overrides --verbose)"),
    ("OUT_DIR", "Default output directory of the generator inside build scripts"),
];

#[derive(Parser)]
#[command(name = "cfgbind")]
#[command(version)]
#[command(
    about = "Inspect and generate cfgbind configuration bindings",
    long_about = r#"Configuration binding tool for cfgbind that provides:

• Discovery of #[generate_config] types and their #[entry] constants
• Ahead-of-time generation of binding code with an incremental cache
• A raw view of persisted config files

Commands:
  scan      List marked types and their entries
  generate  Write binding files to a directory
  inspect   Show the sections and keys of a config file
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List #[generate_config] types and their entries
    Scan(ScanArgs),

    /// Generate binding files into a directory
    Generate(GenerateArgs),

    /// Show the persisted entries of a config file
    Inspect(InspectArgs),
}

impl Cli {
    fn parse_with_styles() -> Self {
        let use_color = detect_color_support();
        let matches = build_cli_command(use_color)
            .styles(help_styles())
            .try_get_matches()
            .unwrap_or_else(|err| exit_with_clap_error(err, use_color));
        Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
    }
}

/// Print help, version and usage errors with a blank line of padding.
fn exit_with_clap_error(err: clap::Error, use_color: bool) -> ! {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            padded(io::stdout(), || print_clap_message(&err, "help"));
            std::process::exit(0);
        }
        ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let mut command = build_cli_command(use_color).styles(help_styles());
            padded(io::stderr(), || {
                eprintln!("error: 'cfgbind' requires a subcommand but one was not provided\n");
                let mut stderr = io::stderr();
                if command.write_long_help(&mut stderr).is_ok() {
                    let _ = stderr.write_all(b"\n");
                }
            });
            std::process::exit(err.exit_code());
        }
        _ => {
            padded(io::stderr(), || print_clap_message(&err, "error"));
            std::process::exit(err.exit_code());
        }
    }
}

fn print_clap_message(err: &clap::Error, what: &str) {
    if let Err(print_err) = err.print()
        && print_err.kind() != io::ErrorKind::BrokenPipe
    {
        eprintln!("Failed to display {what}: {print_err}");
    }
}

fn padded<W: IoWrite>(mut stream: W, body: impl FnOnce()) {
    let _ = blank_line(&mut stream);
    body();
    let _ = blank_line(&mut stream);
}

fn blank_line<W: IoWrite>(stream: &mut W) -> io::Result<()> {
    stream.write_all(b"\n")?;
    stream.flush()
}

fn build_cli_command(use_color: bool) -> Command {
    let mut command = Cli::command()
        .after_long_help(render_top_level_appendix(use_color))
        .color(if use_color { ColorChoice::Auto } else { ColorChoice::Never });

    for example in command_examples() {
        let help_text = render_examples(example.groups, use_color);
        command = command.mut_subcommand(example.name, |subcommand| subcommand.after_long_help(help_text));
    }
    command
}

fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "{}", stylize("Examples:", THEME.accent, true, use_color));

    for (index, group) in groups.iter().enumerate() {
        if index > 0 {
            buffer.push('\n');
        }
        let _ = writeln!(buffer, "  {}", stylize(group.title, THEME.heading, true, use_color));
        for command in group.commands {
            let _ = writeln!(
                buffer,
                "    {} {}",
                stylize(ICONS.arrow, THEME.muted, false, use_color),
                stylize(command, THEME.value, false, use_color)
            );
        }
    }

    buffer
}

fn render_top_level_appendix(use_color: bool) -> String {
    let mut buffer = String::new();

    let _ = writeln!(buffer, "{}", stylize("Environment Variables:", THEME.accent, true, use_color));
    for (key, description) in ENVIRONMENT_VARIABLES {
        let _ = writeln!(
            buffer,
            "  {}  {}",
            stylize(key, THEME.key, true, use_color),
            stylize(description, THEME.value, false, use_color)
        );
    }

    let _ = writeln!(
        buffer,
        "\n{} {}",
        stylize("Tip:", THEME.accent, true, use_color),
        stylize(
            "Use 'cfgbind <command> --help' to view examples for each command.",
            THEME.muted,
            false,
            use_color
        )
    );

    buffer
}

fn stylize(text: &str, tone: Tone, bold: bool, use_color: bool) -> String {
    match (use_color, bold) {
        (false, _) => text.to_string(),
        (true, false) => tone.paint(text).to_string(),
        (true, true) => tone.paint(text).bold().to_string(),
    }
}

fn detect_color_support() -> bool {
    ShouldColorize::from_env().should_colorize()
}

fn help_styles() -> Styles {
    let style = |tone: Tone| Style::new().fg_color(Some(tone.help.into()));
    Styles::styled()
        .usage(style(THEME.heading).bold())
        .header(style(THEME.accent).bold())
        .literal(style(THEME.key))
        .placeholder(style(THEME.muted))
        .valid(style(THEME.success))
        .invalid(style(THEME.warning))
        .error(style(THEME.error).bold())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "cfgbind=debug,cfgbind_build=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

fn main() {
    let cli = Cli::parse_with_styles();
    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut stdout = io::stdout();
    let _ = blank_line(&mut stdout);
    let outcome = execute(cli);
    let _ = blank_line(&mut stdout);

    if outcome.is_err() {
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> Result<()> {
    let output = OutputManager::new(GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        no_color: cli.no_color,
    });

    let result = match cli.command {
        Commands::Scan(args) => handle_scan(args, &output),
        Commands::Generate(args) => handle_generate(args, &output),
        Commands::Inspect(args) => handle_inspect(args, &output),
    };

    if let Err(err) = &result {
        output.error(&format!("{err:#}"));
    }
    result
}

// Command-line interface for wordml
//
// Converts WordprocessingML packages (.docx) to single-file HTML with the wordml-html library.
//
// Usage:
//  wordml <input.docx> [--output <file>]            - Convert to HTML (default)
//  wordml convert <input.docx> [--output <file>]    - Same as above (explicit)
//  wordml generate-css                              - Print the base stylesheet
//
// Configuration is read from the embedded defaults, ./wordml.toml when present, and --config.
//
// Extra Parameters:
//
// Conversion options can be overridden with --extra-<name> <value>; boolean options may omit
// the value. The "extra-" prefix is stripped and the name is matched against the known
// overrides in apply_config_overrides.
// Example:
//  wordml report.docx --extra-title "Quarterly report" --extra-balloons

use clap::{Arg, ArgAction, Command, ValueHint};
use std::collections::HashMap;
use std::fs;
use wordml_config::{Loader, MeasurementMode, WordmlConfig};
use wordml_html::{base_stylesheet, convert_to_html_string, ConvertSettings, ZipPackage};

const SUBCOMMANDS: &[&str] = &["convert", "generate-css", "help"];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];
        let key = arg
            .strip_prefix("--extra-")
            .or_else(|| arg.strip_prefix("--extras-"));

        if let Some(key) = key {
            let has_value = args.get(i + 1).is_some_and(|next| !next.starts_with('-'));
            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("wordml")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert WordprocessingML documents to HTML")
        .long_about(
            "wordml converts .docx documents to a single HTML file with a generated stylesheet.\n\n\
            Commands:\n  \
            - convert:      Convert a document (default command)\n  \
            - generate-css: Print the stylesheet every converted document starts from\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to override configuration.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            wordml report.docx                          # HTML to stdout\n  \
            wordml report.docx -o report.html           # HTML to a file\n  \
            wordml report.docx --extra-inline-styles    # style attributes instead of classes\n  \
            wordml generate-css > base.css"
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a wordml.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log conversion details to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a document to HTML (default command)")
                .long_about(
                    "Convert a .docx document to HTML.\n\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\n\
                    Examples:\n  \
                    wordml convert input.docx                 # HTML to stdout\n  \
                    wordml convert input.docx -o out.html     # HTML to a file\n  \
                    wordml input.docx                         # 'convert' is optional"
                )
                .arg(
                    Arg::new("input")
                        .help("Input .docx path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("generate-css")
                .about("Output the base CSS of converted documents")
                .long_about(
                    "Outputs the general rules, the configured additional rules and the\n\
                    tooltip rules that every converted document carries. Generated\n\
                    classes are document specific and not included.\n\n\
                    Examples:\n  \
                    wordml generate-css                   # Print CSS to stdout\n  \
                    wordml generate-css > base.css        # Save to file"
                ),
        )
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A leading file argument means the convert subcommand was left out.
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);
                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    init_logging(matches.get_flag("verbose"));

    let mut config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    apply_config_overrides(&mut config, &mut extra_params);
    for key in extra_params.keys() {
        log::warn!("ignoring unknown parameter --extra-{key}");
    }
    let settings = ConvertSettings::from(&config);

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(input, output, &settings);
        }
        Some(("generate-css", _)) => {
            handle_generate_css_command(&settings);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

/// Handle the convert command
fn handle_convert_command(input: &str, output: Option<&str>, settings: &ConvertSettings) {
    let package = ZipPackage::open(input).unwrap_or_else(|e| {
        eprintln!("Error reading package '{input}': {e}");
        std::process::exit(1);
    });

    let html = convert_to_html_string(&package, settings).unwrap_or_else(|e| {
        eprintln!("Conversion error: {e}");
        std::process::exit(1);
    });

    match output {
        Some(path) => {
            fs::write(path, html).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
            log::info!("wrote {path}");
        }
        None => print!("{html}"),
    }
}

/// Handle the generate-css command
fn handle_generate_css_command(settings: &ConvertSettings) {
    print!("{}", base_stylesheet(settings));
}

fn load_cli_config(explicit_path: Option<&str>) -> WordmlConfig {
    let loader = Loader::new().with_optional_file("wordml.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

fn apply_config_overrides(config: &mut WordmlConfig, extra_params: &mut HashMap<String, String>) {
    if let Some(raw) = take_override(extra_params, &["title", "page-title"]) {
        config.html.page_title = raw;
    }
    if let Some(raw) = take_override(extra_params, &["css-prefix", "class-prefix"]) {
        config.html.css_class_prefix = raw;
    }
    if let Some(raw) = extra_params.remove("inline-styles") {
        config.html.fabricate_css_classes = !parse_bool_arg("inline-styles", &raw);
    }
    if let Some(path) = take_override(extra_params, &["css", "css-path"]) {
        config.html.additional_css = fs::read_to_string(&path).unwrap_or_else(|e| {
            eprintln!("Error reading CSS file '{path}': {e}");
            std::process::exit(1);
        });
    }

    if let Some(raw) = take_override(extra_params, &["revisions", "track-changes"]) {
        config.revisions.display = parse_bool_arg("revisions", &raw);
    }
    if let Some(raw) = extra_params.remove("comments") {
        config.comments.display = parse_bool_arg("comments", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["balloons", "comment-balloons"]) {
        config.comments.as_balloon = parse_bool_arg("balloons", &raw);
    }

    if let Some(raw) = extra_params.remove("strict-languages") {
        config.restrictions.supported_languages_only = parse_bool_arg("strict-languages", &raw);
    }
    if let Some(raw) = extra_params.remove("strict-numbering") {
        config.restrictions.supported_numbering_formats_only =
            parse_bool_arg("strict-numbering", &raw);
    }

    if let Some(raw) = extra_params.remove("approximate") {
        config.measurement.mode = if parse_bool_arg("approximate", &raw) {
            MeasurementMode::Approximate
        } else {
            MeasurementMode::System
        };
    }
    if let Some(raw) = extra_params.remove("images") {
        config.images.embed = parse_bool_arg("images", &raw);
    }
}

fn take_override(map: &mut HashMap<String, String>, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = map.remove(*key) {
            return Some(value);
        }
    }
    None
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => {
            eprintln!("Invalid boolean value '{other}' for --extra-{flag}");
            std::process::exit(1);
        }
    }
}

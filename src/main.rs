// src/main.rs

use clap::Parser;
use dataset_finder::app_logic::{
    AppEvent, CheckState, DatasetFinderLogic, MessageSeverity, RawSelection, ThemeItemDescriptor,
    UiCommand,
};
use dataset_finder::core::{
    AppConfig, ConfigManagerOperations, CoreCatalogLoader, CoreConfigManager, CoreTaxonomyLoader,
    YearIntervalMode,
};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

const APP_NAME: &str = "DatasetFinder";

const EXIT_STARTUP_FAILURE: u8 = 1;
const EXIT_INVALID_INPUT: u8 = 2;

/// Command-line front end for the dataset selection form
#[derive(Parser, Debug)]
#[command(name = "dataset_finder")]
#[command(about = "Count catalog datasets matching a theme, granularity and scope selection")]
struct Args {
    /// Dataset catalog (JSON array), overrides the configured path
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Taxonomy document (themes and granularity levels), overrides the configured path
    #[arg(long)]
    taxonomy: Option<PathBuf>,

    /// Theme to tick; its sub-themes are ticked too. Repeatable.
    #[arg(short, long = "theme")]
    themes: Vec<String>,

    /// Coarsest acceptable spatial granularity (level name or rank)
    #[arg(long, default_value = "")]
    spatial_granularity: String,

    /// Coarsest acceptable temporal granularity (level name or rank)
    #[arg(long, default_value = "")]
    temporal_granularity: String,

    /// Spatial scope level a dataset must cover, e.g. "Region"
    #[arg(long, default_value = "")]
    spatial_scope: String,

    /// Year for the temporal scope
    #[arg(short, long, default_value = "")]
    year: String,

    /// Treat the year as the whole calendar year instead of its first instant
    #[arg(long)]
    full_year: bool,

    /// Print the theme tree and granularity levels, then exit
    #[arg(long)]
    list_themes: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Store the effective catalog/taxonomy paths and options as the new defaults
    #[arg(long)]
    save_config: bool,
}

fn init_logging(level_text: &str) {
    let level = LevelFilter::from_str(level_text).unwrap_or(LevelFilter::Info);
    let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    if let Err(e) = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("Failed to initialise logging: {e}");
    }
    if LevelFilter::from_str(level_text).is_err() {
        log::warn!("Main: Unknown log level '{level_text}', using info.");
    }
}

fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(path) = &args.catalog {
        config.catalog_path = path.clone();
    }
    if let Some(path) = &args.taxonomy {
        config.taxonomy_path = path.clone();
    }
    if args.full_year {
        config.year_interval = YearIntervalMode::FullYear;
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
}

fn print_theme_items(items: &[ThemeItemDescriptor], depth: usize) {
    for item in items {
        let mark = if item.state == CheckState::Checked { "x" } else { " " };
        println!("{}[{mark}] {}", "  ".repeat(depth), item.text);
        print_theme_items(&item.children, depth + 1);
    }
}

/*
 * Renders one command on the terminal. The theme tree and granularity choices
 * are only printed when listing; everything else that is not a message goes to
 * the log.
 */
fn render_command(command: &UiCommand, listing: bool) {
    match command {
        UiCommand::SetWindowTitle { title } => log::debug!("Main: Form title '{title}'."),
        UiCommand::PopulateThemeTree { items } => {
            if listing {
                println!("Themes:");
                print_theme_items(items, 1);
            }
        }
        UiCommand::PopulateGranularityOptions { axis, options } => {
            if listing {
                println!("{axis} granularity levels: {}", options.join(", "));
            }
        }
        UiCommand::UpdateThemeCheckState { theme, new_state } => {
            log::trace!("Main: '{theme}' is now {new_state:?}.");
        }
        UiCommand::ShowMessage {
            severity,
            title,
            text,
        } => match severity {
            MessageSeverity::Information => println!("{text}"),
            MessageSeverity::Warning | MessageSeverity::Error => eprintln!("{title}: {text}"),
        },
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config_manager = CoreConfigManager::new();
    let (mut config, config_error) = match config_manager.load_config(APP_NAME) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    apply_overrides(&mut config, &args);
    init_logging(&config.log_level);

    if let Some(e) = config_error {
        log::warn!("Main: Could not read the configuration, using defaults: {e}");
    }
    if args.save_config {
        match config_manager.save_config(APP_NAME, &config) {
            Ok(()) => log::info!("Main: Saved configuration."),
            Err(e) => log::error!("Main: Failed to save configuration: {e}"),
        }
    }

    let mut logic = match DatasetFinderLogic::load(
        &config,
        &CoreTaxonomyLoader::new(),
        &CoreCatalogLoader::new(),
    ) {
        Ok(logic) => logic,
        Err(e) => {
            log::error!("Main: Startup failed: {e}");
            eprintln!("{e}");
            return ExitCode::from(EXIT_STARTUP_FAILURE);
        }
    };

    for command in logic.initial_commands() {
        render_command(&command, args.list_themes);
    }
    if args.list_themes {
        return ExitCode::SUCCESS;
    }

    for theme in &args.themes {
        let updates = logic.handle_event(AppEvent::ThemeToggledByUser {
            theme: theme.clone(),
            new_state: CheckState::Checked,
        });
        if updates.is_empty() {
            eprintln!("Unknown theme '{theme}'. Use --list-themes to see the available themes.");
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
        for command in &updates {
            render_command(command, false);
        }
    }

    let form = RawSelection {
        spatial_granularity: args.spatial_granularity.clone(),
        temporal_granularity: args.temporal_granularity.clone(),
        spatial_scope: args.spatial_scope.clone(),
        temporal_scope: args.year.clone(),
    };
    let commands = logic.handle_event(AppEvent::SelectionSubmitted { form });
    for command in &commands {
        render_command(command, false);
    }

    let rejected = commands.iter().any(|command| {
        matches!(
            command,
            UiCommand::ShowMessage {
                severity: MessageSeverity::Error,
                ..
            }
        )
    });
    if rejected {
        ExitCode::from(EXIT_INVALID_INPUT)
    } else {
        ExitCode::SUCCESS
    }
}

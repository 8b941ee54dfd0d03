use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{info, warn};

use kanatype::{
    app::App,
    app_dirs::AppDirs,
    catalog::Catalog,
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    session::GameMode,
    stats::{export_csv, HistoryStore, StatsDb},
    summary::{top_scores, CategoryStats, Statistics},
    trace_init::init_tracing,
    ui,
};

const TICK_RATE_MS: u64 = 100;

/// romaji typing drills for japanese vocabulary
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type the romaji for Japanese words against the clock or your mistake budget. Combos multiply your score, results earn ranks and achievements, and every game is kept in a local history."
)]
pub struct Cli {
    /// game mode (remembered for next time)
    #[clap(short = 'm', long, value_enum)]
    mode: Option<GameMode>,

    /// category id to practise, see --list-categories (remembered for next time)
    #[clap(short = 'c', long)]
    category: Option<String>,

    /// practise every category, forgetting a remembered one
    #[clap(long, conflicts_with = "category")]
    all_categories: bool,

    /// hide the romaji guide under each word
    #[clap(long)]
    no_romaji: bool,

    /// history database to use instead of the default one
    #[clap(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// print the available categories and exit
    #[clap(long)]
    list_categories: bool,

    /// print statistics from the play history and exit
    #[clap(long)]
    stats: bool,

    /// write the play history as csv and exit
    #[clap(long, value_name = "CSV")]
    export: Option<PathBuf>,

    /// delete the play history (achievements are kept) and exit
    #[clap(long)]
    clear_history: bool,
}

impl Cli {
    fn is_command(&self) -> bool {
        self.list_categories || self.stats || self.export.is_some() || self.clear_history
    }

    /// Fold explicit choices into the saved config. Returns true if anything changed.
    fn apply_to(&self, config: &mut Config) -> bool {
        let before = config.clone();
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(category) = &self.category {
            config.category = Some(category.clone());
        }
        if self.all_categories {
            config.category = None;
        }
        *config != before
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(log_dir) = AppDirs::log_dir() {
        init_tracing(&log_dir);
    }

    let catalog = Catalog::embedded()?;

    if let Some(id) = &cli.category {
        if catalog.get(id).is_none() {
            let ids: Vec<&str> = catalog.categories().iter().map(|c| c.id.as_str()).collect();
            Cli::command()
                .error(
                    ErrorKind::InvalidValue,
                    format!("unknown category '{id}', expected one of: {}", ids.join(", ")),
                )
                .exit();
        }
    }

    if cli.is_command() {
        return run_command(&cli, &catalog);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    if cli.apply_to(&mut config) {
        if let Err(err) = config_store.save(&config) {
            warn!(%err, path = %config_store.path().display(), "could not save config");
        }
    }
    if let Some(id) = &config.category {
        if catalog.get(id).is_none() {
            warn!(category = %id, "remembered category no longer exists, playing all");
            config.category = None;
        }
    }
    if cli.no_romaji {
        config.show_romaji = false;
    }

    let store = match open_store(cli.db.as_deref()) {
        Ok(db) => Some(db.with_history_limit(config.history_limit)),
        Err(err) => {
            warn!(%err, "history unavailable, results will not be kept");
            None
        }
    };
    let mut app = App::new(catalog, &config, store)?;
    info!(mode = %config.mode, "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    res
}

fn open_store(path: Option<&Path>) -> Result<StatsDb, kanatype::error::StoreError> {
    match path {
        Some(path) => StatsDb::open(path),
        None => StatsDb::open_default(),
    }
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut last_tick = Instant::now();

    terminal.draw(|f| ui::draw(app, f))?;

    while !app.should_quit() {
        match runner.step() {
            AppEvent::Key(key) => app.on_key(key),
            AppEvent::Resize | AppEvent::Tick => {}
        }

        // Keys arriving faster than the tick rate still move the clock.
        let now = Instant::now();
        app.on_tick(now - last_tick);
        last_tick = now;

        terminal.draw(|f| ui::draw(app, f))?;
    }

    Ok(())
}

fn run_command(cli: &Cli, catalog: &Catalog) -> Result<(), Box<dyn Error>> {
    if cli.list_categories {
        for category in catalog.categories() {
            println!(
                "{:<10} {} {} ({} words)",
                category.id,
                category.icon,
                category.name,
                category.words.len()
            );
        }
    }

    if !(cli.stats || cli.export.is_some() || cli.clear_history) {
        return Ok(());
    }
    let db = open_store(cli.db.as_deref())?;

    if cli.clear_history {
        db.clear()?;
        println!("history cleared");
    }

    if let Some(path) = &cli.export {
        let history = db.read_history()?;
        export_csv(&history, File::create(path)?)?;
        println!("exported {} games to {}", history.len(), path.display());
    }

    if cli.stats {
        print_stats(&db.read_history()?, catalog);
    }

    Ok(())
}

fn print_stats(history: &[kanatype::stats::GameRecord], catalog: &Catalog) {
    let stats = Statistics::from_history(history);

    println!("games played:     {}", stats.total_games);
    println!("average score:    {}", stats.average_score);
    println!("best score:       {} ({})", stats.best_score, stats.best_rank.title);
    println!("average accuracy: {}%", stats.average_accuracy);
    println!("average speed:    {:.2}/s", stats.average_speed);
    println!("correct / wrong:  {} / {}", stats.total_correct, stats.total_wrong);
    println!("max combo:        {}", stats.max_combo);
    println!(
        "favourite:        {}",
        stats.favourite_category.as_deref().unwrap_or("-")
    );

    if history.is_empty() {
        return;
    }

    println!();
    for category in catalog.categories() {
        let per = CategoryStats::for_category(history, &category.id);
        if per.play_count == 0 {
            continue;
        }
        println!(
            "{:<10} played {:>3}  avg {:>4}  best {:>4}  acc {:>3}%",
            category.id, per.play_count, per.average_score, per.best_score, per.average_accuracy
        );
    }

    println!();
    for (place, record) in top_scores(history, 5).iter().enumerate() {
        println!(
            "#{} {:>5}  {}  {}  {}",
            place + 1,
            record.score,
            record.mode.label(),
            record.rank,
            record.timestamp.format("%Y-%m-%d %H:%M")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["kanatype"]);

        assert_eq!(cli.mode, None);
        assert_eq!(cli.category, None);
        assert!(!cli.no_romaji);
        assert!(!cli.is_command());
    }

    #[test]
    fn test_cli_mode() {
        let cli = Cli::parse_from(["kanatype", "-m", "timeattack"]);
        assert_eq!(cli.mode, Some(GameMode::TimeAttack));

        let cli = Cli::parse_from(["kanatype", "--mode", "survival"]);
        assert_eq!(cli.mode, Some(GameMode::Survival));

        assert!(Cli::try_parse_from(["kanatype", "--mode", "zen"]).is_err());
    }

    #[test]
    fn test_cli_commands() {
        let cli = Cli::parse_from(["kanatype", "--export", "out.csv", "--db", "h.db"]);

        assert!(cli.is_command());
        assert_eq!(cli.export, Some(PathBuf::from("out.csv")));
        assert_eq!(cli.db, Some(PathBuf::from("h.db")));
    }

    #[test]
    fn test_category_conflicts_with_all_categories() {
        assert!(Cli::try_parse_from(["kanatype", "-c", "food", "--all-categories"]).is_err());
    }

    #[test]
    fn test_apply_to_config() {
        let mut config = Config::default();

        let cli = Cli::parse_from(["kanatype", "--no-romaji"]);
        assert!(!cli.apply_to(&mut config));

        let cli = Cli::parse_from(["kanatype", "-m", "quick", "-c", "food"]);
        assert!(cli.apply_to(&mut config));
        assert_eq!(config.mode, GameMode::Quick);
        assert_eq!(config.category.as_deref(), Some("food"));
        assert!(!cli.apply_to(&mut config));

        let cli = Cli::parse_from(["kanatype", "--all-categories"]);
        assert!(cli.apply_to(&mut config));
        assert_eq!(config.category, None);
        assert!(config.show_romaji);
    }
}

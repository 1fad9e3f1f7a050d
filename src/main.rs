use std::fs::File;
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use recordgrid::app::{Alert, App, Stores};
use recordgrid::config::AppConfig;
use recordgrid::domain::{Post, User};
use recordgrid::fileio::FileIO;
use recordgrid::service::{ServiceError, Store};
use recordgrid::style::{Style, Theme};

/// Command line options; anything set here overrides the config file
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    users: Option<PathBuf>,
    posts: Option<PathBuf>,
    page_size: Option<usize>,
    log: Option<PathBuf>,
    read_only: bool,
}

/// Parse command line arguments
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let value = |i: usize, flag: &str| -> String {
        match args.get(i + 1) {
            Some(v) => v.clone(),
            None => {
                eprintln!("Error: {} requires an argument", flag);
                std::process::exit(1);
            }
        }
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--config" => {
                parsed.config = Some(PathBuf::from(value(i, "--config")));
                i += 2;
            }
            "--users" => {
                parsed.users = Some(PathBuf::from(value(i, "--users")));
                i += 2;
            }
            "--posts" => {
                parsed.posts = Some(PathBuf::from(value(i, "--posts")));
                i += 2;
            }
            "--page-size" => {
                let raw = value(i, "--page-size");
                match raw.parse::<usize>() {
                    Ok(n) => parsed.page_size = Some(n),
                    Err(_) => {
                        eprintln!("Invalid page size: '{}'", raw);
                        std::process::exit(1);
                    }
                }
                i += 2;
            }
            "--log" => {
                parsed.log = Some(PathBuf::from(value(i, "--log")));
                i += 2;
            }
            "--read-only" => {
                parsed.read_only = true;
                i += 1;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            arg => {
                eprintln!("Unknown option: {}", arg);
                std::process::exit(1);
            }
        }
    }

    parsed
}

fn print_help() {
    eprintln!("recordgrid - A terminal console for user and post records");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    recordgrid [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -c, --config <FILE>    Read settings from a TOML file");
    eprintln!("    --users <FILE>         Users file (.json, .csv or .tsv)");
    eprintln!("    --posts <FILE>         Posts file (.json, .csv or .tsv)");
    eprintln!("    --page-size <N>        Rows per page");
    eprintln!("    --log <FILE>           Write logs to FILE (level from RECORDGRID_LOG)");
    eprintln!("    --read-only            Disable all changes");
    eprintln!("    -h, --help             Print this help message");
}

fn init_logging(log: Option<&PathBuf>) -> io::Result<()> {
    let filter = EnvFilter::try_from_env("RECORDGRID_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false);

    // Logging to the terminal would draw over the alternate screen
    match log {
        Some(path) => {
            let file = File::create(path)?;
            builder.with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::sink).init(),
    }
    Ok(())
}

/// Handle panics gracefully
fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);

        if let Some(location) = info.location() {
            error!(file = location.file(), line = location.line(), "panic occurred");
        } else {
            error!("panic occurred");
        }

        if let Some(s) = info.payload().downcast_ref::<&str>() {
            error!(message = %s);
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            error!(message = %s);
        }

        default_hook(info);
    }));
}

fn load_config(args: &Args) -> io::Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path).map_err(|e| {
            error!(error = %e, "failed to load config");
            io::Error::new(io::ErrorKind::InvalidData, e)
        })?,
        None => AppConfig::default(),
    };

    if let Some(users) = &args.users {
        config.data.users = users.clone();
    }
    if let Some(posts) = &args.posts {
        config.data.posts = posts.clone();
    }
    if let Some(page_size) = args.page_size {
        config.grid.page_size = page_size;
    }
    config.read_only |= args.read_only;
    Ok(config)
}

fn open_stores(config: &AppConfig) -> io::Result<(Stores, Vec<String>)> {
    let to_io = |e: ServiceError| {
        error!(error = %e, "failed to load data");
        io::Error::new(io::ErrorKind::InvalidData, e)
    };

    let (users, mut warnings) = Store::<User>::open(FileIO::new(&config.data.users)).map_err(to_io)?;
    let (posts, post_warnings) = Store::<Post>::open(FileIO::new(&config.data.posts)).map_err(to_io)?;
    warnings.extend(post_warnings);

    let stores = Stores {
        users: Arc::new(Mutex::new(users.read_only(config.read_only))),
        posts: Arc::new(Mutex::new(posts.read_only(config.read_only))),
    };
    Ok((stores, warnings))
}

fn main() -> io::Result<()> {
    let args = parse_args();
    init_logging(args.log.as_ref())?;
    info!("recordgrid started");

    install_panic_hook();

    let config = load_config(&args)?;
    let (stores, warnings) = open_stores(&config)?;

    let theme = Theme::resolve(&config.theme).unwrap_or_else(|e| {
        warn!(theme = %config.theme, error = %e, "theme unavailable, using light");
        Theme::light()
    });

    let mut app = App::new(config.start_tab, config.grid.clone(), stores, Style::with_theme(theme))
        .read_only(config.read_only);

    // Show any warnings from loading (e.g., "New file")
    if !warnings.is_empty() && app.alert.is_none() {
        app.alert = Some(Alert {
            title: "Notice".to_string(),
            ..Alert::success(warnings.join("; "))
        });
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    info!("recordgrid exiting");
    result
}

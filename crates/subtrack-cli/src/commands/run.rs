use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

use subtrack_core::{
    motion::RowAction,
    stats::{StatsLoader, StatsQuery},
    AppConfig, StatsClient,
};
use subtrack_tui::{
    app::{App, Mode, RowMutation},
    event::{AppEvent, EventHandler, LoadResult},
    input::{handle_key_event, mouse_to_pointer, Action},
    widgets::{FooterWidget, StatsSheetWidget, StatusBarWidget, SubscriptionListWidget},
    Theme,
};

type Backend = CrosstermBackend<io::Stdout>;

/// Handles shared by every background task
struct Tasks {
    client: Arc<StatsClient>,
    loader: StatsLoader<StatsClient>,
    tx: mpsc::UnboundedSender<LoadResult>,
}

pub async fn run(config: Arc<AppConfig>) -> Result<()> {
    let client = Arc::new(StatsClient::new(&config.api)?);
    info!(base_url = %client.base_url(), "Starting terminal UI");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("Subtrack"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, config, client).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<Backend>,
    config: Arc<AppConfig>,
    client: Arc<StatsClient>,
) -> Result<()> {
    let mut app = App::new(config.clone(), Theme::default());

    // Channel for async load and mutation results
    let (tx, mut rx) = mpsc::unbounded_channel::<LoadResult>();
    let tasks = Tasks {
        loader: StatsLoader::new(client.clone()),
        client,
        tx,
    };

    // Load initial data
    reload(&mut app, &tasks);

    let event_handler = EventHandler::with_frame_rate(config.ui.tick_rate_ms, config.motion.frame_rate);

    loop {
        // Process any completed loads (non-blocking)
        while let Ok(result) = rx.try_recv() {
            handle_load_result(&mut app, result, &tasks);
        }

        app.tick();

        terminal.draw(|frame| draw(frame, &mut app))?;

        // Poll at the frame rate only while something moves
        let event = if app.is_animating() {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };
        if let Some(event) = event {
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key, &app);
                    handle_action(&mut app, action, &tasks);
                }
                AppEvent::Mouse(mouse) => {
                    if let Some(pointer) = mouse_to_pointer(&mouse, config.ui.cell_width_px) {
                        app.handle_pointer(pointer, mouse.column, mouse.row);
                    }
                }
                AppEvent::Resize(_, _) | AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();

    // Main layout: list + footer + status bar
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(size);

    SubscriptionListWidget::render(frame, main_layout[0], app);
    FooterWidget::render(frame, main_layout[1], app);
    StatusBarWidget::render(frame, main_layout[2], app);

    // The sheet slides over the list
    if app.sheet.is_shown() {
        StatsSheetWidget::render(frame, main_layout[0], app);
    }
}

fn handle_action(app: &mut App, action: Action, tasks: &Tasks) {
    if !matches!(action, Action::None) {
        app.clear_status();
    }

    match action {
        Action::Quit => app.should_quit = true,
        Action::MoveUp => app.move_up(),
        Action::MoveDown => app.move_down(),
        Action::ToggleSheet => app.toggle_sheet(),
        Action::CyclePeriod => {
            if app.cycle_period() {
                spawn_stats_load(app.query(), tasks);
            }
        }
        Action::CycleCategory => {
            app.cycle_category();
            reload_filtered(app, tasks);
        }
        Action::ShowTab(tab) => app.set_tab(tab),
        Action::OpenRail => {
            app.settle_selected(true);
        }
        Action::CloseRail => {
            app.settle_selected(false);
        }
        Action::Row(row_action) => match app.request_action(row_action) {
            Some(command) if command.action == RowAction::Edit => {
                if let Some(row) = app.subscriptions.iter().find(|s| s.id == command.row_id) {
                    let message = format!("Edit {} in the web app", row.name);
                    app.set_status(message);
                }
            }
            Some(_) => {}
            None if app.mode == Mode::Normal => {
                app.set_status("Open the row's actions first (h or swipe left)");
            }
            None => {}
        },
        Action::Refresh => reload(app, tasks),
        Action::Escape => app.escape(),
        Action::Confirm => {
            if let Some(mutation) = app.resolve_pending(true) {
                perform(app, mutation, tasks);
            }
        }
        Action::Cancel => {
            app.resolve_pending(false);
        }
        Action::PickNext => app.step_move_choice(1),
        Action::PickPrev => app.step_move_choice(-1),
        Action::None => {}
    }
}

/// Send a confirmed change to the backend; the reply reloads the list
fn perform(app: &mut App, mutation: RowMutation, tasks: &Tasks) {
    let client = tasks.client.clone();
    let tx = tasks.tx.clone();

    match mutation {
        RowMutation::Delete { id, name } => {
            app.set_status(format!("Deleting {}...", name));
            tokio::spawn(async move {
                let result = match client.delete_subscription(id).await {
                    Ok(()) => LoadResult::Mutated {
                        message: format!("Deleted {}", name),
                    },
                    Err(e) => LoadResult::Failure {
                        context: "Delete",
                        error: e.to_string(),
                    },
                };
                let _ = tx.send(result);
            });
        }
        RowMutation::SetDisabled { id, name, disabled } => {
            tokio::spawn(async move {
                let result = match client.set_disabled(id, disabled).await {
                    Ok(()) => LoadResult::Mutated {
                        message: format!("{} {}", if disabled { "Disabled" } else { "Enabled" }, name),
                    },
                    Err(e) => LoadResult::Failure {
                        context: "Update",
                        error: e.to_string(),
                    },
                };
                let _ = tx.send(result);
            });
        }
        RowMutation::SetCategory { id, name, category_id } => {
            tokio::spawn(async move {
                let result = match client.set_category(id, category_id).await {
                    Ok(()) => LoadResult::Mutated {
                        message: format!("Moved {}", name),
                    },
                    Err(e) => LoadResult::Failure {
                        context: "Move",
                        error: e.to_string(),
                    },
                };
                let _ = tx.send(result);
            });
        }
    }
}

fn handle_load_result(app: &mut App, result: LoadResult, tasks: &Tasks) {
    match result {
        LoadResult::Stats(snapshot) => app.apply_stats(snapshot),
        LoadResult::Subscriptions { ticket, rows } => {
            app.apply_subscriptions(ticket, rows);
        }
        LoadResult::Categories(categories) => {
            if app.apply_categories(categories) {
                reload_filtered(app, tasks);
            }
        }
        LoadResult::Mutated { message } => {
            app.set_status(message);
            reload(app, tasks);
        }
        LoadResult::Failure { context, error } => {
            warn!(context, %error, "Background request failed");
            app.is_loading = false;
            app.set_status(format!("{} failed: {}", context, error));
        }
    }
}

/// Refetch categories, the list and both stats payloads
fn reload(app: &mut App, tasks: &Tasks) {
    let client = tasks.client.clone();
    let tx = tasks.tx.clone();
    tokio::spawn(async move {
        let result = match client.categories().await {
            Ok(categories) => LoadResult::Categories(categories),
            Err(e) => LoadResult::Failure {
                context: "Categories",
                error: e.to_string(),
            },
        };
        let _ = tx.send(result);
    });

    reload_filtered(app, tasks);
}

/// Refetch what depends on the category filter: the list and the stats
fn reload_filtered(app: &mut App, tasks: &Tasks) {
    app.is_loading = true;
    spawn_stats_load(app.query(), tasks);

    let ticket = app.list_generation.begin();
    let category = app.category;
    let client = tasks.client.clone();
    let tx = tasks.tx.clone();
    tokio::spawn(async move {
        let result = match client.subscriptions(category).await {
            Ok(rows) => LoadResult::Subscriptions { ticket, rows },
            Err(e) => LoadResult::Failure {
                context: "Subscriptions",
                error: e.to_string(),
            },
        };
        let _ = tx.send(result);
    });
}

fn spawn_stats_load(query: StatsQuery, tasks: &Tasks) {
    let loader = tasks.loader.clone();
    let tx = tasks.tx.clone();
    tokio::spawn(async move {
        match loader.load(query).await {
            Ok(Some(snapshot)) => {
                let _ = tx.send(LoadResult::Stats(snapshot));
            }
            // Superseded by a newer load
            Ok(None) => {}
            Err(e) => {
                let _ = tx.send(LoadResult::Failure {
                    context: "Stats",
                    error: e.to_string(),
                });
            }
        }
    });
}

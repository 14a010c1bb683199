use anyhow::Result;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use handler::handle_event;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    // Resolve configuration before touching the terminal so a missing
    // credential prints a plain error instead of garbling the screen.
    let mut app = App::new()?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handle_event(app, event).await?;
        }
    }

    Ok(())
}

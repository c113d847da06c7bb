use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{poll, read, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::{App, Outcome};
use crate::input::picker_key;
use crate::ui;

/// How long to wait for input before redrawing (toast expiry)
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Take over the terminal, run the picker until it closes, then restore the terminal.
pub fn run(mut app: App) -> Result<Outcome> {
    enable_raw_mode().context("Failed to enable raw mode - are you in a terminal?")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e).context("Failed to setup terminal");
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            return Err(e).context("Failed to create terminal");
        }
    };

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal (always try to restore even on error)
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    result?;
    Ok(app.outcome().cloned().unwrap_or(Outcome::Cancelled))
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.is_open {
        app.tick();

        terminal.draw(|f| ui::draw(f, app))?;

        if poll(POLL_INTERVAL)? {
            // Resize needs nothing beyond the redraw on the next iteration
            if let Event::Key(key) = read()? {
                if let Some(key) = picker_key(key) {
                    app.handle_key(key);
                }
            }
        }
    }
    Ok(())
}

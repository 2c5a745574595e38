use crate::app::{cell_for, App};
use crate::theme::{particle_color, particle_glyph};
use crossterm::{
    cursor::{Hide, MoveTo},
    execute, queue,
    style::{Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use fireworks_core::SessionState;
use std::io::{self, Write};

pub fn render(stdout: &mut io::Stdout, app: &mut App) -> io::Result<()> {
    let (term_width, term_height) = terminal::size()?;
    app.resize(term_width, term_height);

    execute!(
        stdout,
        Hide,
        SetBackgroundColor(app.theme.bg),
        Clear(ClearType::All)
    )?;

    render_particles(stdout, app, term_width, term_height.saturating_sub(1))?;
    render_banner(stdout, app, term_width, term_height)?;
    render_status_bar(stdout, app, term_width, term_height)?;

    stdout.flush()
}

fn render_particles(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    sky_height: u16,
) -> io::Result<()> {
    let now = app.now();
    for particle in app.engine.surface().particles() {
        let Some((x, y)) = cell_for(particle.position_at(now), term_width, sky_height) else {
            continue;
        };
        queue!(
            stdout,
            MoveTo(x, y),
            SetForegroundColor(particle_color(particle.color)),
            SetBackgroundColor(app.theme.bg),
            Print(particle_glyph(particle.opacity(now)))
        )?;
    }
    Ok(())
}

fn render_banner(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let Some(winner) = &app.winner else {
        return Ok(());
    };
    if !matches!(
        app.session_state(),
        Some(SessionState::Running | SessionState::Draining)
    ) {
        return Ok(());
    }
    let text = format!("{} wins!", winner);
    let x = term_width.saturating_sub(text.chars().count() as u16) / 2;
    let y = term_height.saturating_mul(3) / 4;
    queue!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(app.theme.success),
        SetBackgroundColor(app.theme.bg),
        Print(text)
    )
}

fn render_status_bar(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let y = term_height.saturating_sub(1);
    let state = match app.session_state() {
        Some(SessionState::Running) => "running",
        Some(SessionState::Draining) => "fading",
        Some(SessionState::Finished) => "finished",
        Some(SessionState::Stopped) => "stopped",
        None => "idle",
    };

    queue!(stdout, MoveTo(0, y))?;
    for (key, label) in [("space", "celebrate"), ("s", "stop"), ("w", "wind down"), ("q", "quit")] {
        queue!(
            stdout,
            SetForegroundColor(app.theme.key),
            Print(format!(" {}", key)),
            SetForegroundColor(app.theme.info),
            Print(format!(" {} ", label))
        )?;
    }

    let right = match &app.message {
        Some(msg) => msg.clone(),
        None => format!(
            "{} | {} particles ",
            state,
            app.engine.live_particle_count()
        ),
    };
    let x = term_width.saturating_sub(right.chars().count() as u16);
    queue!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(app.theme.fg),
        Print(right)
    )
}

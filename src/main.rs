use std::{cell::RefCell, io, rc::Rc};

use ratzilla::event::KeyCode;
use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratzilla::ratatui::{Frame, Terminal};
use ratzilla::{DomBackend, WebRenderer};

use scale_collapse::economy::units::{format_distance, format_mass, format_multiplier};
use scale_collapse::{Action, Engine, Snapshot, UpgradeKind};

#[cfg(target_arch = "wasm32")]
type Storage = scale_collapse::LocalStorage;
#[cfg(not(target_arch = "wasm32"))]
type Storage = scale_collapse::MemoryStorage;

/// Host-side state that is not part of the game: the last status message.
struct Host {
    engine: Engine<Storage>,
    status: Option<String>,
}

fn now_ms() -> f64 {
    js_sys::Date::now()
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let host = Rc::new(RefCell::new(Host {
        engine: Engine::start(Storage::default(), now_ms()),
        status: None,
    }));
    let welcome = host
        .borrow()
        .engine
        .offline_gain()
        .map(|gain| format!("Welcome back: +{} while away", format_distance(gain.distance)));
    host.borrow_mut().status = welcome;

    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let host = host.clone();
        move |key_event| {
            let mut host = host.borrow_mut();
            if let KeyCode::Char(c) = key_event.code {
                handle_key(&mut host, c);
            }
        }
    });

    terminal.draw_web(move |f| {
        let mut host = host.borrow_mut();
        host.engine.frame(now_ms());
        let snap = host.engine.snapshot();
        render(f, &snap, host.status.as_deref());
    });

    Ok(())
}

fn handle_key(host: &mut Host, key: char) {
    let now = now_ms();
    if let Some(action) = Action::from_key(key) {
        host.engine.perform(action, now);
        return;
    }
    let settings = host.engine.state().settings.clone();
    match key {
        '+' => host.engine.set_tick_rate(settings.tick_rate + 10, now),
        '-' => host
            .engine
            .set_tick_rate(settings.tick_rate.saturating_sub(10), now),
        ']' => host
            .engine
            .set_auto_save_interval(settings.auto_save_interval + 1, now),
        '[' => host
            .engine
            .set_auto_save_interval(settings.auto_save_interval.saturating_sub(1), now),
        'x' => export(host, now),
        'i' => import(host, now),
        'R' => hard_reset(host),
        _ => {}
    }
}

fn window() -> Option<web_sys::Window> {
    web_sys::window()
}

fn export(host: &mut Host, now: f64) {
    match host.engine.export_save(now) {
        Ok(blob) => {
            if let Some(w) = window() {
                let _ = w.prompt_with_message_and_default("Copy your save:", &blob);
            }
            host.status = Some("Save exported".into());
        }
        Err(e) => host.status = Some(format!("Export failed: {e}")),
    }
}

fn import(host: &mut Host, now: f64) {
    let Some(text) = window().and_then(|w| w.prompt_with_message("Paste a save:").ok().flatten())
    else {
        return;
    };
    host.status = Some(match host.engine.import_save(&text, now) {
        Ok(()) => "Save imported".into(),
        Err(e) => e.to_string(),
    });
}

fn hard_reset(host: &mut Host) {
    let confirmed = window()
        .and_then(|w| w.confirm_with_message("Erase all progress?").ok())
        .unwrap_or(false);
    if confirmed {
        host.engine.hard_reset();
        host.status = Some("Progress erased".into());
    }
}

fn render(f: &mut Frame, snap: &Snapshot, status: Option<&str>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new(Line::from(Span::styled(
        "Scale Collapse",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);
    render_resources(f, snap, content[0]);
    render_shop(f, snap, content[1]);

    let help = status.unwrap_or(
        "keys: listed in brackets | +/- tick rate | [/] autosave | x export | i import | R reset",
    );
    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(help, chunks[2]);
}

fn render_resources(f: &mut Frame, snap: &Snapshot, area: Rect) {
    let mut lines = vec![
        Line::from(format!("Distance: {}", format_distance(snap.distance))),
        Line::from(format!("Speed: {}/s", format_distance(snap.distance_rate))),
        Line::from(format!("Multiplier: {}", format_multiplier(snap.total_distance_multiplier))),
    ];
    if snap.mass_unlocked {
        lines.push(Line::from(format!(
            "Mass: {} (+{}/s)",
            format_mass(snap.mass),
            format_mass(snap.mass_rate)
        )));
    }
    if snap.scale_upgrades_unlocked {
        lines.push(Line::from(format!("Scale Points: {}", snap.scale_points)));
    }
    if snap.dimensions_tab_unlocked {
        lines.push(Line::from(format!(
            "Dimension Points: {} (level {}, next costs {})",
            snap.dimension_points, snap.dimension_level, snap.dimension_cost
        )));
    }
    lines.push(Line::from(""));
    if snap.can_prestige {
        lines.push(Line::from(Span::styled(
            format!("Unit Collapse ready: +{} SP", snap.pending_scale_points),
            Style::default().fg(Color::Yellow),
        )));
    }
    if snap.can_dimension_collapse {
        lines.push(Line::from(Span::styled(
            "Dimension Collapse ready: +1 DP",
            Style::default().fg(Color::Magenta),
        )));
    }
    lines.push(Line::from(format!(
        "{} ticks/s | autosave {}s | collapses {}/{}",
        snap.tick_rate, snap.auto_save_interval, snap.unit_collapses, snap.dimension_collapses
    )));

    let panel = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green))
                .title(" Progress "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(panel, area);
}

fn key_style(enabled: bool) -> Style {
    if enabled {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_shop(f: &mut Frame, snap: &Snapshot, area: Rect) {
    let mut items: Vec<ListItem> = Vec::new();
    for kind in UpgradeKind::all() {
        let view = snap.upgrade(*kind);
        if !view.unlocked {
            continue;
        }
        let price = match kind {
            UpgradeKind::MassVelocity => format_mass(view.cost),
            _ => format_distance(view.cost),
        };
        items.push(ListItem::new(Line::from(vec![
            Span::styled(format!(" [{}] ", Action::Buy(*kind).key()), key_style(view.affordable)),
            Span::raw(format!("{} Lv.{} ({price})", view.name, view.level)),
        ])));
    }
    if snap.scale_upgrades_unlocked || snap.dimensions_tab_unlocked {
        for view in snap.unlocks.iter().filter(|u| u.available && !u.owned) {
            let key = view
                .action
                .parse::<Action>()
                .map(|a| a.key())
                .unwrap_or(' ');
            let currency = if view.paid_with_mass { "g" } else { "SP" };
            items.push(ListItem::new(Line::from(vec![
                Span::styled(format!(" [{key}] "), key_style(view.affordable)),
                Span::raw(format!("{} ({} {currency})", view.name, view.cost)),
            ])));
        }
    }
    if snap.dimensions_tab_unlocked {
        items.push(ListItem::new(Line::from(vec![
            Span::styled(
                format!(" [{}] ", Action::BuyDimension.key()),
                key_style(snap.can_buy_dimension),
            ),
            Span::raw("Buy Dimension"),
        ])));
    }
    items.push(ListItem::new(Line::from(vec![
        Span::styled(format!(" [{}] ", Action::UnitCollapse.key()), key_style(snap.can_prestige)),
        Span::raw("Unit Collapse"),
    ])));
    if snap
        .unlock(scale_collapse::ScaleUnlock::DimensionCollapse)
        .is_some_and(|u| u.owned)
    {
        items.push(ListItem::new(Line::from(vec![
            Span::styled(
                format!(" [{}] ", Action::DimensionCollapse.key()),
                key_style(snap.can_dimension_collapse),
            ),
            Span::raw("Dimension Collapse"),
        ])));
    }

    let shop = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Upgrades "),
    );
    f.render_widget(shop, area);
}

//! Basic example demonstrating dirpanel's footer and sidebars.
//!
//! Run with: cargo run --example basic
//!
//! Controls:
//! - Ctrl+Q: Quit
//! - F1 / F2 / F3: Toggle footer / left sidebar / right sidebar
//! - Tab: Switch to the next document
//! - Mouse: Drag a panel's handle to resize it

use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dirpanel::{
    ActiveDocument, CellMetrics, DirectoryMapping, MemoryStore, PanelConfig, PanelPlugin,
    Placement, PluginContext, PluginRegistry, TerminalMarkdown, Workbench, WorkbenchWidget,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    widgets::{Paragraph, Wrap},
    Terminal,
};

const DOCUMENTS: [&str; 4] = [
    "Goals/2024/plan.md",
    "Projects/dirpanel/readme.md",
    "Inbox/unsorted.md",
    "scratch.md",
];

#[tokio::main]
async fn main() -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

fn sample_store(placement: Placement) -> dirpanel::Result<Arc<MemoryStore>> {
    let mappings = match placement {
        Placement::Footer => vec![
            DirectoryMapping::new("1", "Goals", "**Goals** footer: keep [[Roadmap]] in view"),
            DirectoryMapping::new("2", "*", "_Anywhere_ footer"),
        ],
        Placement::LeftSidebar => vec![DirectoryMapping::new(
            "1",
            "Projects",
            "# Project\n\n- notes\n- tasks\n  - open\n  - done",
        )],
        Placement::RightSidebar => vec![DirectoryMapping::new(
            "1",
            "Inbox",
            "Triage:\n\n1. read\n2. file\n\n```\nmv note Archive/\n```",
        )],
    };
    let config = PanelConfig {
        default_visible: placement == Placement::Footer,
        mappings,
        ..PanelConfig::for_placement(placement)
    };
    Ok(Arc::new(MemoryStore::with_document(config.to_json()?)))
}

async fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> dirpanel::Result<()> {
    let metrics = crossterm::terminal::window_size()
        .map(|size| CellMetrics::from_window_size(&size))
        .unwrap_or_default();
    let workbench = Arc::new(Workbench::new(metrics));
    let size = terminal.size()?;
    workbench.set_terminal_size(Rect::new(0, 0, size.width, size.height));

    let documents = Arc::new(ActiveDocument::new());
    let mut current = 0;
    documents.set(DOCUMENTS[current]);

    let context = PluginContext::new(
        documents.clone(),
        Arc::new(TerminalMarkdown::new()),
        workbench.clone(),
    );

    // One plugin per placement
    let mut registry = PluginRegistry::new();
    for placement in Placement::ALL {
        let plugin = PanelPlugin::new(placement, sample_store(placement)?, context.clone());
        registry.register(plugin).await?;
    }

    // Main event loop
    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            workbench.set_terminal_size(area);

            let status = format!(
                "Active document: {}\n\nF1 footer, F2 left sidebar, F3 right sidebar, Tab next document, Ctrl+Q quit",
                DOCUMENTS[current]
            );
            frame.render_widget(Paragraph::new(status).wrap(Wrap { trim: true }), area);
            frame.render_widget(WorkbenchWidget::new(&workbench), area);
        })?;

        if !event::poll(Duration::from_millis(16))? {
            continue;
        }

        match event::read()? {
            Event::Key(key) => {
                if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    break;
                }

                let command = match key.code {
                    KeyCode::F(1) => Some(Placement::Footer.command_id()),
                    KeyCode::F(2) => Some(Placement::LeftSidebar.command_id()),
                    KeyCode::F(3) => Some(Placement::RightSidebar.command_id()),
                    KeyCode::Tab => {
                        current = (current + 1) % DOCUMENTS.len();
                        documents.set(DOCUMENTS[current]);
                        registry.active_document_changed().await;
                        None
                    }
                    _ => None,
                };
                if let Some(command) = command {
                    registry.execute(command).await?;
                }
            }
            Event::Mouse(mouse) => {
                workbench.dispatch_mouse(&mouse);
            }
            _ => {}
        }
    }

    registry.unload_all();
    Ok(())
}

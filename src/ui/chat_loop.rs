//! Event polling, dispatching, and rendering for the full-screen chat.
//!
//! Terminal input is read on a background task and forwarded over a channel.
//! Each accepted submission runs on its own task; its outcome comes back over
//! a second channel and is settled into the conversation on the UI task, so
//! the conversation itself is never shared.

use std::{error::Error, time::Duration};

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::conversation::{Conversation, PendingExchange};
use crate::core::exchange::ExchangeOutcome;
use crate::core::session::{GeminiSessionFactory, SessionSettings};
use crate::ui::lifecycle::{restore_terminal, setup_terminal, ChatTerminal};
use crate::ui::renderer::ui;
use crate::ui::view::ChatView;

const PAGE_ROWS: u16 = 10;

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

/// Run one accepted exchange in the background and report its outcome.
pub fn dispatch_exchange(
    pending: PendingExchange,
    outcome_tx: mpsc::UnboundedSender<ExchangeOutcome>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let outcome = pending.run().await;
        if outcome_tx.send(outcome).is_err() {
            debug!("chat view closed before the reply arrived");
        }
    })
}

/// Apply one key press. Returns an exchange when Enter produced an accepted
/// submission.
pub fn handle_key(view: &mut ChatView, key: KeyEvent) -> Option<PendingExchange> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Esc => view.should_quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            view.should_quit = true
        }
        KeyCode::Enter => return view.take_submission(),
        KeyCode::Backspace => view.backspace(),
        KeyCode::Char(ch)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            view.insert_char(ch)
        }
        KeyCode::PageUp => view.scroll_up(PAGE_ROWS),
        KeyCode::PageDown => view.scroll_down(PAGE_ROWS),
        KeyCode::Up => view.scroll_up(1),
        KeyCode::Down => view.scroll_down(1),
        KeyCode::End => view.scroll_to_bottom(),
        _ => {}
    }
    None
}

async fn event_loop(
    terminal: &mut ChatTerminal,
    view: &mut ChatView,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
) -> Result<(), Box<dyn Error>> {
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<ExchangeOutcome>();

    while !view.should_quit {
        terminal.draw(|f| ui(f, view))?;

        tokio::select! {
            Some(UiEvent::Crossterm(ev)) = event_rx.recv() => {
                if let Event::Key(key) = ev {
                    if let Some(pending) = handle_key(view, key) {
                        debug!(chars = pending.text().len(), "submitting message");
                        dispatch_exchange(pending, outcome_tx.clone());
                    }
                }
            }
            Some(outcome) = outcome_rx.recv() => {
                view.conversation.settle(outcome);
            }
            else => break,
        }
    }
    Ok(())
}

/// Open the full-screen chat and block until the user quits.
pub async fn run_chat(settings: SessionSettings) -> Result<(), Box<dyn Error>> {
    let model = settings.model.clone();
    let factory = GeminiSessionFactory::new(settings);
    let mut conversation = Conversation::new();
    conversation.mount(&factory);
    let mut view = ChatView::new(conversation, model);

    let mut terminal = setup_terminal()?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    let result = event_loop(&mut terminal, &mut view, &mut event_rx).await;

    event_reader_handle.abort();
    restore_terminal(&mut terminal)?;
    info!("chat closed");
    result
}

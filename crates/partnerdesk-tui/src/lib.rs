// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use partnerdesk_app::{
    AppCommand, AppEvent, AppMode, AppState, CardAction, Dialog, DialogKind, Editor, EditorMode,
    FormKind, FormPayload, Partner, PartnerEditor, PartnerField, Product, Request, RequestCard,
    RequestEditor, RequestField, RequestId, RequestSummary,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

/// Bridge between the UI and the store. The binary implements it over a
/// `PartnerStore`; tests use an in-memory fake.
pub trait AppRuntime {
    fn load_requests(&mut self) -> Result<Vec<RequestSummary>>;
    fn load_products(&mut self) -> Result<Vec<Product>>;
    fn load_partners(&mut self) -> Result<Vec<Partner>>;
    fn load_request(&mut self, request_id: RequestId) -> Result<Request>;
    fn submit_form(&mut self, payload: &FormPayload) -> Result<()>;
    fn delete_request(&mut self, request_id: RequestId) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ViewData {
    help_visible: bool,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    reload_requests(state, runtime);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    info!("ui closed");
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn show_error(state: &mut AppState, title: &str, error: &anyhow::Error) {
    warn!(%title, error = %format!("{error:#}"), "operation failed");
    state.dispatch(AppCommand::ShowDialog(Dialog::error(
        title,
        format!("{error:#}"),
    )));
}

/// Full reload of the request list. Errors surface as a dialog and leave the
/// previous cards in place.
fn reload_requests<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> bool {
    match runtime.load_requests() {
        Ok(summaries) => {
            debug!(count = summaries.len(), "reloaded requests");
            state.dispatch(AppCommand::ReplaceRequests(summaries));
            true
        }
        Err(error) => {
            show_error(state, "load failed", &error);
            false
        }
    }
}

/// Returns true when the app should quit.
fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    match state.mode() {
        AppMode::Dialog => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                state.dispatch(AppCommand::DismissDialog);
            }
            false
        }
        AppMode::ConfirmDelete => {
            handle_confirm_key(state, runtime, view_data, internal_tx, key);
            false
        }
        AppMode::Menu => {
            handle_menu_key(state, runtime, view_data, internal_tx, key);
            false
        }
        AppMode::Editor(_) => {
            handle_editor_key(state, runtime, view_data, internal_tx, key);
            false
        }
        AppMode::List => handle_list_key(state, runtime, view_data, internal_tx, key),
    }
}

fn handle_list_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let len = state.list.len() as isize;
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => {
            state.dispatch(AppCommand::MoveSelection(1));
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.dispatch(AppCommand::MoveSelection(-1));
        }
        KeyCode::Char('g') | KeyCode::Home => {
            state.dispatch(AppCommand::MoveSelection(-len));
        }
        KeyCode::Char('G') | KeyCode::End => {
            state.dispatch(AppCommand::MoveSelection(len));
        }
        KeyCode::Enter | KeyCode::Char('m') => {
            state.dispatch(AppCommand::OpenMenu);
        }
        KeyCode::Char('n') => open_request_editor(state, runtime, None),
        KeyCode::Char('p') => {
            state.dispatch(AppCommand::OpenEditor(Editor::Partner(PartnerEditor::open())));
        }
        KeyCode::Char('r') => {
            if reload_requests(state, runtime) {
                let message = format!("{} requests loaded", state.list.len());
                emit_status(state, view_data, internal_tx, message);
            }
        }
        KeyCode::Char('?') => view_data.help_visible = true,
        _ => {}
    }
    false
}

fn handle_menu_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.dispatch(AppCommand::MoveMenu(1));
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.dispatch(AppCommand::MoveMenu(-1));
        }
        KeyCode::Esc | KeyCode::Char('m') => {
            state.dispatch(AppCommand::CloseMenu);
        }
        KeyCode::Enter => {
            for event in state.dispatch(AppCommand::ChooseMenuAction) {
                if let AppEvent::ActionChosen(action) = event {
                    handle_card_action(state, runtime, view_data, internal_tx, action);
                }
            }
        }
        _ => {}
    }
}

fn handle_card_action<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    action: CardAction,
) {
    debug!(action = action.label(), request_id = action.request_id().get(), "card action");
    match action {
        CardAction::ViewProduct(request_id) => match state.list.product_detail(request_id) {
            Some(detail) => {
                state.dispatch(AppCommand::ShowDialog(Dialog::info(
                    "product",
                    detail.lines().join("\n"),
                )));
            }
            None => emit_status(
                state,
                view_data,
                internal_tx,
                format!("request {request_id} is no longer listed -- press r to reload"),
            ),
        },
        CardAction::Edit(request_id) => open_request_editor(state, runtime, Some(request_id)),
        CardAction::Delete(request_id) => {
            state.dispatch(AppCommand::AskDelete(request_id));
        }
    }
}

fn handle_confirm_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            for event in state.dispatch(AppCommand::ConfirmDelete) {
                if let AppEvent::DeleteConfirmed(request_id) = event {
                    match runtime.delete_request(request_id) {
                        Ok(()) => {
                            info!(request_id = request_id.get(), "request deleted");
                            reload_requests(state, runtime);
                            emit_status(
                                state,
                                view_data,
                                internal_tx,
                                format!("request {request_id} deleted"),
                            );
                        }
                        Err(error) => show_error(state, "delete failed", &error),
                    }
                }
            }
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            state.dispatch(AppCommand::CancelDelete);
        }
        _ => {}
    }
}

/// Loads the choice lists and opens the request editor. `Some(id)` edits the
/// current row for that request.
fn open_request_editor<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    request_id: Option<RequestId>,
) {
    let loaded = (|| -> Result<RequestEditor> {
        let products = runtime.load_products().context("load products")?;
        let partners = runtime.load_partners().context("load partners")?;
        Ok(match request_id {
            Some(request_id) => {
                let request = runtime
                    .load_request(request_id)
                    .with_context(|| format!("load request {request_id}"))?;
                RequestEditor::open_edit(&request, products, partners)
            }
            None => RequestEditor::open_create(products, partners),
        })
    })();
    match loaded {
        Ok(editor) => {
            state.dispatch(AppCommand::OpenEditor(Editor::Request(editor)));
        }
        Err(error) => show_error(state, "cannot open form", &error),
    }
}

fn handle_editor_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let submit = key.code == KeyCode::Enter
        || (key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL));
    if submit {
        submit_editor(state, runtime, view_data, internal_tx);
        return;
    }
    if key.code == KeyCode::Esc {
        state.dispatch(AppCommand::CloseEditor);
        emit_status(state, view_data, internal_tx, "form canceled");
        return;
    }

    let Some(editor) = state.editor.as_mut() else {
        return;
    };
    match (editor, key.code) {
        (Editor::Request(editor), KeyCode::Tab | KeyCode::Down) => editor.move_field(1),
        (Editor::Request(editor), KeyCode::BackTab | KeyCode::Up) => editor.move_field(-1),
        (Editor::Request(editor), KeyCode::Right) => editor.cycle_choice(1),
        (Editor::Request(editor), KeyCode::Left) => editor.cycle_choice(-1),
        (Editor::Request(editor), KeyCode::Backspace) => editor.pop_char(),
        (Editor::Request(editor), KeyCode::Char(ch)) => editor.push_char(ch),
        (Editor::Partner(editor), KeyCode::Tab | KeyCode::Down) => editor.move_field(1),
        (Editor::Partner(editor), KeyCode::BackTab | KeyCode::Up) => editor.move_field(-1),
        (Editor::Partner(editor), KeyCode::Right) => editor.cycle_choice(1),
        (Editor::Partner(editor), KeyCode::Left) => editor.cycle_choice(-1),
        (Editor::Partner(editor), KeyCode::Backspace) => editor.pop_char(),
        (Editor::Partner(editor), KeyCode::Char(ch)) => editor.push_char(ch),
        _ => {}
    }
}

fn submit_editor<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let validated = match state.editor.as_mut() {
        Some(Editor::Request(editor)) => editor.submit(),
        Some(Editor::Partner(editor)) => editor.submit(),
        None => return,
    };
    let payload = match validated {
        Ok(payload) => payload,
        Err(error) => {
            emit_status(state, view_data, internal_tx, error.to_string());
            return;
        }
    };

    if let Err(error) = runtime.submit_form(&payload) {
        show_error(state, "save failed", &error);
        return;
    }

    state.dispatch(AppCommand::CloseEditor);
    let reloaded = reload_requests(state, runtime);
    match payload {
        FormPayload::Partner(input) => {
            info!(name = %input.name, "partner created");
            let message = format!("partner {} created", input.name);
            // A failed reload already holds the dialog slot.
            if reloaded {
                state.dispatch(AppCommand::ShowDialog(Dialog::info("partner", message)));
            } else {
                emit_status(state, view_data, internal_tx, message);
            }
        }
        FormPayload::Request { mode, .. } => {
            let message = match mode {
                EditorMode::Create => "request created".to_owned(),
                EditorMode::Edit(request_id) => {
                    state.list.select(request_id);
                    format!("request {request_id} updated")
                }
            };
            info!(%message, "request saved");
            emit_status(state, view_data, internal_tx, message);
        }
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(state))
        .block(Block::default().title("partnerdesk").borders(Borders::ALL))
        .style(Style::default().fg(Color::White));
    frame.render_widget(header, layout[0]);

    render_cards(frame, layout[1], state);

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if let Some(editor) = &state.editor {
        let (title, body) = match editor {
            Editor::Request(editor) => (editor.title(), render_request_editor_text(editor)),
            Editor::Partner(editor) => (editor.title(), render_partner_editor_text(editor)),
        };
        let area = centered_rect(64, 60, frame.area());
        frame.render_widget(Clear, area);
        let form = Paragraph::new(body).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(form, area);
    }

    if let Some(menu) = &state.menu {
        let area = centered_rect(32, 24, frame.area());
        frame.render_widget(Clear, area);
        let items = menu
            .actions()
            .into_iter()
            .map(|action| ListItem::new(action.label()))
            .collect::<Vec<_>>();
        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!("request {}", menu.request_id))
                    .borders(Borders::ALL),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut list_state = ListState::default().with_selected(Some(menu.cursor));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    if let Some(request_id) = state.confirm_delete {
        let area = centered_rect(44, 22, frame.area());
        frame.render_widget(Clear, area);
        let confirm = Paragraph::new(confirm_delete_text(request_id)).block(
            Block::default()
                .title("delete")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Red)),
        );
        frame.render_widget(confirm, area);
    }

    if let Some(dialog) = &state.dialog {
        let area = centered_rect(52, 30, frame.area());
        frame.render_widget(Clear, area);
        let color = match dialog.kind {
            DialogKind::Info => Color::Green,
            DialogKind::Error => Color::Red,
        };
        let body = Paragraph::new(format!("{}\n\nenter close", dialog.body)).block(
            Block::default()
                .title(dialog.title.as_str())
                .borders(Borders::ALL)
                .style(Style::default().fg(color)),
        );
        frame.render_widget(body, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_cards(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState) {
    let block = Block::default().title("requests").borders(Borders::ALL);
    if state.list.is_empty() {
        let empty = Paragraph::new("no requests yet -- press n to create one").block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items = state
        .list
        .cards()
        .iter()
        .map(|card| ListItem::new(card_text(card)))
        .collect::<Vec<_>>();
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▌ ");
    let mut list_state = ListState::default().with_selected(Some(state.list.selected_index()));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn card_text(card: &RequestCard) -> Text<'static> {
    Text::from(vec![
        Line::from(format!(
            "{} | {}    {}",
            card.partner_type, card.partner_name, card.total_cost
        )),
        Line::from(card.legal_address.clone()),
        Line::from(card.phone.clone()),
        Line::from(format!("rating: {}", card.rating)),
        Line::from(""),
    ])
}

fn header_text(state: &AppState) -> String {
    match state.list.len() {
        1 => "1 request".to_owned(),
        count => format!("{count} requests"),
    }
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }
    let (badge, hints) = match state.mode() {
        AppMode::List => (
            "LIST",
            "j/k move | enter/m actions | n new request | p new partner | r reload | ? help | q quit",
        ),
        AppMode::Menu => ("MENU", "j/k move | enter choose | esc close"),
        AppMode::Editor(FormKind::Request) => (
            "FORM",
            "tab/shift+tab field | left/right choose | enter submit | esc cancel",
        ),
        AppMode::Editor(FormKind::Partner) => (
            "FORM",
            "tab/shift+tab field | left/right type | enter submit | esc cancel",
        ),
        AppMode::ConfirmDelete => ("CONFIRM", "y delete | n keep"),
        AppMode::Dialog => ("DIALOG", "enter close"),
    };
    match &state.status_line {
        Some(status) => format!("{badge} | {status} | {hints}"),
        None => format!("{badge} | {hints}"),
    }
}

fn render_request_editor_text(editor: &RequestEditor) -> String {
    let mut lines = RequestField::ALL
        .iter()
        .map(|field| {
            field_line(
                *field == editor.field,
                field.label(),
                true,
                &editor.field_value(*field),
            )
        })
        .collect::<Vec<_>>();
    if editor.products.is_empty() {
        lines.push(String::new());
        lines.push("no products in the catalogue".to_owned());
    }
    push_error_line(&mut lines, editor.error.map(|error| error.to_string()));
    lines.join("\n")
}

fn render_partner_editor_text(editor: &PartnerEditor) -> String {
    let mut lines = PartnerField::ALL
        .iter()
        .map(|field| {
            field_line(
                *field == editor.field,
                field.label(),
                field.required(),
                &editor.field_value(*field),
            )
        })
        .collect::<Vec<_>>();
    push_error_line(&mut lines, editor.error.map(|error| error.to_string()));
    lines.join("\n")
}

fn field_line(active: bool, label: &str, required: bool, value: &str) -> String {
    let cursor = if active { ">" } else { " " };
    let marker = if required { "*" } else { " " };
    format!("{cursor} {label}{marker}: {value}")
}

fn push_error_line(lines: &mut Vec<String>, error: Option<String>) {
    if let Some(error) = error {
        lines.push(String::new());
        lines.push(format!("error: {error}"));
    }
}

fn confirm_delete_text(request_id: RequestId) -> String {
    format!("delete request {request_id}?\n\ny delete | n keep")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit\n\
list: j/k move | g/G first/last | enter or m actions | n new request | p new partner | r reload | q quit\n\
actions: view product | edit | delete (asks first)\n\
form: tab/shift+tab field | left/right choose | type to edit | enter or ctrl+s submit | esc cancel\n\
dialog: enter close"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, InternalEvent, ViewData, handle_key_event, help_overlay_text,
        process_internal_events, render, render_partner_editor_text, render_request_editor_text,
        status_text,
    };
    use anyhow::{Result, anyhow, bail};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use partnerdesk_app::{
        AppMode, AppState, DialogKind, Editor, EditorMode, FormKind, FormPayload, Partner,
        PartnerEditor, PartnerId, PartnerType, Product, ProductId, Request, RequestFormInput,
        RequestId, RequestSummary, ValidationError,
    };
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::sync::mpsc::{self, Receiver, Sender};

    #[derive(Debug, Default)]
    struct TestRuntime {
        products: Vec<Product>,
        partners: Vec<Partner>,
        requests: Vec<Request>,
        submitted: Vec<FormPayload>,
        fail_writes: bool,
        fail_loads: bool,
        load_count: usize,
    }

    impl TestRuntime {
        fn seeded() -> Self {
            Self {
                products: vec![
                    Product {
                        id: ProductId::new(1),
                        name: "Laminate oak".to_owned(),
                        min_price: 1000.0,
                    },
                    Product {
                        id: ProductId::new(2),
                        name: "Cork panel".to_owned(),
                        min_price: 250.5,
                    },
                ],
                partners: vec![Partner {
                    id: PartnerId::new(1),
                    partner_type: Some(PartnerType::Zao),
                    name: "Mebel".to_owned(),
                    director_name: "Orlov".to_owned(),
                    legal_address: Some("Moscow".to_owned()),
                    phone: Some("495 000 00 00".to_owned()),
                    email: None,
                    inn: None,
                    rating: Some(8),
                }],
                requests: vec![
                    Request {
                        id: RequestId::new(1),
                        product_id: ProductId::new(1),
                        partner_id: PartnerId::new(1),
                        quantity: 3,
                    },
                    Request {
                        id: RequestId::new(2),
                        product_id: ProductId::new(2),
                        partner_id: PartnerId::new(1),
                        quantity: 10,
                    },
                ],
                ..Self::default()
            }
        }

        fn summary(&self, request: &Request) -> RequestSummary {
            let product = self.products.iter().find(|p| p.id == request.product_id);
            let partner = self.partners.iter().find(|p| p.id == request.partner_id);
            RequestSummary {
                request_id: request.id,
                quantity: Some(request.quantity),
                product_id: request.product_id,
                product_name: product.map(|p| p.name.clone()).unwrap_or_default(),
                min_price: product.map(|p| p.min_price),
                partner_id: request.partner_id,
                partner_type: partner.and_then(|p| p.partner_type),
                partner_name: partner.map(|p| p.name.clone()),
                director_name: partner.map(|p| p.director_name.clone()),
                legal_address: partner.and_then(|p| p.legal_address.clone()),
                phone: partner.and_then(|p| p.phone.clone()),
                rating: partner.and_then(|p| p.rating),
            }
        }
    }

    impl AppRuntime for TestRuntime {
        fn load_requests(&mut self) -> Result<Vec<RequestSummary>> {
            self.load_count += 1;
            if self.fail_loads {
                bail!("cannot reach the database");
            }
            Ok(self.requests.iter().map(|r| self.summary(r)).collect())
        }

        fn load_products(&mut self) -> Result<Vec<Product>> {
            Ok(self.products.clone())
        }

        fn load_partners(&mut self) -> Result<Vec<Partner>> {
            Ok(self.partners.clone())
        }

        fn load_request(&mut self, request_id: RequestId) -> Result<Request> {
            self.requests
                .iter()
                .find(|request| request.id == request_id)
                .copied()
                .ok_or_else(|| anyhow!("request {request_id} not found"))
        }

        fn submit_form(&mut self, payload: &FormPayload) -> Result<()> {
            if self.fail_writes {
                bail!("database rejected insert request: FOREIGN KEY constraint failed");
            }
            self.submitted.push(payload.clone());
            match payload {
                FormPayload::Request {
                    mode: EditorMode::Create,
                    input,
                } => {
                    let next = self.requests.iter().map(|r| r.id.get()).max().unwrap_or(0) + 1;
                    self.requests.push(Request {
                        id: RequestId::new(next),
                        product_id: input.product_id,
                        partner_id: input.partner_id,
                        quantity: input.quantity,
                    });
                }
                FormPayload::Request {
                    mode: EditorMode::Edit(request_id),
                    input,
                } => {
                    let request = self
                        .requests
                        .iter_mut()
                        .find(|request| request.id == *request_id)
                        .ok_or_else(|| anyhow!("request {request_id} not found"))?;
                    request.product_id = input.product_id;
                    request.partner_id = input.partner_id;
                    request.quantity = input.quantity;
                }
                FormPayload::Partner(input) => {
                    let next = self.partners.len() as i64 + 1;
                    self.partners.push(Partner {
                        id: PartnerId::new(next),
                        partner_type: Some(input.partner_type),
                        name: input.name.clone(),
                        director_name: input.director_name.clone(),
                        legal_address: input.legal_address.clone(),
                        phone: input.phone.clone(),
                        email: input.email.clone(),
                        inn: input.inn.clone(),
                        rating: input.rating,
                    });
                }
            }
            Ok(())
        }

        fn delete_request(&mut self, request_id: RequestId) -> Result<()> {
            let before = self.requests.len();
            self.requests.retain(|request| request.id != request_id);
            if self.requests.len() == before {
                bail!("request {request_id} not found -- choose an existing request and retry");
            }
            Ok(())
        }
    }

    struct Harness {
        state: AppState,
        runtime: TestRuntime,
        view_data: ViewData,
        tx: Sender<InternalEvent>,
        rx: Receiver<InternalEvent>,
    }

    impl Harness {
        fn new(runtime: TestRuntime) -> Self {
            let (tx, rx) = mpsc::channel();
            let mut state = AppState::default();
            let mut runtime = runtime;
            super::reload_requests(&mut state, &mut runtime);
            Self {
                state,
                runtime,
                view_data: ViewData::default(),
                tx,
                rx,
            }
        }

        fn press(&mut self, code: KeyCode) -> bool {
            self.key(KeyEvent::new(code, KeyModifiers::NONE))
        }

        fn key(&mut self, key: KeyEvent) -> bool {
            handle_key_event(
                &mut self.state,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
                key,
            )
        }

        fn type_text(&mut self, text: &str) {
            for ch in text.chars() {
                self.press(KeyCode::Char(ch));
            }
        }
    }

    #[test]
    fn startup_load_builds_cards_in_request_order() {
        let harness = Harness::new(TestRuntime::seeded());
        let cards = harness.state.list.cards();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].request_id, RequestId::new(1));
        assert_eq!(cards[0].total_cost, "3,000.00");
        assert_eq!(cards[0].phone, "+7 495 000 00 00");
        assert_eq!(cards[1].total_cost, "2,505.00");
    }

    #[test]
    fn load_failure_shows_error_dialog() {
        let harness = Harness::new(TestRuntime {
            fail_loads: true,
            ..TestRuntime::seeded()
        });
        let dialog = harness.state.dialog.as_ref().expect("error dialog");
        assert_eq!(dialog.kind, DialogKind::Error);
        assert!(dialog.body.contains("cannot reach"));
        assert!(harness.state.list.is_empty());
    }

    #[test]
    fn quit_keys_exit() {
        let mut harness = Harness::new(TestRuntime::seeded());
        assert!(harness.press(KeyCode::Char('q')));
        assert!(harness.key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn q_types_into_open_form_instead_of_quitting() {
        let mut harness = Harness::new(TestRuntime::seeded());
        harness.press(KeyCode::Char('p'));
        harness.press(KeyCode::Tab);
        assert!(!harness.press(KeyCode::Char('q')));
        let Some(Editor::Partner(editor)) = &harness.state.editor else {
            panic!("partner editor should be open");
        };
        assert_eq!(editor.draft.name, "q");
    }

    #[test]
    fn create_request_flow_persists_and_reloads() {
        let mut harness = Harness::new(TestRuntime::seeded());
        harness.press(KeyCode::Char('n'));
        assert_eq!(harness.state.mode(), AppMode::Editor(FormKind::Request));

        harness.press(KeyCode::Right);
        harness.press(KeyCode::Tab);
        harness.press(KeyCode::Right);
        harness.press(KeyCode::Tab);
        harness.type_text("15");
        harness.press(KeyCode::Enter);

        assert_eq!(harness.state.mode(), AppMode::List);
        assert_eq!(
            harness.runtime.submitted,
            vec![FormPayload::Request {
                mode: EditorMode::Create,
                input: RequestFormInput {
                    product_id: ProductId::new(1),
                    partner_id: PartnerId::new(1),
                    quantity: 15,
                },
            }]
        );
        assert_eq!(harness.state.list.len(), 3);
        assert_eq!(harness.state.status_line.as_deref(), Some("request created"));
    }

    #[test]
    fn invalid_quantity_keeps_form_open_without_store_call() {
        let mut harness = Harness::new(TestRuntime::seeded());
        harness.press(KeyCode::Char('n'));
        harness.press(KeyCode::Right);
        harness.press(KeyCode::Tab);
        harness.press(KeyCode::Right);
        harness.press(KeyCode::Tab);
        harness.type_text("0");
        harness.press(KeyCode::Enter);

        assert_eq!(harness.state.mode(), AppMode::Editor(FormKind::Request));
        assert!(harness.runtime.submitted.is_empty());
        let Some(Editor::Request(editor)) = &harness.state.editor else {
            panic!("request editor should stay open");
        };
        assert_eq!(editor.error, Some(ValidationError::InvalidQuantity));
    }

    #[test]
    fn missing_selection_is_reported_after_quantity() {
        let mut harness = Harness::new(TestRuntime::seeded());
        harness.press(KeyCode::Char('n'));
        harness.press(KeyCode::BackTab);
        harness.type_text("4");
        harness.press(KeyCode::Enter);

        let Some(Editor::Request(editor)) = &harness.state.editor else {
            panic!("request editor should stay open");
        };
        assert_eq!(editor.error, Some(ValidationError::MissingSelection));
        assert!(harness.runtime.submitted.is_empty());
    }

    #[test]
    fn edit_action_preselects_and_updates_in_place() {
        let mut harness = Harness::new(TestRuntime::seeded());
        harness.press(KeyCode::Char('j'));
        harness.press(KeyCode::Enter);
        assert_eq!(harness.state.mode(), AppMode::Menu);
        harness.press(KeyCode::Down);
        harness.press(KeyCode::Enter);

        let Some(Editor::Request(editor)) = &harness.state.editor else {
            panic!("request editor should be open");
        };
        assert_eq!(editor.mode, EditorMode::Edit(RequestId::new(2)));
        assert_eq!(editor.draft.product_id, Some(ProductId::new(2)));
        assert_eq!(editor.draft.quantity, "10");

        harness.press(KeyCode::Up);
        harness.press(KeyCode::Backspace);
        harness.press(KeyCode::Backspace);
        harness.type_text("7");
        harness.press(KeyCode::Enter);

        assert_eq!(harness.state.mode(), AppMode::List);
        assert_eq!(harness.state.list.len(), 2);
        assert_eq!(harness.runtime.requests[1].quantity, 7);
        assert_eq!(
            harness.state.status_line.as_deref(),
            Some("request 2 updated")
        );
        assert_eq!(
            harness.state.list.selected_card().map(|card| card.request_id),
            Some(RequestId::new(2))
        );
    }

    #[test]
    fn store_error_keeps_form_open_and_shows_dialog() {
        let mut harness = Harness::new(TestRuntime {
            fail_writes: true,
            ..TestRuntime::seeded()
        });
        harness.press(KeyCode::Char('n'));
        harness.press(KeyCode::Right);
        harness.press(KeyCode::Tab);
        harness.press(KeyCode::Right);
        harness.press(KeyCode::Tab);
        harness.type_text("2");
        harness.press(KeyCode::Enter);

        assert_eq!(harness.state.mode(), AppMode::Dialog);
        assert!(harness.state.editor.is_some());
        harness.press(KeyCode::Enter);
        assert_eq!(harness.state.mode(), AppMode::Editor(FormKind::Request));
    }

    #[test]
    fn delete_asks_first_then_removes_card() {
        let mut harness = Harness::new(TestRuntime::seeded());
        let loads_before = harness.runtime.load_count;
        harness.press(KeyCode::Char('m'));
        harness.press(KeyCode::Up);
        harness.press(KeyCode::Enter);
        assert_eq!(harness.state.mode(), AppMode::ConfirmDelete);

        harness.press(KeyCode::Char('n'));
        assert_eq!(harness.state.list.len(), 2);

        harness.press(KeyCode::Char('m'));
        harness.press(KeyCode::Up);
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Char('y'));

        assert_eq!(harness.state.mode(), AppMode::List);
        assert_eq!(harness.state.list.len(), 1);
        assert_eq!(
            harness.state.list.cards()[0].request_id,
            RequestId::new(2)
        );
        assert_eq!(harness.runtime.load_count, loads_before + 1);
    }

    #[test]
    fn view_product_reads_loaded_rows() {
        let mut harness = Harness::new(TestRuntime::seeded());
        let loads_before = harness.runtime.load_count;
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Enter);

        let dialog = harness.state.dialog.as_ref().expect("product dialog");
        assert_eq!(dialog.kind, DialogKind::Info);
        assert!(dialog.body.contains("Laminate oak"));
        assert!(dialog.body.contains("1,000.00"));
        assert_eq!(harness.runtime.load_count, loads_before);
    }

    #[test]
    fn partner_flow_confirms_and_closes() {
        let mut harness = Harness::new(TestRuntime::seeded());
        harness.press(KeyCode::Char('p'));
        harness.press(KeyCode::Right);
        harness.press(KeyCode::Tab);
        harness.type_text("Parket Dom");
        harness.press(KeyCode::Tab);
        harness.type_text("Sokolov");
        harness.press(KeyCode::Enter);

        assert!(harness.state.editor.is_none());
        let dialog = harness.state.dialog.as_ref().expect("confirmation dialog");
        assert_eq!(dialog.kind, DialogKind::Info);
        assert_eq!(dialog.body, "partner Parket Dom created");
        assert_eq!(harness.runtime.partners.len(), 2);
        assert_eq!(harness.runtime.partners[1].phone, None);
    }

    #[test]
    fn reload_failure_after_partner_create_stays_visible() {
        let mut harness = Harness::new(TestRuntime::seeded());
        harness.press(KeyCode::Char('p'));
        harness.press(KeyCode::Right);
        harness.press(KeyCode::Tab);
        harness.type_text("Parket Dom");
        harness.press(KeyCode::Tab);
        harness.type_text("Sokolov");
        harness.runtime.fail_loads = true;
        harness.press(KeyCode::Enter);

        assert_eq!(harness.runtime.partners.len(), 2);
        assert!(harness.state.editor.is_none());
        let dialog = harness.state.dialog.as_ref().expect("error dialog");
        assert_eq!(dialog.kind, DialogKind::Error);
        assert!(dialog.body.contains("cannot reach the database"));
        assert_eq!(
            harness.state.status_line.as_deref(),
            Some("partner Parket Dom created")
        );
    }

    #[test]
    fn partner_without_director_is_rejected_inline() {
        let mut harness = Harness::new(TestRuntime::seeded());
        harness.press(KeyCode::Char('p'));
        harness.press(KeyCode::Right);
        harness.press(KeyCode::Tab);
        harness.type_text("Parket Dom");
        harness.press(KeyCode::Enter);

        let Some(Editor::Partner(editor)) = &harness.state.editor else {
            panic!("partner editor should stay open");
        };
        assert_eq!(editor.error, Some(ValidationError::MissingDirectorName));
        assert!(harness.runtime.submitted.is_empty());
    }

    #[test]
    fn escape_cancels_form_without_side_effects() {
        let mut harness = Harness::new(TestRuntime::seeded());
        harness.press(KeyCode::Char('n'));
        harness.press(KeyCode::Esc);
        assert_eq!(harness.state.mode(), AppMode::List);
        assert!(harness.runtime.submitted.is_empty());
        assert_eq!(harness.state.status_line.as_deref(), Some("form canceled"));
    }

    #[test]
    fn status_clear_ignores_stale_tokens() {
        let mut harness = Harness::new(TestRuntime::seeded());
        harness.press(KeyCode::Char('r'));
        assert!(harness.state.status_line.is_some());

        harness
            .tx
            .send(InternalEvent::ClearStatus { token: 0 })
            .expect("send stale token");
        process_internal_events(&mut harness.state, &harness.view_data, &harness.rx);
        assert!(harness.state.status_line.is_some());

        harness
            .tx
            .send(InternalEvent::ClearStatus {
                token: harness.view_data.status_token,
            })
            .expect("send current token");
        process_internal_events(&mut harness.state, &harness.view_data, &harness.rx);
        assert!(harness.state.status_line.is_none());
    }

    #[test]
    fn help_overlay_absorbs_keys() {
        let mut harness = Harness::new(TestRuntime::seeded());
        harness.press(KeyCode::Char('?'));
        assert!(harness.view_data.help_visible);
        assert!(!harness.press(KeyCode::Char('q')));
        assert!(status_text(&harness.state, &harness.view_data).is_empty());
        harness.press(KeyCode::Esc);
        assert!(!harness.view_data.help_visible);
        assert!(help_overlay_text().contains("p new partner"));
    }

    #[test]
    fn status_text_tracks_mode() {
        let mut harness = Harness::new(TestRuntime::seeded());
        assert!(status_text(&harness.state, &harness.view_data).starts_with("LIST"));
        harness.press(KeyCode::Char('m'));
        assert!(status_text(&harness.state, &harness.view_data).starts_with("MENU"));
    }

    #[test]
    fn editor_text_marks_required_and_active_fields() {
        let mut editor = PartnerEditor::open();
        editor.error = Some(ValidationError::MissingPartnerType);
        let text = render_partner_editor_text(&editor);
        let first = text.lines().next().unwrap_or_default();
        assert!(first.starts_with('>'));
        assert!(first.contains('*'));
        assert!(text.contains("error: partner type is required"));

        let runtime = TestRuntime::seeded();
        let request_editor = partnerdesk_app::RequestEditor::open_create(
            runtime.products.clone(),
            runtime.partners.clone(),
        );
        let text = render_request_editor_text(&request_editor);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn render_draws_cards_and_overlays() -> Result<()> {
        let mut harness = Harness::new(TestRuntime::seeded());
        harness.press(KeyCode::Char('m'));

        let mut terminal = Terminal::new(TestBackend::new(100, 40))?;
        terminal.draw(|frame| render(frame, &harness.state, &harness.view_data))?;
        let buffer = terminal.backend().buffer().clone();
        let content = buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>();
        assert!(content.contains("partnerdesk"));
        assert!(content.contains("Mebel"));
        assert!(content.contains("view product"));
        Ok(())
    }
}

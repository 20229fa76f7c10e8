// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    CardAction, FormKind, PartnerEditor, RequestEditor, RequestId, RequestList, RequestSummary,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Editor {
    Request(RequestEditor),
    Partner(PartnerEditor),
}

impl Editor {
    pub const fn kind(&self) -> FormKind {
        match self {
            Self::Request(_) => FormKind::Request,
            Self::Partner(_) => FormKind::Partner,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: String,
    pub body: String,
}

impl Dialog {
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: DialogKind::Info,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: DialogKind::Error,
            title: title.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextMenu {
    pub request_id: RequestId,
    pub cursor: usize,
}

impl ContextMenu {
    pub const fn actions(&self) -> [CardAction; 3] {
        CardAction::menu(self.request_id)
    }

    pub fn selected(&self) -> CardAction {
        let actions = self.actions();
        actions[self.cursor.min(actions.len() - 1)]
    }
}

/// Which layer currently receives input. Dialogs sit above everything, the
/// editor is the only modal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    List,
    Menu,
    Editor(FormKind),
    ConfirmDelete,
    Dialog,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub list: RequestList,
    pub menu: Option<ContextMenu>,
    pub editor: Option<Editor>,
    pub confirm_delete: Option<RequestId>,
    pub dialog: Option<Dialog>,
    pub status_line: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    ReplaceRequests(Vec<RequestSummary>),
    MoveSelection(isize),
    OpenMenu,
    MoveMenu(isize),
    ChooseMenuAction,
    CloseMenu,
    AskDelete(RequestId),
    ConfirmDelete,
    CancelDelete,
    OpenEditor(Editor),
    CloseEditor,
    ShowDialog(Dialog),
    DismissDialog,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    SelectionChanged(Option<RequestId>),
    ListReloaded(usize),
    ActionChosen(CardAction),
    DeleteConfirmed(RequestId),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn mode(&self) -> AppMode {
        if self.dialog.is_some() {
            AppMode::Dialog
        } else if self.confirm_delete.is_some() {
            AppMode::ConfirmDelete
        } else if self.menu.is_some() {
            AppMode::Menu
        } else if let Some(editor) = &self.editor {
            AppMode::Editor(editor.kind())
        } else {
            AppMode::List
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::ReplaceRequests(summaries) => {
                self.list.replace(summaries);
                vec![AppEvent::ListReloaded(self.list.len())]
            }
            AppCommand::MoveSelection(delta) => {
                self.list.move_selection(delta);
                vec![AppEvent::SelectionChanged(self.selected_request())]
            }
            AppCommand::OpenMenu => match self.selected_request() {
                Some(request_id) => {
                    self.menu = Some(ContextMenu {
                        request_id,
                        cursor: 0,
                    });
                    vec![AppEvent::ModeChanged(self.mode())]
                }
                None => vec![self.set_status("no request selected")],
            },
            AppCommand::MoveMenu(delta) => {
                if let Some(menu) = &mut self.menu {
                    let len = menu.actions().len() as isize;
                    menu.cursor = (menu.cursor as isize + delta).rem_euclid(len) as usize;
                }
                Vec::new()
            }
            AppCommand::ChooseMenuAction => match self.menu.take() {
                Some(menu) => vec![
                    AppEvent::ModeChanged(self.mode()),
                    AppEvent::ActionChosen(menu.selected()),
                ],
                None => Vec::new(),
            },
            AppCommand::CloseMenu => {
                self.menu = None;
                vec![AppEvent::ModeChanged(self.mode())]
            }
            AppCommand::AskDelete(request_id) => {
                self.confirm_delete = Some(request_id);
                vec![AppEvent::ModeChanged(self.mode())]
            }
            AppCommand::ConfirmDelete => match self.confirm_delete.take() {
                Some(request_id) => vec![
                    AppEvent::ModeChanged(self.mode()),
                    AppEvent::DeleteConfirmed(request_id),
                ],
                None => Vec::new(),
            },
            AppCommand::CancelDelete => {
                self.confirm_delete = None;
                vec![AppEvent::ModeChanged(self.mode())]
            }
            AppCommand::OpenEditor(editor) => {
                if self.editor.is_some() {
                    return vec![self.set_status("a form is already open")];
                }
                self.editor = Some(editor);
                vec![AppEvent::ModeChanged(self.mode())]
            }
            AppCommand::CloseEditor => {
                self.editor = None;
                vec![AppEvent::ModeChanged(self.mode())]
            }
            AppCommand::ShowDialog(dialog) => {
                self.dialog = Some(dialog);
                vec![AppEvent::ModeChanged(self.mode())]
            }
            AppCommand::DismissDialog => {
                self.dialog = None;
                vec![AppEvent::ModeChanged(self.mode())]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    pub fn selected_request(&self) -> Option<RequestId> {
        self.list.selected_card().map(|card| card.request_id)
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppMode, AppState, Dialog, Editor};
    use crate::{
        CardAction, FormKind, PartnerEditor, PartnerId, ProductId, RequestId, RequestSummary,
    };

    fn summary(id: i64) -> RequestSummary {
        RequestSummary {
            request_id: RequestId::new(id),
            quantity: Some(1),
            product_id: ProductId::new(1),
            product_name: "Tile".to_owned(),
            min_price: Some(10.0),
            partner_id: PartnerId::new(1),
            partner_type: None,
            partner_name: None,
            director_name: None,
            legal_address: None,
            phone: None,
            rating: None,
        }
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::default();
        state.dispatch(AppCommand::ReplaceRequests(vec![summary(1), summary(2)]));
        state
    }

    #[test]
    fn replace_requests_reports_count() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::ReplaceRequests(vec![summary(3)]));
        assert_eq!(events, vec![AppEvent::ListReloaded(1)]);
        assert_eq!(state.selected_request(), Some(RequestId::new(3)));
    }

    #[test]
    fn menu_choice_emits_action_for_selected_card() {
        let mut state = loaded_state();
        state.dispatch(AppCommand::MoveSelection(1));
        state.dispatch(AppCommand::OpenMenu);
        assert_eq!(state.mode(), AppMode::Menu);

        state.dispatch(AppCommand::MoveMenu(-1));
        let events = state.dispatch(AppCommand::ChooseMenuAction);
        assert_eq!(
            events,
            vec![
                AppEvent::ModeChanged(AppMode::List),
                AppEvent::ActionChosen(CardAction::Delete(RequestId::new(2))),
            ]
        );
        assert!(state.menu.is_none());
    }

    #[test]
    fn open_menu_without_rows_sets_status() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::OpenMenu);
        assert_eq!(
            events,
            vec![AppEvent::StatusUpdated("no request selected".to_owned())]
        );
        assert_eq!(state.mode(), AppMode::List);
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut state = loaded_state();
        state.dispatch(AppCommand::AskDelete(RequestId::new(1)));
        assert_eq!(state.mode(), AppMode::ConfirmDelete);

        state.dispatch(AppCommand::CancelDelete);
        assert_eq!(state.mode(), AppMode::List);
        assert!(state.dispatch(AppCommand::ConfirmDelete).is_empty());

        state.dispatch(AppCommand::AskDelete(RequestId::new(1)));
        let events = state.dispatch(AppCommand::ConfirmDelete);
        assert!(events.contains(&AppEvent::DeleteConfirmed(RequestId::new(1))));
    }

    #[test]
    fn only_one_editor_at_a_time() {
        let mut state = loaded_state();
        state.dispatch(AppCommand::OpenEditor(Editor::Partner(PartnerEditor::open())));
        assert_eq!(state.mode(), AppMode::Editor(FormKind::Partner));

        let events = state.dispatch(AppCommand::OpenEditor(Editor::Partner(PartnerEditor::open())));
        assert_eq!(
            events,
            vec![AppEvent::StatusUpdated("a form is already open".to_owned())]
        );

        state.dispatch(AppCommand::CloseEditor);
        assert_eq!(state.mode(), AppMode::List);
    }

    #[test]
    fn dialog_sits_above_open_editor() {
        let mut state = loaded_state();
        state.dispatch(AppCommand::OpenEditor(Editor::Partner(PartnerEditor::open())));
        state.dispatch(AppCommand::ShowDialog(Dialog::error("error", "boom")));
        assert_eq!(state.mode(), AppMode::Dialog);

        state.dispatch(AppCommand::DismissDialog);
        assert_eq!(state.mode(), AppMode::Editor(FormKind::Partner));
    }
}

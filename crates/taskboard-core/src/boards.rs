//! Board List Store
//!
//! The signed-in user's boards, as listed on the dashboard.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::{BoardError, EntityKind, Result};
use crate::gateway::{Gateway, GatewayResult};
use crate::model::{Board, BoardId, BoardPatch, NewBoard, UserId};
use crate::store::{validate_title, SubscriptionId, Subscribers};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardListState {
    /// Newest first once created locally; load order otherwise
    pub boards: Vec<Board>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Boards owned by one user. Creates and edits are write-through; deletes
/// remove the board locally before the gateway is asked.
pub struct BoardListStore<G: Gateway + ?Sized> {
    gateway: Rc<G>,
    owner: UserId,
    state: RefCell<BoardListState>,
    subscribers: Subscribers<BoardListState>,
}

impl<G: Gateway + ?Sized> BoardListStore<G> {
    pub fn new(gateway: Rc<G>, owner: UserId) -> Self {
        Self {
            gateway,
            owner,
            state: RefCell::new(BoardListState::default()),
            subscribers: Subscribers::default(),
        }
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn subscribe(&self, listener: impl Fn(&BoardListState) + 'static) -> SubscriptionId {
        self.subscribers.add(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    pub fn state(&self) -> BoardListState {
        self.state.borrow().clone()
    }

    pub fn boards(&self) -> Vec<Board> {
        self.state.borrow().boards.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn clear_error(&self) {
        if self.state.borrow().error.is_some() {
            self.update(|state| state.error = None);
        }
    }

    pub async fn load(&self) -> Result<()> {
        self.update(|state| state.loading = true);
        match self.gateway.list_boards(&self.owner).await {
            Ok(boards) => {
                debug!(owner = %self.owner, count = boards.len(), "boards loaded");
                self.update(|state| {
                    state.boards = boards;
                    state.loading = false;
                    state.error = None;
                });
                Ok(())
            }
            Err(err) => {
                warn!(owner = %self.owner, error = %err, "failed to load boards");
                let message = err.message.clone();
                self.update(|state| {
                    state.loading = false;
                    state.error = Some(message);
                });
                Err(err.into())
            }
        }
    }

    /// Create a board (with its default columns) and list it first.
    pub async fn create_board(&self, mut board: NewBoard) -> Result<Board> {
        board.title = validate_title(&board.title)?;
        let result = self.gateway.create_board(&self.owner, &board).await;
        let created = self.settle("create board", result)?;
        self.update(|state| state.boards.insert(0, created.clone()));
        Ok(created)
    }

    pub async fn update_board(&self, board_id: BoardId, mut patch: BoardPatch) -> Result<Board> {
        if let Some(title) = &patch.title {
            patch.title = Some(validate_title(title)?);
        }
        if !self.state.borrow().boards.iter().any(|b| b.id == board_id) {
            return Err(BoardError::not_found(EntityKind::Board, board_id));
        }

        let result = self.gateway.update_board(board_id, &patch).await;
        let updated = self.settle("update board", result)?;
        self.update(|state| {
            if let Some(board) = state.boards.iter_mut().find(|b| b.id == board_id) {
                *board = updated.clone();
            }
        });
        Ok(updated)
    }

    /// Take a board already persisted elsewhere (e.g. by the open board's
    /// store) without calling the gateway. Returns false if it isn't listed.
    pub fn replace_local(&self, board: Board) -> bool {
        if !self.state.borrow().boards.iter().any(|b| b.id == board.id) {
            return false;
        }
        self.update(|state| {
            if let Some(listed) = state.boards.iter_mut().find(|b| b.id == board.id) {
                *listed = board;
            }
        });
        true
    }

    /// Remove a board locally, then delete it remotely. A failed delete is
    /// reported but the board stays hidden.
    pub async fn delete_board(&self, board_id: BoardId) -> Result<()> {
        if !self.state.borrow().boards.iter().any(|b| b.id == board_id) {
            return Err(BoardError::not_found(EntityKind::Board, board_id));
        }
        self.update(|state| state.boards.retain(|b| b.id != board_id));

        let result = self.gateway.delete_board(board_id).await;
        self.settle("delete board", result)
    }

    fn settle<T>(&self, op: &'static str, result: GatewayResult<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.clear_error();
                Ok(value)
            }
            Err(err) => {
                warn!(op, error = %err, "gateway call failed");
                let message = err.message.clone();
                self.update(|state| state.error = Some(message));
                Err(err.into())
            }
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut BoardListState) -> R) -> R {
        let result = f(&mut self.state.borrow_mut());
        self.subscribers.notify(|| self.state());
        result
    }
}

use super::command::{Command, CommandKind, CommandState};
use crate::domain::account::Account;
use crate::error::{LedgerError, Result};

/// LIFO stack of executed commands. There is no redo: an undone command is
/// dropped.
#[derive(Debug, Default)]
pub struct CommandLog {
    entries: Vec<Command>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an executed command.
    pub fn push(&mut self, command: Command) -> Result<()> {
        if command.state() != CommandState::Executed {
            return Err(LedgerError::CommandState(format!(
                "only executed commands can be logged, got {:?}",
                command.state()
            )));
        }
        self.entries.push(command);
        Ok(())
    }

    /// Inverts the most recent command against `accounts`.
    ///
    /// Returns `Ok(None)` when there is nothing to undo. If the inversion
    /// fails the command stays on the stack.
    pub fn undo(&mut self, accounts: &mut Vec<Account>) -> Result<Option<CommandKind>> {
        let Some(mut command) = self.entries.pop() else {
            return Ok(None);
        };
        if let Err(e) = command.undo(accounts) {
            self.entries.push(command);
            return Err(e);
        }
        Ok(Some(command.kind()))
    }

    /// Kind of the command the next `undo` would invert.
    pub fn peek_kind(&self) -> Option<CommandKind> {
        self.entries.last().map(Command::kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

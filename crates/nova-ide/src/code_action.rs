use lsp_types::{CodeAction, CodeActionKind, Command, Uri};
use serde::{Deserialize, Serialize};

use crate::add_type_cast::{CastAction, Priority};

pub const ADD_TYPE_CAST_COMMAND: &str = "nova.addTypeCast";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTypeCastArgs {
    pub uri: Uri,
    /// Raw id of the expression to cast.
    pub expr: u32,
    /// Canonical spelling of the cast type.
    pub ty: String,
}

/// Surface `action` as an LSP quick fix.
///
/// The tree edit happens server-side when the client executes the attached command, after the
/// action's availability has been checked again.
pub fn cast_code_action(action: &CastAction, uri: Uri) -> Option<CodeAction> {
    let args = AddTypeCastArgs {
        uri,
        expr: action.target().as_u32(),
        ty: action.type_text().to_string(),
    };

    Some(CodeAction {
        title: action.label().to_string(),
        kind: Some(CodeActionKind::QUICKFIX),
        is_preferred: Some(action.priority() == Priority::High),
        command: Some(Command {
            title: action.family_name().to_string(),
            command: ADD_TYPE_CAST_COMMAND.to_string(),
            arguments: Some(vec![serde_json::to_value(args).ok()?]),
        }),
        ..Default::default()
    })
}

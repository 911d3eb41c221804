//! Action kinds per service and the catalog advertised to the intent parser.
//!
//! Action names are matched case-insensitively. Each kind carries a short
//! parameter synopsis used both for the parser's system prompt and for
//! `relay actions`.

use crate::Service;
use serde::Serialize;

/// Catalog entry for one supported action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionSpec {
    pub service: Service,
    pub name: &'static str,
    pub parameters: &'static str,
}

macro_rules! action_kinds {
    (
        $(#[$meta:meta])*
        $enum:ident for $service:expr => {
            $($variant:ident => $name:literal $([$($alias:literal),*])? : $params:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $enum {
            $($variant,)+
        }

        impl $enum {
            pub const ALL: &'static [$enum] = &[$($enum::$variant,)+];

            /// Canonical action name.
            pub fn name(self) -> &'static str {
                match self {
                    $($enum::$variant => $name,)+
                }
            }

            /// Parameter synopsis.
            pub fn parameters(self) -> &'static str {
                match self {
                    $($enum::$variant => $params,)+
                }
            }

            /// Parse an action name, ignoring case and surrounding whitespace.
            pub fn parse(action: &str) -> Option<Self> {
                match action.trim().to_lowercase().as_str() {
                    $($name $($(| $alias)*)? => Some($enum::$variant),)+
                    _ => None,
                }
            }

            pub fn specs() -> impl Iterator<Item = ActionSpec> {
                Self::ALL.iter().map(|kind| ActionSpec {
                    service: $service,
                    name: kind.name(),
                    parameters: kind.parameters(),
                })
            }
        }
    };
}

action_kinds! {
    /// Actions against the mail capability.
    MailActionKind for Service::Mail => {
        List => "list": "count (int, opt), query/q (string, opt)",
        Search => "search": "query/q (string, opt; omitted lists recent), count/max_results (int, opt)",
        Send => "send": "to (string or [strings]), subject (string), body (string), html (opt), attachments ([paths], opt)",
        Read => "read": "id (string, opt) OR query (string, opt) OR count (int, opt)",
        AttachmentsInfo => "attachments_info": "id (string, opt; defaults to the last listed message)",
        ListLabels => "list_labels": "(no parameters)",
        CreateLabel => "create_label": "name (string, required)",
        UpdateLabel => "update_label": "id (label id or name, required), name (string, required)",
        DeleteLabel => "delete_label": "id (label id or name, required)",
        ListByLabel => "list_by_label": "label_ids ([label ids or names], required), count (int, opt)",
        MarkRead => "mark_read": "id (string, opt) OR ids ([strings], opt); defaults to the last listed messages",
        MarkUnread => "mark_unread": "id (string, opt) OR ids ([strings], opt); defaults to the last listed messages",
        Move => "move": "id (string, opt), label_id (label id or name, required)",
        Delete => "delete": "(no parameters; deletes the last listed messages)",
        BatchDelete => "batch_delete": "(no parameters; deletes the last listed messages)",
        BatchMarkRead => "batch_mark_read": "ids ([strings], opt); defaults to the last listed messages",
        Summarize => "summarize" ["summarize_emails_with_ai"]: "count (int, opt, default 3)",
    }
}

action_kinds! {
    /// Actions against the calendar capability.
    CalendarActionKind for Service::Calendar => {
        List => "list": "count (int, opt, default 5)",
        Create => "create": "start & end (RFC3339) OR date (\"YYYY-MM-DD\", \"today\" or \"tomorrow\") & time (\"3pm\" style, opt); summary (opt), description (opt)",
    }
}

action_kinds! {
    /// Actions against the drive capability.
    DriveActionKind for Service::Drive => {
        ListFiles => "list_files": "name (substring, opt), mime_type (string, opt), count (int, opt)",
        GetFileInfo => "get_file_info": "file_id (string, required)",
        DownloadFile => "download_file": "file_id (id or exact file name, required), destination (path, opt)",
        UploadFile => "upload_file": "path (local path, required), folder (folder id or name, opt), mime_type (opt)",
        DeleteFile => "delete_file": "file_id (string, required)",
        CreateFolder => "create_folder": "name (string, required), parent (folder id or name, opt)",
        MoveFile => "move_file": "file_id (string, required), folder (folder id or name, required)",
        ShareFile => "share_file": "file_id (string, required), email (string, required), role (reader|commenter|writer, opt), type (user|group|domain|anyone, opt)",
    }
}

/// Every action the dispatcher understands, grouped by service.
pub fn catalog() -> Vec<ActionSpec> {
    MailActionKind::specs()
        .chain(CalendarActionKind::specs())
        .chain(DriveActionKind::specs())
        .collect()
}

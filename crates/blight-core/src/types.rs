use serde::Serialize;
use std::fmt;

pub const CALC_RESULT_ID: &str = "calc-result";
pub const NO_RESULTS_ID: &str = "no-results";

const CLIPBOARD_PREFIX: &str = "clip-";
const SYSTEM_PREFIX: &str = "sys-";
const FILE_OPEN_PREFIX: &str = "file-open:";
const FILE_REVEAL_PREFIX: &str = "file-reveal:";

/// One row of the result list handed to the host UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Opaque to the UI; passed back verbatim to `execute`.
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub icon: String,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Calculator,
    Clipboard,
    System,
    Applications,
    Files,
    Recent,
    Suggested,
    General,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Calculator => "Calculator",
            Category::Clipboard => "Clipboard",
            Category::System => "System",
            Category::Applications => "Applications",
            Category::Files => "Files",
            Category::Recent => "Recent",
            Category::Suggested => "Suggested",
            Category::General => "General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextAction {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

pub static APP_CONTEXT_ACTIONS: &[ContextAction] = &[
    ContextAction {
        id: "open",
        label: "Open",
        icon: "▶",
    },
    ContextAction {
        id: "admin",
        label: "Run as Administrator",
        icon: "🛡️",
    },
    ContextAction {
        id: "explorer",
        label: "Show in Explorer",
        icon: "📂",
    },
    ContextAction {
        id: "copy-path",
        label: "Copy Path",
        icon: "📋",
    },
];

/// Decoded form of [`SearchResult::id`]: which provider owns the result and
/// the payload needed to act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultId<'a> {
    Calculator,
    /// Offset into the clipboard history. `None` when the offset isn't a
    /// number.
    Clipboard(Option<usize>),
    System(&'a str),
    FileOpen(&'a str),
    FileReveal(&'a str),
    /// Anything without a provider prefix is an application name.
    App(&'a str),
}

impl<'a> ResultId<'a> {
    pub fn parse(id: &'a str) -> Self {
        if id == CALC_RESULT_ID {
            return ResultId::Calculator;
        }
        if let Some(offset) = id.strip_prefix(CLIPBOARD_PREFIX) {
            return ResultId::Clipboard(offset.parse().ok());
        }
        if let Some(command) = id.strip_prefix(SYSTEM_PREFIX) {
            return ResultId::System(command);
        }
        if let Some(path) = id.strip_prefix(FILE_OPEN_PREFIX) {
            return ResultId::FileOpen(path);
        }
        if let Some(path) = id.strip_prefix(FILE_REVEAL_PREFIX) {
            return ResultId::FileReveal(path);
        }
        ResultId::App(id)
    }
}

impl fmt::Display for ResultId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultId::Calculator => f.write_str(CALC_RESULT_ID),
            ResultId::Clipboard(Some(offset)) => write!(f, "{CLIPBOARD_PREFIX}{offset}"),
            ResultId::Clipboard(None) => f.write_str(CLIPBOARD_PREFIX),
            ResultId::System(command) => write!(f, "{SYSTEM_PREFIX}{command}"),
            ResultId::FileOpen(path) => write!(f, "{FILE_OPEN_PREFIX}{path}"),
            ResultId::FileReveal(path) => write!(f, "{FILE_REVEAL_PREFIX}{path}"),
            ResultId::App(name) => f.write_str(name),
        }
    }
}

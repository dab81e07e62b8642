/// A power/session action offered in search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemCommand {
    pub id: &'static str,
    pub name: &'static str,
    pub subtitle: &'static str,
    pub icon: &'static str,
    pub keywords: &'static [&'static str],
}

pub static SYSTEM_COMMANDS: &[SystemCommand] = &[
    SystemCommand {
        id: "lock-screen",
        name: "Lock Screen",
        subtitle: "Lock this computer",
        icon: "🔒",
        keywords: &["lock", "screen", "secure"],
    },
    SystemCommand {
        id: "sleep",
        name: "Sleep",
        subtitle: "Put computer to sleep",
        icon: "💤",
        keywords: &["sleep", "suspend", "standby"],
    },
    SystemCommand {
        id: "shutdown",
        name: "Shut Down",
        subtitle: "Shut down this computer",
        icon: "⏻",
        keywords: &["shutdown", "shut down", "power off", "turn off"],
    },
    SystemCommand {
        id: "restart",
        name: "Restart",
        subtitle: "Restart this computer",
        icon: "🔄",
        keywords: &["restart", "reboot"],
    },
    SystemCommand {
        id: "recycle-bin",
        name: "Empty Recycle Bin",
        subtitle: "Permanently delete recycled files",
        icon: "🗑️",
        keywords: &["recycle", "bin", "trash", "empty", "delete"],
    },
    SystemCommand {
        id: "logout",
        name: "Log Out",
        subtitle: "Sign out of this account",
        icon: "🚪",
        keywords: &["logout", "log out", "sign out", "signout"],
    },
];

impl SystemCommand {
    /// Case-insensitive substring match on the name or any keyword.
    pub fn matches(&self, query_lower: &str) -> bool {
        self.name.to_lowercase().contains(query_lower)
            || self.keywords.iter().any(|k| k.contains(query_lower))
    }
}

/// Commands matching `query`, in table order.
pub fn search(query: &str) -> impl Iterator<Item = &'static SystemCommand> {
    let query_lower = query.to_lowercase();
    SYSTEM_COMMANDS.iter().filter(move |cmd| cmd.matches(&query_lower))
}

pub fn find(id: &str) -> Option<&'static SystemCommand> {
    SYSTEM_COMMANDS.iter().find(|cmd| cmd.id == id)
}

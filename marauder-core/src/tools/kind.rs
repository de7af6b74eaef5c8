/// One variant per tool the model may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    ReadFile,
    WriteFile,
    EditFile,
    ListFiles,
    RunCommand,
    RunBackground,
    CheckBackground,
    StopBackground,
    ListBackground,
}

impl ToolKind {
    pub const ALL: [ToolKind; 9] = [
        ToolKind::ReadFile,
        ToolKind::WriteFile,
        ToolKind::EditFile,
        ToolKind::ListFiles,
        ToolKind::RunCommand,
        ToolKind::RunBackground,
        ToolKind::CheckBackground,
        ToolKind::StopBackground,
        ToolKind::ListBackground,
    ];

    /// Wire name used in the schema and in tool calls.
    pub const fn name(self) -> &'static str {
        match self {
            ToolKind::ReadFile => "read_file",
            ToolKind::WriteFile => "write_file",
            ToolKind::EditFile => "edit_file",
            ToolKind::ListFiles => "list_files",
            ToolKind::RunCommand => "run_command",
            ToolKind::RunBackground => "run_background",
            ToolKind::CheckBackground => "check_background",
            ToolKind::StopBackground => "stop_background",
            ToolKind::ListBackground => "list_background",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Tools whose `path` argument names a file the call changes.
    pub const fn modifies_files(self) -> bool {
        matches!(self, ToolKind::WriteFile | ToolKind::EditFile)
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

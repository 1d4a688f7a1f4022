use std::path::Path;

/// Line that opens and closes a multi-line message.
pub const BLOCK_FENCE: &str = "\"\"\"";

const ATTACH_COMMAND: &str = "/attach";

/// Input types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Text(String),
    Attach { filename: String, path: String },
    Invalid(String),
}

/// Turns raw terminal lines into console messages.
///
/// Lines between two [`BLOCK_FENCE`] lines are joined into one message so
/// code can be pasted as a whole.
#[derive(Debug, Default)]
pub struct LineAssembler {
    block: Option<Vec<String>>,
}

impl LineAssembler {
    pub fn push(&mut self, line: &str) -> Option<ConsoleInput> {
        let line = line.trim_end_matches(['\r', '\n']);
        let is_fence = line.trim() == BLOCK_FENCE;

        if self.block.is_some() {
            if is_fence {
                return self.finish();
            }
            if let Some(block) = self.block.as_mut() {
                block.push(line.to_string());
            }
            return None;
        }

        if is_fence {
            self.block = Some(Vec::new());
            return None;
        }

        Some(parse_line(line))
    }

    /// Flushes an unterminated block, if any.
    pub fn finish(&mut self) -> Option<ConsoleInput> {
        self.block
            .take()
            .map(|lines| ConsoleInput::Text(lines.join("\n")))
    }

    pub const fn in_block(&self) -> bool {
        self.block.is_some()
    }
}

fn parse_line(line: &str) -> ConsoleInput {
    let Some(rest) = line.trim().strip_prefix(ATTACH_COMMAND) else {
        return ConsoleInput::Text(line.to_string());
    };

    // "/attachment" is ordinary text, not the command
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return ConsoleInput::Text(line.to_string());
    }

    let path = rest.trim();
    if path.is_empty() {
        return ConsoleInput::Invalid(format!("Usage: {ATTACH_COMMAND} <path>"));
    }

    let filename = Path::new(path)
        .file_name()
        .map_or_else(|| path.to_string(), |name| name.to_string_lossy().into_owned());

    ConsoleInput::Attach {
        filename,
        path: path.to_string(),
    }
}

use std::path::{Path, PathBuf};

use crate::{
    errors::MigrationError,
    types::{Direction, MigrationId},
};

const SECTION_MARKER: &str = "-- +migrate";
const DESCRIPTION_KEY: &str = "description:";
const DEPENDS_KEY: &str = "depends:";

/// One discovered migration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationDefinition {
    pub id: MigrationId,
    /// Name of the source root that provided this migration.
    pub root: String,
    pub path: PathBuf,
    pub description: Option<String>,
    pub depends_on: Vec<MigrationId>,
    pub up: Vec<String>,
    pub down: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Up,
    Down,
}

impl MigrationDefinition {
    /// Reads and parses a `Version<id>.sql` file.
    pub fn load(root: &str, path: &Path) -> Result<Self, MigrationError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(root, path, &content)
    }

    pub fn parse(root: &str, path: &Path, content: &str) -> Result<Self, MigrationError> {
        let id = id_from_path(path)?;

        let mut description = None;
        let mut depends_on = Vec::new();
        let mut up_lines: Option<Vec<&str>> = None;
        let mut down_lines: Option<Vec<&str>> = None;
        let mut section = Section::Header;

        for line in content.lines() {
            let trimmed = line.trim();

            if let Some(marker) = trimmed.strip_prefix(SECTION_MARKER) {
                section = match marker.trim().to_ascii_lowercase().as_str() {
                    "up" if up_lines.is_none() => Section::Up,
                    "down" if down_lines.is_none() => Section::Down,
                    "up" | "down" => {
                        return Err(MigrationError::invalid_file(
                            path,
                            format!("section '{}' declared twice", marker.trim()),
                        ));
                    }
                    other => {
                        return Err(MigrationError::invalid_file(
                            path,
                            format!("unknown section '{}'", other),
                        ));
                    }
                };
                match section {
                    Section::Up => up_lines = Some(Vec::new()),
                    Section::Down => down_lines = Some(Vec::new()),
                    Section::Header => {}
                }
                continue;
            }

            match section {
                Section::Header => {
                    if trimmed.is_empty() {
                        continue;
                    }
                    let Some(comment) = trimmed.strip_prefix("--") else {
                        return Err(MigrationError::invalid_file(
                            path,
                            "statement found before the '-- +migrate up' section",
                        ));
                    };
                    let comment = comment.trim();
                    if let Some(value) = comment.strip_prefix(DESCRIPTION_KEY) {
                        let value = value.trim();
                        if !value.is_empty() {
                            description = Some(value.to_string());
                        }
                    } else if let Some(value) = comment.strip_prefix(DEPENDS_KEY) {
                        for dep in value.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                            let dep = MigrationId::parse(dep).map_err(|_| {
                                MigrationError::invalid_file(
                                    path,
                                    format!("invalid dependency '{}'", dep),
                                )
                            })?;
                            if dep == id {
                                return Err(MigrationError::invalid_file(
                                    path,
                                    "a migration cannot depend on itself",
                                ));
                            }
                            if !depends_on.contains(&dep) {
                                depends_on.push(dep);
                            }
                        }
                    }
                }
                Section::Up => up_lines.get_or_insert_with(Vec::new).push(line),
                Section::Down => down_lines.get_or_insert_with(Vec::new).push(line),
            }
        }

        let Some(up_lines) = up_lines else {
            return Err(MigrationError::invalid_file(
                path,
                "missing '-- +migrate up' section",
            ));
        };

        Ok(Self {
            id,
            root: root.to_string(),
            path: path.to_path_buf(),
            description,
            depends_on,
            up: split_statements(&up_lines),
            down: down_lines.map(|l| split_statements(&l)).unwrap_or_default(),
        })
    }

    /// Statements to run when moving in `direction`.
    pub fn statements(&self, direction: Direction) -> &[String] {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        }
    }
}

/// Extracts the id from a `Version<digits>.sql` file name.
pub fn id_from_path(path: &Path) -> Result<MigrationId, MigrationError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| stem.starts_with(MigrationId::FILE_PREFIX))
        .and_then(|stem| MigrationId::parse(stem).ok())
        .ok_or_else(|| {
            MigrationError::invalid_file(path, "file name must look like 'Version<digits>.sql'")
        })
}

/// Splits a section body into statements. A statement ends with a `;` at the
/// end of a line; the terminator is not kept.
fn split_statements(lines: &[&str]) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in lines {
        let trimmed = line.trim_end();
        if current.is_empty() && (trimmed.trim().is_empty() || trimmed.trim().starts_with("--")) {
            continue;
        }
        if let Some(body) = strip_trailing_comment(trimmed).strip_suffix(';') {
            current.push(body);
            push_statement(&mut statements, &current);
            current.clear();
        } else {
            current.push(trimmed);
        }
    }
    push_statement(&mut statements, &current);

    statements
}

/// Drops a trailing `-- comment`, ignoring `--` inside single-quoted strings.
fn strip_trailing_comment(line: &str) -> &str {
    let mut in_quote = false;
    let mut prev_dash = false;
    for (i, c) in line.char_indices() {
        match c {
            '\'' => {
                in_quote = !in_quote;
                prev_dash = false;
            }
            '-' if !in_quote && prev_dash => return line[..i - 1].trim_end(),
            '-' => prev_dash = !in_quote,
            _ => prev_dash = false,
        }
    }
    line
}

fn push_statement(statements: &mut Vec<String>, lines: &[&str]) {
    let statement = lines.join("\n").trim().to_string();
    if !statement.is_empty() {
        statements.push(statement);
    }
}

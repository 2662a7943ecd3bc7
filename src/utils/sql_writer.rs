use chrono::Utc;
use std::fs::OpenOptions;
use std::io::{Result, Write};
use std::path::{Path, PathBuf};

use crate::types::{Direction, MigrationId};

/// Writes the statements of a plan as a standalone SQL script.
#[derive(Debug)]
pub struct SqlWriter {
    path: PathBuf,
}

impl SqlWriter {
    /// Writes to `path`. When `path` is an existing directory a timestamped
    /// file is created inside it.
    pub fn to_path(path: &Path) -> Result<Self> {
        let file = if path.is_dir() {
            let timestamp = Utc::now().format("%Y%m%d%H%M%S");
            path.join(format!("strata_migration_{}.sql", timestamp))
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            path.to_path_buf()
        };
        std::fs::File::create(&file)?;

        Ok(Self { path: file })
    }

    pub fn write_header(&mut self, direction: Direction, target: &MigrationId) -> Result<()> {
        self.append(&format!(
            "-- Generated by strata on {}\n-- Migrating {} to {}\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            direction,
            target
        ))
    }

    pub fn write_migration(&mut self, id: &MigrationId, statements: &[String]) -> Result<()> {
        let mut block = format!("\n-- Version {}\n", id);
        for statement in statements {
            block.push_str(statement.trim_end_matches(';'));
            block.push_str(";\n");
        }
        self.append(&block)
    }

    fn append(&mut self, content: &str) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(content.as_bytes())
    }

    pub fn file_path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_writes_one_section_per_migration() -> Result<()> {
        let tmp = tempdir()?;
        let mut writer = SqlWriter::to_path(&tmp.path().join("plan.sql"))?;
        writer.write_header(Direction::Up, &MigrationId::from(2))?;
        writer.write_migration(&MigrationId::from(1), &["CREATE TABLE a (id INT)".into()])?;
        writer.write_migration(
            &MigrationId::from(2),
            &["CREATE TABLE b (id INT);".into(), "DROP TABLE a".into()],
        )?;

        let content = fs::read_to_string(writer.file_path())?;
        assert!(content.contains("-- Migrating up to 2"));
        assert!(content.contains("-- Version 1\nCREATE TABLE a (id INT);\n"));
        assert!(content.contains("-- Version 2\nCREATE TABLE b (id INT);\nDROP TABLE a;\n"));
        Ok(())
    }

    #[test]
    fn test_directory_target_gets_timestamped_file() -> Result<()> {
        let tmp = tempdir()?;
        let mut writer = SqlWriter::to_path(tmp.path())?;
        writer.write_migration(&MigrationId::from(7), &["SELECT 1".into()])?;

        let path = writer.file_path().to_path_buf();
        assert_eq!(path.parent(), Some(tmp.path()));
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("strata_migration_")
        );
        assert!(fs::read_to_string(&path)?.contains("SELECT 1;"));
        Ok(())
    }

    #[test]
    fn test_file_target_creates_parent_dirs() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("out").join("plan.sql");
        let mut writer = SqlWriter::to_path(&path)?;
        writer.write_header(Direction::Down, &MigrationId::zero())?;

        assert_eq!(writer.file_path(), path.as_path());
        assert!(fs::read_to_string(&path)?.contains("-- Migrating down to 0"));
        Ok(())
    }
}

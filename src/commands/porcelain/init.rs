use crate::areas::repository::Repository;
use anyhow::Context;
use std::fs;
use std::io::Write;

impl Repository {
    pub fn init(&mut self) -> anyhow::Result<()> {
        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create .git/objects directory")?;

        let index = self.index();
        if !index.path().exists() {
            fs::write(index.path(), b"").context("Failed to create .git/index file")?;
        }
        drop(index);

        writeln!(
            self.writer(),
            "Initialized empty repository in {}",
            self.git_path().display()
        )?;

        Ok(())
    }
}

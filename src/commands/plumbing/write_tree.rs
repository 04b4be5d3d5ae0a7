use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    pub fn write_tree(&mut self) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let mut index = self.index();
        index.rehydrate()?;

        let tree_id = index.write_tree(self.database())?;
        drop(index);

        writeln!(self.writer(), "{tree_id}")?;

        Ok(())
    }
}

use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use std::io::Write;
use std::path::Path;

impl Repository {
    pub fn ls_tree(&mut self, tree: &str, recursive: bool) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let oid = self.resolve_object_id(tree)?;
        let tree = self.database().load_tree(&oid)?;

        self.print_tree(&tree, Path::new(""), recursive)
    }

    fn print_tree(&self, tree: &Tree, prefix: &Path, recursive: bool) -> anyhow::Result<()> {
        for (name, entry) in tree.entries() {
            let path = prefix.join(name);

            if entry.is_tree() && recursive {
                let subtree = self.database().load_tree(&entry.oid)?;
                self.print_tree(&subtree, &path, recursive)?;
                continue;
            }

            let object_type = if entry.is_tree() {
                ObjectType::Tree
            } else {
                ObjectType::Blob
            };
            writeln!(
                self.writer(),
                "{:06o} {} {}\t{}",
                entry.mode.as_u32(),
                object_type,
                entry.oid,
                path.display()
            )?;
        }

        Ok(())
    }
}

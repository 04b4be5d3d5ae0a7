use crate::areas::repository::Repository;
use crate::artifacts::checkout::engine::{Checkout, CheckoutOptions};
use crate::artifacts::objects::tree::Tree;

impl Repository {
    /// Check out `trees` into the working directory and the index
    ///
    /// One tree reconciles the index directly with it. Two trees move from
    /// the first (the state the index was built from) to the second.
    ///
    /// When writing files fails partway, the index still records the files
    /// already written before the error is returned. A checkout rejected for
    /// conflicts leaves the index file untouched.
    pub fn read_tree(&mut self, trees: &[String], force: bool) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let (head, merge) = match trees {
            [merge] => (None, self.load_named_tree(merge)?),
            [head, merge] => (
                Some(self.load_named_tree(head)?),
                self.load_named_tree(merge)?,
            ),
            _ => anyhow::bail!("read-tree takes one or two trees, got {}", trees.len()),
        };
        let options = if force {
            CheckoutOptions::force()
        } else {
            CheckoutOptions::default()
        };

        let mut index = self.index();
        index.rehydrate()?;

        let result = Checkout::new(
            self.workspace(),
            self.database(),
            &mut index,
            head,
            merge,
            options,
        )
        .checkout();

        match result {
            Ok(summary) => {
                index.write_updates()?;
                tracing::debug!(?summary, "index updated");
                Ok(())
            }
            Err(err) => {
                if index.is_changed()
                    && let Err(write_err) = index.write_updates()
                {
                    tracing::warn!(error = %write_err, "unable to record partial checkout");
                }
                Err(err)
            }
        }
    }

    fn load_named_tree(&self, name: &str) -> anyhow::Result<Tree> {
        let oid = self.resolve_object_id(name)?;
        self.database().load_tree(&oid)
    }
}

mod read_tree_from_one_tree;
mod read_tree_with_conflicts;
mod read_tree_between_two_trees;

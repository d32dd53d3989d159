//! Minimal HCL writer for generated Terraform configuration.

mod body;
mod value;

pub use body::{Block, Body};
pub use value::{Value, list_of_strings};

use std::fmt;

use termtree::Tree;

/// A whole `.tf` document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HclFile {
    body: Body,
}

impl HclFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// Tree of block headers, used by `tfpa generate --outline`.
    pub fn outline(&self, root: &str) -> Tree<String> {
        fn walk(body: &Body, tree: &mut Tree<String>) {
            for block in body.blocks() {
                let mut child = Tree::new(block.header());
                walk(block.body(), &mut child);
                tree.push(child);
            }
        }

        let mut tree = Tree::new(root.to_string());
        walk(&self.body, &mut tree);
        tree
    }
}

impl From<Body> for HclFile {
    fn from(body: Body) -> Self {
        Self { body }
    }
}

impl fmt::Display for HclFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.body.render(&mut out, 0);
        f.write_str(&out)
    }
}

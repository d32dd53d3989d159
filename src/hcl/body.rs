use super::value::{Value, escape_string, push_indent};

#[derive(Debug, Clone, PartialEq)]
enum Item {
    Attribute { name: String, value: Value },
    Block(Block),
    Newline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    block_type: String,
    labels: Vec<String>,
    body: Body,
}

impl Block {
    pub fn block_type(&self) -> &str {
        &self.block_type
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// `resource "rancher2_cluster" "name"`
    pub fn header(&self) -> String {
        let mut header = self.block_type.clone();
        for label in &self.labels {
            header.push_str(&format!(" \"{}\"", escape_string(label)));
        }
        header
    }
}

/// Ordered contents of a block (or of the file itself).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    items: Vec<Item>,
}

impl Body {
    /// Sets `name`, replacing an existing attribute in place.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        let existing = self.items.iter_mut().find_map(|item| match item {
            Item::Attribute { name: n, value } if n == name => Some(value),
            _ => None,
        });

        match existing {
            Some(slot) => *slot = value,
            None => self.items.push(Item::Attribute {
                name: name.to_string(),
                value,
            }),
        }
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.items.iter().find_map(|item| match item {
            Item::Attribute { name: n, value } if n == name => Some(value),
            _ => None,
        })
    }

    /// Appends a nested block and returns its body.
    pub fn append_block(&mut self, block_type: &str, labels: &[&str]) -> &mut Body {
        self.items.push(Item::Block(Block {
            block_type: block_type.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            body: Body::default(),
        }));

        match self.items.last_mut() {
            Some(Item::Block(block)) => &mut block.body,
            _ => unreachable!("block was just pushed"),
        }
    }

    pub fn append_newline(&mut self) {
        self.items.push(Item::Newline);
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.items.iter().filter_map(|item| match item {
            Item::Block(block) => Some(block),
            _ => None,
        })
    }

    pub fn find_block(&self, block_type: &str, labels: &[&str]) -> Option<&Block> {
        self.blocks().find(|b| {
            b.block_type == block_type
                && b.labels.len() == labels.len()
                && b.labels.iter().zip(labels).all(|(a, b)| a == b)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn render(&self, out: &mut String, indent: usize) {
        let mut i = 0;
        while i < self.items.len() {
            match &self.items[i] {
                Item::Attribute { .. } => {
                    let run_end = self.items[i..]
                        .iter()
                        .position(|item| !matches!(item, Item::Attribute { .. }))
                        .map(|p| i + p)
                        .unwrap_or(self.items.len());

                    let width = self.items[i..run_end]
                        .iter()
                        .filter_map(|item| match item {
                            Item::Attribute { name, .. } => Some(name.len()),
                            _ => None,
                        })
                        .max()
                        .unwrap_or(0);

                    for item in &self.items[i..run_end] {
                        if let Item::Attribute { name, value } = item {
                            push_indent(out, indent);
                            out.push_str(&format!("{name:<width$} = "));
                            value.render(out, indent);
                            out.push('\n');
                        }
                    }
                    i = run_end;
                }
                Item::Block(block) => {
                    push_indent(out, indent);
                    out.push_str(&block.header());
                    out.push_str(" {\n");
                    block.body.render(out, indent + 1);
                    push_indent(out, indent);
                    out.push_str("}\n");
                    i += 1;
                }
                Item::Newline => {
                    out.push('\n');
                    i += 1;
                }
            }
        }
    }
}

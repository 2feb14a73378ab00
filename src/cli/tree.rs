//! A read-only view of the declared command hierarchy.

/// Index of a node within its [`CommandTree`].
pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct CommandNode {
    pub name: String,
    /// The first alias, if any, is the canonical short form.
    pub aliases: Vec<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl CommandNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Commands below the program itself.
///
/// Top-level commands have no parent.
#[derive(Debug, Clone, Default)]
pub struct CommandTree {
    nodes: Vec<CommandNode>,
    roots: Vec<NodeId>,
}

impl CommandTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the tree from a clap command definition.
    ///
    /// The clap command itself stands for the program and is not a node.
    pub fn from_clap(cmd: &clap::Command) -> Self {
        let mut tree = Self::new();
        tree.add_clap_children(None, cmd);
        tree
    }

    fn add_clap_children(&mut self, parent: Option<NodeId>, cmd: &clap::Command) {
        for sub in cmd.get_subcommands() {
            let aliases = sub.get_all_aliases().map(String::from).collect();
            let id = self.add(parent, sub.get_name(), aliases);
            self.add_clap_children(Some(id), sub);
        }
    }

    /// Append a command under `parent`, or at the top level.
    pub fn add(&mut self, parent: Option<NodeId>, name: &str, aliases: Vec<String>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(CommandNode {
            name: name.to_string(),
            aliases,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn node(&self, id: NodeId) -> &CommandNode {
        &self.nodes[id]
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// All executable commands, in declaration order.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            while let Some(id) = stack.pop() {
                let node = &self.nodes[id];
                if node.is_leaf() {
                    return Some(id);
                }
                stack.extend(node.children.iter().rev().copied());
            }
            None
        })
    }

    /// Command names from the top level down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<&str> {
        let mut names = Vec::new();
        let mut cur = Some(id);
        while let Some(n) = cur {
            names.push(self.nodes[n].name.as_str());
            cur = self.nodes[n].parent;
        }
        names.reverse();
        names
    }
}

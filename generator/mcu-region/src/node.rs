use core::fmt;
use mcu_addresses::{Order, PhysicalAddress};
use mcu_model::Permissions;
use mcu_model::consts::REGION_SLOTS;

/// One child of a [`RegionNode`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RegionSlot {
    /// No access.
    #[default]
    Unmapped,
    /// Mapped as a whole with these permissions.
    Leaf(Permissions),
    /// Subdivided further.
    Table(Box<RegionNode>),
}

/// A node of a process' protection-region tree.
///
/// The node spans `2^(size_order + num_order)` bytes from `base`, split into
/// `2^num_order` equal children of `2^size_order` bytes each. Slots past the
/// child count are always [`RegionSlot::Unmapped`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionNode {
    pub base: PhysicalAddress,
    /// Order of one child.
    pub size_order: Order,
    /// `log2` of the child count, `1..=3`.
    pub num_order: u8,
    /// Union of the permissions of everything below this node.
    pub attr: Permissions,
    pub children: [RegionSlot; REGION_SLOTS],
}

/// A mapped leaf: `size` bytes from `base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leaf {
    pub base: u64,
    pub size: u64,
    pub perm: Permissions,
}

impl RegionNode {
    /// Number of active children.
    #[must_use]
    pub const fn child_count(&self) -> usize {
        1 << self.num_order
    }

    /// The active children.
    #[must_use]
    pub fn children(&self) -> &[RegionSlot] {
        &self.children[..self.child_count()]
    }

    /// Bytes spanned by the node.
    #[must_use]
    pub const fn span(&self) -> u64 {
        self.size_order.size() << self.num_order
    }

    /// Start address of child `index`, `None` past the active children.
    #[must_use]
    pub fn child_base(&self, index: usize) -> Option<PhysicalAddress> {
        if index >= self.child_count() {
            return None;
        }
        self.base
            .checked_add(index as u64 * self.size_order.size())
    }

    /// Nesting depth; a node without sub-tables has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .tables()
            .map(RegionNode::depth)
            .max()
            .unwrap_or_default()
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.tables().map(RegionNode::node_count).sum::<usize>()
    }

    /// All mapped leaves in address order.
    #[must_use]
    pub fn leaves(&self) -> Vec<Leaf> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<Leaf>) {
        for (i, slot) in self.children().iter().enumerate() {
            match slot {
                RegionSlot::Unmapped => {}
                RegionSlot::Leaf(perm) => {
                    if let Some(base) = self.child_base(i) {
                        out.push(Leaf {
                            base: base.as_u64(),
                            size: self.size_order.size(),
                            perm: *perm,
                        });
                    }
                }
                RegionSlot::Table(node) => node.collect_leaves(out),
            }
        }
    }

    fn tables(&self) -> impl Iterator<Item = &Self> {
        self.children().iter().filter_map(|slot| match slot {
            RegionSlot::Table(node) => Some(node.as_ref()),
            _ => None,
        })
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(
            f,
            "{:indent$}{} +0x{:X} {} x {} [{}]",
            "",
            self.base,
            self.span(),
            self.child_count(),
            self.size_order,
            self.attr,
            indent = depth * 2
        )?;
        for (i, slot) in self.children().iter().enumerate() {
            match slot {
                RegionSlot::Unmapped => {}
                RegionSlot::Leaf(perm) => {
                    if let Some(base) = self.child_base(i) {
                        writeln!(f, "{:indent$}{base} leaf {perm}", "", indent = depth * 2 + 2)?;
                    }
                }
                RegionSlot::Table(node) => node.write_indented(f, depth + 1)?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for RegionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
